//! NASM backend for checked TINY programs.

pub mod codegen;
pub mod pool;

use tiny_parser::ast::Program;
use tiny_passes::symtab::Scope;

/// Generates the complete assembly source for `program`.
pub fn generate(program: &Program, scope: &Scope<'_>) -> String {
    codegen::Codegen::new(scope).generate(program)
}
