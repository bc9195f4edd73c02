//! The TINY toolchain: parses, checks, then interprets a program or lowers it to NASM.
//!
//! Every entry point runs the full static pipeline first
//! (parse, structural analysis, symbol table), so the backends only ever see well-formed programs.

use std::io::{BufRead, Write};

use tiny_parser::ast::Program;
use tiny_parser::error::ParseError;
use tiny_parser::parser::Parser;
use tiny_passes::analyze::Analyzer;
use tiny_passes::error::{SemanticError, StructuralError};
use tiny_passes::symtab::{Scope, SymtabBuilder};
use tiny_source::Source;
use tiny_vm::error::RuntimeError;
use tiny_vm::vm::Vm;
use tracing::debug;

/// Any error raised while processing a program, tagged by pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Structural(#[from] StructuralError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Parses and checks `source`, returning the tree together with its global scope.
pub fn compile(source: &str) -> Result<(Program, Scope<'static>), Error> {
    let source = Source::new(source);
    let program = Parser::new(&source)?.parse_program()?;
    Analyzer::analyze(&program)?;
    let scope = SymtabBuilder::new().build(&program)?;
    debug!("{}", scope);
    Ok((program, scope))
}

/// Renders the tree of a checked program, one bracketed tag per node.
pub fn dump_tree(source: &str) -> Result<String, Error> {
    let (program, _) = compile(source)?;
    Ok(program.to_string())
}

/// Runs a program, reading `INPUT` lines from `input` and writing `PRINT` output to `output`.
pub fn interpret(source: &str, input: impl BufRead, output: impl Write) -> Result<(), Error> {
    let (program, scope) = compile(source)?;
    Vm::new(&program, &scope, input, output).run()?;
    Ok(())
}

/// Generates NASM source for a program.
pub fn generate_nasm(source: &str) -> Result<String, Error> {
    let (program, scope) = compile(source)?;
    Ok(tiny_nasm::generate(&program, &scope))
}
