//! Lexer, parser and syntax tree for CSTINY programs.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod visitor;
