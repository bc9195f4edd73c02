//! Errors raised by the static passes. All carry the number of the offending line.

use crate::symtab::SymbolType;

/// Line numbering or jump target errors found by [`crate::analyze::Analyzer`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("[Line {line}] Duplicated line number found")]
    DuplicateLine { line: i16 },
    #[error("[Line {line}] Line number not progressive, previous line is {previous}")]
    UnorderedLine { line: i16, previous: i16 },
    #[error("[Line {line}] Invalid jump found: {target}")]
    InvalidJump { line: i16, target: i16 },
    #[error("[Line {line}] Invalid subroutine jump found: {target}")]
    InvalidSubroutineJump { line: i16, target: i16 },
}

/// Declaration and type errors found by [`crate::symtab::SymtabBuilder`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("[Line {line}] Found already declared variable: {ident}")]
    Redeclaration { line: i16, ident: String },
    #[error("[Line {line}] Found undeclared variable: {ident}")]
    UndeclaredVariable { line: i16, ident: String },
    #[error("[Line {line}] Cannot assign {found} to {expected} variable {ident}")]
    AssignMismatch {
        line: i16,
        ident: String,
        expected: SymbolType,
        found: SymbolType,
    },
    #[error("[Line {line}] Cannot compare {lhs} with {rhs}")]
    CompareMismatch {
        line: i16,
        lhs: SymbolType,
        rhs: SymbolType,
    },
    #[error("[Line {line}] Invalid arithmetic operand types: {lhs} vs {rhs}")]
    InvalidOperandType {
        line: i16,
        lhs: SymbolType,
        rhs: SymbolType,
    },
}

impl SemanticError {
    /// Returns `true` for assignment and comparison type mismatches.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            SemanticError::AssignMismatch { .. } | SemanticError::CompareMismatch { .. }
        )
    }
}
