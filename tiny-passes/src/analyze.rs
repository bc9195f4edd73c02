//! Structural analysis: line numbering and jump targets.

use std::collections::HashSet;

use tiny_parser::ast::{Line, Program, Stmt};
use tiny_parser::visitor::{walk_line, walk_program, walk_stmt, Visitor};
use tracing::debug;

use crate::error::StructuralError;

/// Checks that line numbers are unique and strictly increasing, and that every `GOTO`/`GOSUB`
/// targets an existing line. Stops at the first violation. Lines are never reordered.
pub struct Analyzer {
    /// Every line number seen so far.
    line_numbers: HashSet<i16>,
    /// The line whose statement is being visited.
    current_line: i16,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            line_numbers: HashSet::new(),
            current_line: 0,
        }
    }

    /// Runs both scans over `program` with a fresh analyzer.
    pub fn analyze(program: &Program) -> Result<(), StructuralError> {
        Analyzer::new().visit_program(program)
    }

    /// First scan: uniqueness and ordering, in parse order.
    /// Replaces the line numbers left by any earlier run.
    fn check_line_numbers(&mut self, lines: &[Line]) -> Result<(), StructuralError> {
        self.line_numbers.clear();
        let mut previous: Option<i16> = None;
        for line in lines {
            if !self.line_numbers.insert(line.number) {
                return Err(StructuralError::DuplicateLine { line: line.number });
            }
            if let Some(previous) = previous {
                if line.number < previous {
                    return Err(StructuralError::UnorderedLine {
                        line: line.number,
                        previous,
                    });
                }
            }
            previous = Some(line.number);
        }
        Ok(())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl<'ast> Visitor<'ast> for Analyzer {
    type Error = StructuralError;

    fn visit_program(&mut self, program: &'ast Program) -> Result<(), Self::Error> {
        self.check_line_numbers(&program.lines)?;
        // Second scan: jump targets.
        walk_program(self, program)?;
        debug!(lines = program.lines.len(), "structural analysis passed");
        Ok(())
    }

    fn visit_line(&mut self, line: &'ast Line) -> Result<(), Self::Error> {
        self.current_line = line.number;
        walk_line(self, line)
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) -> Result<(), Self::Error> {
        match stmt {
            Stmt::Goto { target } if !self.line_numbers.contains(target) => {
                Err(StructuralError::InvalidJump {
                    line: self.current_line,
                    target: *target,
                })
            }
            Stmt::Gosub { target } if !self.line_numbers.contains(target) => {
                Err(StructuralError::InvalidSubroutineJump {
                    line: self.current_line,
                    target: *target,
                })
            }
            // Recurses into `IF ... THEN` bodies.
            _ => walk_stmt(self, stmt),
        }
    }
}
