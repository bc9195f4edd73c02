//! Debug tree dump for [`Program`].
//!
//! One bracketed tag per node, children indented one tab deeper than their parent.

use crate::ast::{Expr, Line, Program, Stmt};
use std::fmt;

/// Writes a single tag at the given `depth`.
fn tag(f: &mut fmt::Formatter<'_>, depth: usize, tag: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{}[{}]", "\t".repeat(depth), tag)
}

fn fmt_line(f: &mut fmt::Formatter<'_>, line: &Line, depth: usize) -> fmt::Result {
    tag(f, depth, format_args!("LINE {}", line.number))?;
    fmt_stmt(f, &line.stmt, depth + 1)
}

fn fmt_stmt(f: &mut fmt::Formatter<'_>, stmt: &Stmt, depth: usize) -> fmt::Result {
    match stmt {
        Stmt::Declare { ty, idents } => {
            tag(f, depth, "DECLARATION STMT")?;
            for ident in idents {
                tag(f, depth + 1, format_args!("{}: {}", ty, ident))?;
            }
            Ok(())
        }
        Stmt::Let { ident, value } => {
            tag(f, depth, "LET STMT")?;
            tag(f, depth + 1, format_args!("IDENT: {}", ident))?;
            fmt_expr(f, value, depth + 1)
        }
        Stmt::Input { ident } => tag(f, depth, format_args!("INPUT STMT ({})", ident)),
        Stmt::Print { items } => {
            tag(f, depth, "PRINT STMT")?;
            for item in items {
                fmt_expr(f, item, depth + 1)?;
            }
            Ok(())
        }
        Stmt::If {
            lhs,
            relop,
            rhs,
            then,
        } => {
            tag(f, depth, "IF STMT")?;
            tag(f, depth + 1, format_args!("RELOP: {}", relop))?;
            fmt_expr(f, lhs, depth + 1)?;
            fmt_expr(f, rhs, depth + 1)?;
            fmt_stmt(f, then, depth + 1)
        }
        Stmt::Goto { target } => tag(f, depth, format_args!("GOTO STMT ({})", target)),
        Stmt::Gosub { target } => tag(f, depth, format_args!("GOSUB STMT ({})", target)),
        Stmt::Return => tag(f, depth, "RETURN STMT"),
        Stmt::End => tag(f, depth, "END STMT"),
    }
}

fn fmt_expr(f: &mut fmt::Formatter<'_>, expr: &Expr, depth: usize) -> fmt::Result {
    match expr {
        Expr::NumberLit(value) => tag(f, depth, format_args!("NUMBER: {}", value)),
        Expr::StringLit(value) => tag(f, depth, format_args!("STRING: \"{}\"", value)),
        Expr::Identifier(ident) => tag(f, depth, format_args!("IDENT: {}", ident)),
        Expr::Binary { lhs, op, rhs } => {
            tag(f, depth, "EXPRESSION")?;
            tag(f, depth + 1, format_args!("OP: {}", op))?;
            fmt_expr(f, lhs, depth + 1)?;
            fmt_expr(f, rhs, depth + 1)
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        tag(f, 0, "PROGRAM")?;
        for line in &self.lines {
            fmt_line(f, line, 1)?;
        }
        Ok(())
    }
}
