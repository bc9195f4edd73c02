//! Visitor pattern for AST nodes.
//!
//! Every `visit_*` method returns a `Result` so that passes can stop at the first error.

use crate::ast::{Expr, Line, Program, Stmt};

pub trait Visitor<'ast>: Sized {
    type Error;

    fn visit_program(&mut self, program: &'ast Program) -> Result<(), Self::Error> {
        walk_program(self, program)
    }
    fn visit_line(&mut self, line: &'ast Line) -> Result<(), Self::Error> {
        walk_line(self, line)
    }
    fn visit_stmt(&mut self, stmt: &'ast Stmt) -> Result<(), Self::Error> {
        walk_stmt(self, stmt)
    }
    fn visit_expr(&mut self, expr: &'ast Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)
    }
}

pub fn walk_program<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    program: &'ast Program,
) -> Result<(), V::Error> {
    for line in &program.lines {
        visitor.visit_line(line)?;
    }
    Ok(())
}

pub fn walk_line<'ast, V: Visitor<'ast>>(visitor: &mut V, line: &'ast Line) -> Result<(), V::Error> {
    visitor.visit_stmt(&line.stmt)
}

pub fn walk_stmt<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Stmt) -> Result<(), V::Error> {
    match stmt {
        Stmt::Declare { ty: _, idents: _ } => Ok(()),
        Stmt::Let { ident: _, value } => visitor.visit_expr(value),
        Stmt::Input { ident: _ } => Ok(()),
        Stmt::Print { items } => {
            for item in items {
                visitor.visit_expr(item)?;
            }
            Ok(())
        }
        Stmt::If {
            lhs,
            relop: _,
            rhs,
            then,
        } => {
            visitor.visit_expr(lhs)?;
            visitor.visit_expr(rhs)?;
            visitor.visit_stmt(then)
        }
        Stmt::Goto { target: _ } => Ok(()),
        Stmt::Gosub { target: _ } => Ok(()),
        Stmt::Return => Ok(()),
        Stmt::End => Ok(()),
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expr) -> Result<(), V::Error> {
    match expr {
        Expr::NumberLit(_) => Ok(()),
        Expr::StringLit(_) => Ok(()),
        Expr::Identifier(_) => Ok(()),
        Expr::Binary { lhs, op: _, rhs } => {
            visitor.visit_expr(lhs)?;
            visitor.visit_expr(rhs)
        }
    }
}
