//! Abstract syntax tree.

use std::fmt;

/// The root of the tree: every numbered line in parse order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub lines: Vec<Line>,
}

/// One numbered statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: i16,
    pub stmt: Stmt,
}

/// The type named by a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclType {
    Integer,
    String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `INTEGER A, B` or `STRING S`.
    Declare { ty: DeclType, idents: Vec<String> },
    /// `LET X = item`.
    Let { ident: String, value: Expr },
    /// `INPUT X`.
    Input { ident: String },
    /// `PRINT item, item, ...`.
    Print { items: Vec<Expr> },
    /// `IF lhs relop rhs THEN stmt`.
    If {
        lhs: Expr,
        relop: RelOp,
        rhs: Expr,
        then: Box<Stmt>,
    },
    Goto { target: i16 },
    Gosub { target: i16 },
    Return,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    NumberLit(i16),
    StringLit(String),
    /// An identifier (e.g. `foo`).
    Identifier(String),
    /// A binary expression (e.g. `1+1`).
    Binary {
        lhs: Box<Expr>,
        op: ArithOp,
        rhs: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
}

impl RelOp {
    /// Applies the comparison.
    pub fn compare<T: PartialOrd>(self, lhs: T, rhs: T) -> bool {
        match self {
            RelOp::Less => lhs < rhs,
            RelOp::LessEquals => lhs <= rhs,
            RelOp::Greater => lhs > rhs,
            RelOp::GreaterEquals => lhs >= rhs,
            RelOp::Equals => lhs == rhs,
            RelOp::NotEquals => lhs != rhs,
        }
    }
}

impl fmt::Display for DeclType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclType::Integer => write!(f, "INTEGER"),
            DeclType::String => write!(f, "STRING"),
        }
    }
}

impl fmt::Display for ArithOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ArithOp::Add => "+",
            ArithOp::Sub => "-",
            ArithOp::Mul => "*",
            ArithOp::Div => "/",
        };
        write!(f, "{}", op)
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            RelOp::Less => "<",
            RelOp::LessEquals => "<=",
            RelOp::Greater => ">",
            RelOp::GreaterEquals => ">=",
            RelOp::Equals => "==",
            RelOp::NotEquals => "!=",
        };
        write!(f, "{}", op)
    }
}
