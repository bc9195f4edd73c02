//! Symbol table construction and type checking.

use std::collections::HashMap;
use std::fmt;

use tiny_parser::ast::{DeclType, Expr, Program, Stmt};
use tracing::debug;

use crate::error::SemanticError;

/// Name of the single scope built by [`SymtabBuilder`].
pub const GLOBAL_SCOPE: &str = "GLOBAL";

/// The static type of a symbol or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolType {
    /// Statements have no value. Never assigned to a symbol.
    Void,
    Integer,
    String,
}

impl From<DeclType> for SymbolType {
    fn from(ty: DeclType) -> Self {
        match ty {
            DeclType::Integer => SymbolType::Integer,
            DeclType::String => SymbolType::String,
        }
    }
}

impl fmt::Display for SymbolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolType::Void => write!(f, "VOID"),
            SymbolType::Integer => write!(f, "INTEGER"),
            SymbolType::String => write!(f, "STRING"),
        }
    }
}

/// Represents a variable (created using an `INTEGER` or `STRING` declaration).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: SymbolType,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: SymbolType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.name, self.ty)
    }
}

/// A flat mapping from names to [`Symbol`]s. Lookup is case-insensitive.
///
/// `parent` is a borrowed link: a nested scope never owns the scope it falls back to.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope<'p> {
    name: String,
    parent: Option<&'p Scope<'p>>,
    /// Symbols in declaration order.
    symbols: Vec<Symbol>,
    /// Uppercase name to index into `symbols`.
    index: HashMap<String, usize>,
}

impl<'p> Scope<'p> {
    /// Creates an empty scope without a parent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            symbols: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates an empty scope that resolves unknown names in `parent`.
    pub fn with_parent(name: impl Into<String>, parent: &'p Scope<'p>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    /// Adds `symbol` to this scope under its uppercase name, replacing any symbol with the same name.
    pub fn define(&mut self, mut symbol: Symbol) {
        symbol.name = symbol.name.to_ascii_uppercase();
        match self.index.get(&symbol.name) {
            Some(&i) => self.symbols[i] = symbol,
            None => {
                self.index.insert(symbol.name.clone(), self.symbols.len());
                self.symbols.push(symbol);
            }
        }
    }

    /// Looks `name` up in this scope, then in the parent chain.
    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        let name = name.to_ascii_uppercase();
        match self.index.get(&name) {
            Some(&i) => Some(&self.symbols[i]),
            None => self.parent.and_then(|parent| parent.resolve(&name)),
        }
    }

    /// Returns the type of `name` or `None` if it cannot be resolved.
    pub fn type_of(&self, name: &str) -> Option<SymbolType> {
        self.resolve(name).map(|symbol| symbol.ty)
    }

    /// The symbols defined directly in this scope, in declaration order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{} symbols--:", self.name)?;
        for symbol in &self.symbols {
            write!(f, "\n{}", symbol)?;
        }
        Ok(())
    }
}

/// Builds the global [`Scope`] and type checks every statement.
/// Stops at the first error.
pub struct SymtabBuilder {
    scope: Scope<'static>,
    /// The line whose statement is being checked. Used for error messages.
    current_line: i16,
}

impl SymtabBuilder {
    pub fn new() -> Self {
        Self {
            scope: Scope::new(GLOBAL_SCOPE),
            current_line: 0,
        }
    }

    /// Consumes `self` and returns the completed scope.
    pub fn build(mut self, program: &Program) -> Result<Scope<'static>, SemanticError> {
        for line in &program.lines {
            self.current_line = line.number;
            self.check_stmt(&line.stmt)?;
        }
        debug!(symbols = self.scope.len(), "built symbol table");
        Ok(self.scope)
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), SemanticError> {
        match stmt {
            Stmt::Declare { ty, idents } => {
                for ident in idents {
                    if self.scope.resolve(ident).is_some() {
                        return Err(SemanticError::Redeclaration {
                            line: self.current_line,
                            ident: ident.clone(),
                        });
                    }
                    self.scope.define(Symbol::new(ident.as_str(), (*ty).into()));
                }
                Ok(())
            }
            Stmt::Let { ident, value } => {
                let expected = self.resolve(ident)?.ty;
                let found = self.type_of(value)?;
                if expected != found {
                    return Err(SemanticError::AssignMismatch {
                        line: self.current_line,
                        ident: ident.clone(),
                        expected,
                        found,
                    });
                }
                Ok(())
            }
            Stmt::Input { ident } => self.resolve(ident).map(|_| ()),
            Stmt::Print { items } => {
                // printing accepts any type
                for item in items {
                    self.type_of(item)?;
                }
                Ok(())
            }
            Stmt::If {
                lhs,
                relop: _,
                rhs,
                then,
            } => {
                let lhs = self.type_of(lhs)?;
                let rhs = self.type_of(rhs)?;
                if lhs != rhs {
                    return Err(SemanticError::CompareMismatch {
                        line: self.current_line,
                        lhs,
                        rhs,
                    });
                }
                self.check_stmt(then)
            }
            Stmt::Goto { .. } | Stmt::Gosub { .. } | Stmt::Return | Stmt::End => Ok(()),
        }
    }

    /// Computes the static type of `expr`.
    fn type_of(&self, expr: &Expr) -> Result<SymbolType, SemanticError> {
        match expr {
            Expr::NumberLit(_) => Ok(SymbolType::Integer),
            Expr::StringLit(_) => Ok(SymbolType::String),
            Expr::Identifier(ident) => Ok(self.resolve(ident)?.ty),
            Expr::Binary { lhs, op: _, rhs } => {
                let lhs = self.type_of(lhs)?;
                let rhs = self.type_of(rhs)?;
                if lhs != SymbolType::Integer || rhs != SymbolType::Integer {
                    return Err(SemanticError::InvalidOperandType {
                        line: self.current_line,
                        lhs,
                        rhs,
                    });
                }
                Ok(SymbolType::Integer)
            }
        }
    }

    fn resolve(&self, ident: &str) -> Result<&Symbol, SemanticError> {
        self.scope
            .resolve(ident)
            .ok_or_else(|| SemanticError::UndeclaredVariable {
                line: self.current_line,
                ident: ident.to_string(),
            })
    }
}

impl Default for SymtabBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_parser::parser::Parser;
    use tiny_source::Source;

    fn program(source: &str) -> Program {
        let source = Source::new(source);
        Parser::new(&source)
            .and_then(|mut parser| parser.parse_program())
            .unwrap()
    }

    fn build(source: &str) -> Result<Scope<'static>, SemanticError> {
        SymtabBuilder::new().build(&program(source))
    }

    #[test]
    fn test_declarations() {
        let scope = build("10 INTEGER A, B\r\n20 STRING S\r\n").unwrap();
        assert_eq!(scope.name(), GLOBAL_SCOPE);
        assert_eq!(
            scope.symbols(),
            &[
                Symbol::new("A", SymbolType::Integer),
                Symbol::new("B", SymbolType::Integer),
                Symbol::new("S", SymbolType::String),
            ]
        );
        assert_eq!(scope.type_of("s"), Some(SymbolType::String));
        assert_eq!(scope.type_of("C"), None);
    }

    #[test]
    fn test_display() {
        let scope = build("10 INTEGER A\r\n20 STRING S\r\n").unwrap();
        assert_eq!(
            scope.to_string(),
            "--GLOBAL symbols--:\n(A:INTEGER)\n(S:STRING)"
        );
    }

    #[test]
    fn test_well_typed_program() {
        let source = "10 INTEGER N\r\n\
                      20 STRING S, T\r\n\
                      30 INPUT N\r\n\
                      40 LET S = \"n = \"\r\n\
                      50 IF N * 2 >= (N + 1) / 3 THEN PRINT S, N, 1 + 1\r\n\
                      60 IF S == T THEN LET N = -N\r\n\
                      70 END\r\n";
        assert!(build(source).is_ok());
    }

    #[test]
    fn test_redeclaration() {
        assert_eq!(
            build("10 INTEGER A\r\n20 STRING a\r\n").unwrap_err(),
            SemanticError::Redeclaration {
                line: 20,
                ident: "A".to_string()
            }
        );
        assert_eq!(
            build("10 INTEGER A, A\r\n").unwrap_err(),
            SemanticError::Redeclaration {
                line: 10,
                ident: "A".to_string()
            }
        );
    }

    #[test]
    fn test_undeclared_variable() {
        let expected = |line| SemanticError::UndeclaredVariable {
            line,
            ident: "X".to_string(),
        };
        assert_eq!(build("10 LET X = 1\r\n").unwrap_err(), expected(10));
        assert_eq!(build("20 INPUT X\r\n").unwrap_err(), expected(20));
        assert_eq!(build("30 PRINT \"a\", X\r\n").unwrap_err(), expected(30));
        assert_eq!(
            build("10 INTEGER A\r\n40 LET A = A + X\r\n").unwrap_err(),
            expected(40)
        );
    }

    #[test]
    fn test_declaration_must_precede_use() {
        // checking follows line order, not execution order
        assert!(matches!(
            build("10 LET X = 1\r\n20 INTEGER X\r\n").unwrap_err(),
            SemanticError::UndeclaredVariable { line: 10, .. }
        ));
    }

    #[test]
    fn test_assign_mismatch() {
        let err = build("10 STRING A\r\n20 LET A = 5\r\n").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(
            err,
            SemanticError::AssignMismatch {
                line: 20,
                ident: "A".to_string(),
                expected: SymbolType::String,
                found: SymbolType::Integer,
            }
        );
        assert_eq!(
            err.to_string(),
            "[Line 20] Cannot assign INTEGER to STRING variable A"
        );
    }

    #[test]
    fn test_compare_mismatch() {
        let err = build("10 STRING S\r\n20 IF S < 1 THEN END\r\n").unwrap_err();
        assert!(err.is_type_mismatch());
        assert_eq!(
            err,
            SemanticError::CompareMismatch {
                line: 20,
                lhs: SymbolType::String,
                rhs: SymbolType::Integer,
            }
        );
    }

    #[test]
    fn test_then_is_checked() {
        assert!(matches!(
            build("10 IF 1 < 2 THEN LET Y = 1\r\n").unwrap_err(),
            SemanticError::UndeclaredVariable { line: 10, .. }
        ));
    }

    #[test]
    fn test_invalid_operand_type() {
        let err = build("10 STRING S\r\n20 PRINT S + 1\r\n").unwrap_err();
        assert!(!err.is_type_mismatch());
        assert_eq!(
            err,
            SemanticError::InvalidOperandType {
                line: 20,
                lhs: SymbolType::String,
                rhs: SymbolType::Integer,
            }
        );
    }

    #[test]
    fn test_idempotent() {
        let program = program("10 INTEGER A\r\n20 STRING B\r\n30 LET A = 2\r\n");
        let first = SymtabBuilder::new().build(&program).unwrap();
        let second = SymtabBuilder::new().build(&program).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parent_scope() {
        let mut global = Scope::new(GLOBAL_SCOPE);
        global.define(Symbol::new("outer", SymbolType::Integer));
        let mut inner = Scope::with_parent("INNER", &global);
        inner.define(Symbol::new("Inner", SymbolType::String));

        assert_eq!(inner.parent().map(Scope::name), Some(GLOBAL_SCOPE));
        assert_eq!(inner.type_of("OUTER"), Some(SymbolType::Integer));
        assert_eq!(inner.type_of("inner"), Some(SymbolType::String));
        assert_eq!(global.type_of("INNER"), None);
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn test_define_replaces() {
        let mut scope = Scope::new(GLOBAL_SCOPE);
        scope.define(Symbol::new("A", SymbolType::Integer));
        scope.define(Symbol::new("a", SymbolType::String));
        assert_eq!(scope.symbols(), &[Symbol::new("A", SymbolType::String)]);
    }
}
