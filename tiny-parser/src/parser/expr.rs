use super::*;
use crate::ast::{ArithOp, Expr};

impl<'a> Parser<'a> {
    /* Items */
    /// Parses an item: a string literal or an expression.
    pub fn parse_item(&mut self) -> ParseResult<Expr> {
        match &self.current.token {
            Token::StringLit(value) => {
                let value = value.clone();
                self.next()?;
                Ok(Expr::StringLit(value))
            }
            _ => self.parse_expr(),
        }
    }

    /// Parses one or more comma separated items.
    pub fn parse_item_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut items = vec![self.parse_item()?];
        while self.eat(&Token::Comma)? {
            items.push(self.parse_item()?);
        }
        Ok(items)
    }

    /* Expressions */
    /// Parses an expression with an optional leading sign.
    /// A leading `-` is desugared into `0 - term`.
    pub fn parse_expr(&mut self) -> ParseResult<Expr> {
        self.eat(&Token::Plus)?;
        let negate = self.eat(&Token::Minus)?;

        let term = self.parse_term()?;
        let mut lhs = if negate {
            Expr::Binary {
                lhs: Box::new(Expr::NumberLit(0)),
                op: ArithOp::Sub,
                rhs: Box::new(term),
            }
        } else {
            term
        };

        loop {
            let op = match self.current.token {
                Token::Plus => ArithOp::Add,
                Token::Minus => ArithOp::Sub,
                _ => break,
            };
            self.next()?;

            let rhs = self.parse_term()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// Parses a multiplicative expression.
    fn parse_term(&mut self) -> ParseResult<Expr> {
        let mut lhs = self.parse_factor()?;

        loop {
            let op = match self.current.token {
                Token::Asterisk => ArithOp::Mul,
                Token::Slash => ArithOp::Div,
                _ => break,
            };
            self.next()?;

            let rhs = self.parse_factor()?;
            lhs = Expr::Binary {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    /// Parses an identifier, a number literal or a parenthesized expression.
    fn parse_factor(&mut self) -> ParseResult<Expr> {
        match self.current.token {
            Token::Identifier(_) => Ok(Expr::Identifier(self.parse_ident()?)),
            Token::NumberLit(_) => Ok(Expr::NumberLit(self.parse_number()?)),
            Token::OpenParen => {
                self.next()?;
                let expr = self.parse_expr()?;
                self.expect(Token::CloseParen)?;
                Ok(expr)
            }
            _ => Err(self.unexpected("<IDENTIFIER>, <NUMBER-LITERAL> or <LPAREN>")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_debug_snapshot;

    fn expr(source: &str) -> Expr {
        let source = source.into();
        let mut parser = Parser::new(&source).unwrap();
        parser.parse_expr().unwrap()
    }

    fn expr_err(source: &str) -> ParseError {
        let source = source.into();
        let mut parser = Parser::new(&source).unwrap();
        parser.parse_expr().unwrap_err()
    }

    #[test]
    fn test_literal() {
        assert_eq!(expr("1"), Expr::NumberLit(1));
        assert_eq!(expr("32767"), Expr::NumberLit(32767));
        assert_eq!(expr("foo"), Expr::Identifier("FOO".to_string()));
    }

    #[test]
    fn test_binary_expr() {
        assert_debug_snapshot!(expr("1 + 2 * 3"), @r###"
        Binary {
            lhs: NumberLit(
                1,
            ),
            op: Add,
            rhs: Binary {
                lhs: NumberLit(
                    2,
                ),
                op: Mul,
                rhs: NumberLit(
                    3,
                ),
            },
        }
        "###);
    }

    #[test]
    fn test_binary_associativity() {
        // should be (8 - 2) - 1
        assert_debug_snapshot!(expr("8 - 2 - 1"), @r###"
        Binary {
            lhs: Binary {
                lhs: NumberLit(
                    8,
                ),
                op: Sub,
                rhs: NumberLit(
                    2,
                ),
            },
            op: Sub,
            rhs: NumberLit(
                1,
            ),
        }
        "###);
    }

    #[test]
    fn test_negation() {
        // the sign only applies to the first term: 0 - (a * 2)
        assert_debug_snapshot!(expr("-a * 2"), @r###"
        Binary {
            lhs: NumberLit(
                0,
            ),
            op: Sub,
            rhs: Binary {
                lhs: Identifier(
                    "A",
                ),
                op: Mul,
                rhs: NumberLit(
                    2,
                ),
            },
        }
        "###);
    }

    #[test]
    fn test_unary_plus() {
        assert_eq!(expr("+5"), Expr::NumberLit(5));
    }

    #[test]
    fn test_parenthesized() {
        assert_eq!(
            expr("(1 + 2) / x"),
            Expr::Binary {
                lhs: Box::new(Expr::Binary {
                    lhs: Box::new(Expr::NumberLit(1)),
                    op: ArithOp::Add,
                    rhs: Box::new(Expr::NumberLit(2)),
                }),
                op: ArithOp::Div,
                rhs: Box::new(Expr::Identifier("X".to_string())),
            }
        );
    }

    #[test]
    fn test_unclosed_paren() {
        assert_eq!(
            expr_err("(1 + 2").to_string(),
            "[1:7] Expected: <RPAREN> found: <END-OF-INPUT>"
        );
    }

    #[test]
    fn test_string_is_not_an_expr() {
        assert_eq!(
            expr_err("1 + \"a\"").to_string(),
            "[1:5] Expected: <IDENTIFIER>, <NUMBER-LITERAL> or <LPAREN> found: <STRING-LITERAL,\"a\">"
        );
    }

    #[test]
    fn test_number_overflow() {
        assert_eq!(
            expr_err("-32768").to_string(),
            "[1:2] Invalid number format: 32768"
        );
    }
}
