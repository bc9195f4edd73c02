use super::*;
use crate::ast::{DeclType, RelOp, Stmt};
use crate::lexer::Keyword;

impl<'a> Parser<'a> {
    /// Parses a statement.
    pub fn parse_stmt(&mut self) -> ParseResult<Stmt> {
        match self.current.token {
            Token::Keyword(Keyword::Integer) => {
                self.parse_declaration(Keyword::Integer, DeclType::Integer)
            }
            Token::Keyword(Keyword::String) => {
                self.parse_declaration(Keyword::String, DeclType::String)
            }
            Token::Keyword(Keyword::Let) => self.parse_let_stmt(),
            Token::Keyword(Keyword::Input) => {
                self.expect(Token::Keyword(Keyword::Input))?;
                let ident = self.parse_ident()?;
                Ok(Stmt::Input { ident })
            }
            Token::Keyword(Keyword::Print) => {
                self.expect(Token::Keyword(Keyword::Print))?;
                let items = self.parse_item_list()?;
                Ok(Stmt::Print { items })
            }
            Token::Keyword(Keyword::If) => self.parse_if_stmt(),
            Token::Keyword(Keyword::Goto) => {
                self.expect(Token::Keyword(Keyword::Goto))?;
                let target = self.parse_number()?;
                Ok(Stmt::Goto { target })
            }
            Token::Keyword(Keyword::Gosub) => {
                self.expect(Token::Keyword(Keyword::Gosub))?;
                let target = self.parse_number()?;
                Ok(Stmt::Gosub { target })
            }
            Token::Keyword(Keyword::Return) => {
                self.expect(Token::Keyword(Keyword::Return))?;
                Ok(Stmt::Return)
            }
            Token::Keyword(Keyword::End) => {
                self.expect(Token::Keyword(Keyword::End))?;
                Ok(Stmt::End)
            }
            _ => Err(self.unexpected("<STATEMENT>")),
        }
    }

    /// Parses `INTEGER identlist` or `STRING identlist`.
    fn parse_declaration(&mut self, keyword: Keyword, ty: DeclType) -> ParseResult<Stmt> {
        self.expect(Token::Keyword(keyword))?;

        let mut idents = vec![self.parse_ident()?];
        while self.eat(&Token::Comma)? {
            idents.push(self.parse_ident()?);
        }

        Ok(Stmt::Declare { ty, idents })
    }

    fn parse_let_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Keyword(Keyword::Let))?;
        let ident = self.parse_ident()?;
        self.expect(Token::Equals)?;
        let value = self.parse_item()?;
        Ok(Stmt::Let { ident, value })
    }

    /// Parses `IF expr relop expr THEN statement`.
    /// The nested statement may itself be an `IF`.
    fn parse_if_stmt(&mut self) -> ParseResult<Stmt> {
        self.expect(Token::Keyword(Keyword::If))?;
        let lhs = self.parse_expr()?;
        let relop = self.parse_relop()?;
        let rhs = self.parse_expr()?;
        self.expect(Token::Keyword(Keyword::Then))?;
        let then = Box::new(self.parse_stmt()?);
        Ok(Stmt::If {
            lhs,
            relop,
            rhs,
            then,
        })
    }

    fn parse_relop(&mut self) -> ParseResult<RelOp> {
        let relop = match self.current.token {
            Token::LessThan => RelOp::Less,
            Token::LessThanEquals => RelOp::LessEquals,
            Token::GreaterThan => RelOp::Greater,
            Token::GreaterThanEquals => RelOp::GreaterEquals,
            Token::EqualsEquals => RelOp::Equals,
            Token::NotEquals => RelOp::NotEquals,
            _ => return Err(self.unexpected("<REL-OP>")),
        };
        self.next()?;
        Ok(relop)
    }
}
