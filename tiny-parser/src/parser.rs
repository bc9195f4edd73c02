use crate::ast::{Line, Program};
use crate::error::{ParseError, SyntaxError};
use crate::lexer::{Lexeme, Lexer, Token};
use std::mem;
use tiny_source::Source;
use tracing::debug;

mod expr;
mod stmt;

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive descent parser. Stops at the first lexical or syntax error.
pub struct Parser<'a> {
    /// Cached token for peeking.
    current: Lexeme,
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    /// Creates a parser and reads the first look-ahead token.
    pub fn new(source: &'a Source<'a>) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        Ok(Self {
            current: lexer.next_token()?,
            lexer,
        })
    }
}

impl<'a> Parser<'a> {
    /// Parses a whole program.
    /// Lines are only parsed when they start with a number; blank lines (and comment-only lines) are skipped.
    pub fn parse_program(&mut self) -> ParseResult<Program> {
        let mut lines = Vec::new();

        while self.current.token != Token::Eof {
            if let Token::NumberLit(_) = self.current.token {
                lines.push(self.parse_line()?);
            }
            if self.current.token == Token::Eof {
                break;
            }
            self.expect(Token::LineBreak)?;
        }

        debug!(lines = lines.len(), "parsed program");
        Ok(Program { lines })
    }

    fn parse_line(&mut self) -> ParseResult<Line> {
        let number = self.parse_number()?;
        let stmt = self.parse_stmt()?;
        Ok(Line { number, stmt })
    }

    /// Parses a number literal that must fit in an `i16`.
    fn parse_number(&mut self) -> ParseResult<i16> {
        match &self.current.token {
            Token::NumberLit(text) => {
                let number = text
                    .parse::<i16>()
                    .map_err(|_| SyntaxError::NumberOutOfRange {
                        text: text.clone(),
                        position: self.current.position,
                    })?;
                self.next()?;
                Ok(number)
            }
            _ => Err(self.unexpected("<NUMBER-LITERAL>")),
        }
    }

    /// Parses an identifier. Identifiers are canonicalized to uppercase.
    fn parse_ident(&mut self) -> ParseResult<String> {
        match &self.current.token {
            Token::Identifier(ident) => {
                let ident = ident.to_ascii_uppercase();
                self.next()?;
                Ok(ident)
            }
            _ => Err(self.unexpected("<IDENTIFIER>")),
        }
    }
}

/// Parse utilities
impl<'a> Parser<'a> {
    /// Advances to the next token and returns the previous one.
    fn next(&mut self) -> ParseResult<Lexeme> {
        let next = self.lexer.next_token()?;
        Ok(mem::replace(&mut self.current, next))
    }

    /// Predicate that tests whether the current token is `tok` and eats it if yes as a side effect.
    fn eat(&mut self, tok: &Token) -> ParseResult<bool> {
        if self.current.token == *tok {
            self.next()?; // eat token
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect(&mut self, tok: Token) -> ParseResult<()> {
        if self.eat(&tok)? {
            Ok(())
        } else {
            Err(self.unexpected(tok))
        }
    }

    /// Creates an unexpected token error at the current token.
    fn unexpected(&self, expected: impl ToString) -> ParseError {
        SyntaxError::Unexpected {
            expected: expected.to_string(),
            found: self.current.token.to_string(),
            position: self.current.position,
        }
        .into()
    }
}
