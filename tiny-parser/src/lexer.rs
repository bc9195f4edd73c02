use crate::error::{LexicalError, LexicalErrorKind};
use logos::Logos;
use std::fmt;
use tiny_source::{Position, Source};

#[derive(Debug, Logos, Clone, PartialEq)]
pub enum Token {
    // literals
    /// Kept as text, range checking happens in the parser.
    #[regex("[0-9]+", |lex| lex.slice().to_string())]
    NumberLit(String),
    /// Never spans a line break.
    #[regex(r#""[^"\r\n]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z][a-zA-Z0-9]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// Promoted from [`Token::Identifier`] by [`Lexer`].
    Keyword(Keyword),

    // arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be a sign
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,

    // assignment
    #[token("=")]
    Equals,

    // relational operators
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    #[token("<>")]
    NotEquals,
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,
    #[token("\r\n")]
    LineBreak,

    // misc
    #[regex(r"[ \t]+", logos::skip)]
    #[regex(r"#[^\r]*", logos::skip)] // comments run up to the line break
    #[error]
    Error,

    /// Only generated by [`Lexer`] when the underlying lexer is exhausted.
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Integer,
    String,
    Let,
    Input,
    Print,
    If,
    Then,
    Goto,
    Gosub,
    Return,
    End,
}

impl Keyword {
    /// Returns the keyword spelled by `ident`, ignoring case.
    pub fn from_ident(ident: &str) -> Option<Keyword> {
        let keyword = match ident.to_ascii_uppercase().as_str() {
            "INTEGER" => Keyword::Integer,
            "STRING" => Keyword::String,
            "LET" => Keyword::Let,
            "INPUT" => Keyword::Input,
            "PRINT" => Keyword::Print,
            "IF" => Keyword::If,
            "THEN" => Keyword::Then,
            "GOTO" => Keyword::Goto,
            "GOSUB" => Keyword::Gosub,
            "RETURN" => Keyword::Return,
            "END" => Keyword::End,
            _ => return None,
        };
        Some(keyword)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Keyword::Integer => "INTEGER",
            Keyword::String => "STRING",
            Keyword::Let => "LET",
            Keyword::Input => "INPUT",
            Keyword::Print => "PRINT",
            Keyword::If => "IF",
            Keyword::Then => "THEN",
            Keyword::Goto => "GOTO",
            Keyword::Gosub => "GOSUB",
            Keyword::Return => "RETURN",
            Keyword::End => "END",
        };
        write!(f, "{}", keyword)
    }
}

/// Formats as `<KIND>` or `<KIND,"value">`.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::NumberLit(text) => write!(f, "<NUMBER-LITERAL,\"{}\">", text),
            Token::StringLit(text) => write!(f, "<STRING-LITERAL,\"{}\">", text),
            Token::Identifier(ident) => write!(f, "<IDENTIFIER,\"{}\">", ident),
            Token::Keyword(keyword) => write!(f, "<KEYWORD,\"{}\">", keyword),
            Token::Plus => write!(f, "<ARITH-OP,\"+\">"),
            Token::Minus => write!(f, "<ARITH-OP,\"-\">"),
            Token::Asterisk => write!(f, "<ARITH-OP,\"*\">"),
            Token::Slash => write!(f, "<ARITH-OP,\"/\">"),
            Token::Equals => write!(f, "<ASSIGN>"),
            Token::EqualsEquals => write!(f, "<REL-OP,\"==\">"),
            Token::NotEquals => write!(f, "<REL-OP,\"!=\">"),
            Token::GreaterThan => write!(f, "<REL-OP,\">\">"),
            Token::GreaterThanEquals => write!(f, "<REL-OP,\">=\">"),
            Token::LessThan => write!(f, "<REL-OP,\"<\">"),
            Token::LessThanEquals => write!(f, "<REL-OP,\"<=\">"),
            Token::OpenParen => write!(f, "<LPAREN>"),
            Token::CloseParen => write!(f, "<RPAREN>"),
            Token::Comma => write!(f, "<COMMA>"),
            Token::LineBreak => write!(f, "<LINE-BREAK>"),
            Token::Error => write!(f, "<ERROR>"),
            Token::Eof => write!(f, "<END-OF-INPUT>"),
        }
    }
}

/// A token together with the position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub position: Position,
}

/// Lazily tokenizes a [`Source`].
///
/// Wraps the generated [`logos::Lexer`] to compute row/column positions, promote identifiers to
/// keywords and classify lexical errors. Once the input is exhausted, [`Lexer::next_token`] keeps
/// returning [`Token::Eof`].
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
    source: &'a Source<'a>,
    /// Set once `Eof` or an error has been yielded through [`Iterator`].
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            inner: Token::lexer(source.content),
            source,
            done: false,
        }
    }

    /// Returns the next token or a [`LexicalError`] if the input at the current position is not valid.
    pub fn next_token(&mut self) -> Result<Lexeme, LexicalError> {
        let token = match self.inner.next() {
            Some(token) => token,
            None => {
                return Ok(Lexeme {
                    token: Token::Eof,
                    position: self.source.end_position(),
                })
            }
        };
        let position = self.source.position(self.inner.span().start);

        let token = match token {
            Token::Error => return Err(self.error(position)),
            Token::Identifier(ident) => match Keyword::from_ident(&ident) {
                Some(keyword) => Token::Keyword(keyword),
                None => Token::Identifier(ident),
            },
            token => token,
        };
        Ok(Lexeme { token, position })
    }

    /// Classifies the text logos could not match.
    fn error(&self, position: Position) -> LexicalError {
        let offending = self.source.content[self.inner.span().start..]
            .chars()
            .next()
            .unwrap_or('\0');
        let kind = match offending {
            '"' => LexicalErrorKind::UnterminatedString,
            '\r' | '\n' => LexicalErrorKind::MalformedLineBreak,
            '!' => LexicalErrorKind::Expected {
                expected: '=',
                after: '!',
            },
            c => LexicalErrorKind::InvalidCharacter(c),
        };
        LexicalError::new(kind, position)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Lexeme, LexicalError>;

    /// Yields every token up to and including [`Token::Eof`], or up to the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let next = self.next_token();
        self.done = match &next {
            Ok(lexeme) => lexeme.token == Token::Eof,
            Err(_) => true,
        };
        Some(next)
    }
}
