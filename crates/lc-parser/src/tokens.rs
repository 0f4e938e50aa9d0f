//! Tokens produced by the [tokenizer](crate::tokenize).

use std::fmt;

use crate::span::Span;

/// A single token of the language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    LParen,
    RParen,
    Identifier(String),
    NumberLiteral(i64),
    /// The raw text between the quotes; escapes are kept as written.
    StringLiteral(String),
    EndOfLine,
    EndOfFile,
}

/// The kind of a [`Token`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LParen,
    RParen,
    Identifier,
    NumberLiteral,
    StringLiteral,
    EndOfLine,
    EndOfFile,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::LParen => TokenKind::LParen,
            Token::RParen => TokenKind::RParen,
            Token::Identifier(_) => TokenKind::Identifier,
            Token::NumberLiteral(_) => TokenKind::NumberLiteral,
            Token::StringLiteral(_) => TokenKind::StringLiteral,
            Token::EndOfLine => TokenKind::EndOfLine,
            Token::EndOfFile => TokenKind::EndOfFile,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::Identifier => "identifier",
            TokenKind::NumberLiteral => "number literal",
            TokenKind::StringLiteral => "string literal",
            TokenKind::EndOfLine => "end of line",
            TokenKind::EndOfFile => "end of file",
        };
        f.write_str(name)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LParen => write!(f, "LParen"),
            Token::RParen => write!(f, "RParen"),
            Token::Identifier(name) => write!(f, "Identifier {name}"),
            Token::NumberLiteral(value) => write!(f, "NumberLiteral {value}"),
            Token::StringLiteral(value) => write!(f, "StringLiteral \"{value}\""),
            Token::EndOfLine => write!(f, "EndOfLine"),
            Token::EndOfFile => write!(f, "EndOfFile"),
        }
    }
}

/// A token together with its span in the original source.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionedToken {
    pub token: Token,
    pub span: Span,
}

impl PositionedToken {
    pub fn new(token: Token, span: Span) -> Self {
        Self { token, span }
    }

    pub fn kind(&self) -> TokenKind {
        self.token.kind()
    }
}

impl fmt::Display for PositionedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>5}  {}", self.span.start(), self.token)
    }
}
