//! Recursive-descent parser over the token sequence.
//!
//! ```text
//! module   := (toplevel)* EOF
//! toplevel := sexpr | EOL
//! sexpr    := LPAREN atom* RPAREN
//! atom     := sexpr | IDENTIFIER | STRINGLIT | NUMBERLIT
//! ```
//!
//! Line breaks inside a list are skipped, so a form may span several lines.

use log::debug;

use crate::{
    ast::{Expr, ExprKind, Module},
    error::{Diagnostic, ErrorCode, Result},
    span::Span,
    tokens::{PositionedToken, Token, TokenKind},
};

/// Single-token lookahead over a token slice, with one token of pushback.
struct TokenCursor<'t> {
    tokens: &'t [PositionedToken],
    position: usize,
    /// Span reported for reads past the last token.
    end: Span,
}

impl<'t> TokenCursor<'t> {
    fn new(tokens: &'t [PositionedToken]) -> Self {
        let end = tokens
            .last()
            .map(|token| Span::new(token.span.end()..token.span.end()))
            .unwrap_or_default();
        Self {
            tokens,
            position: 0,
            end,
        }
    }

    /// The next token, without consuming it.
    fn peek(&self) -> Option<&'t PositionedToken> {
        self.tokens.get(self.position)
    }

    /// Consume and return the next token.
    fn advance(&mut self) -> Option<&'t PositionedToken> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Push the last consumed token back.
    fn unget(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    /// Consume the next token, which must be of kind `expected`.
    fn eat(&mut self, expected: TokenKind) -> Result<&'t PositionedToken> {
        match self.advance() {
            Some(token) if token.kind() == expected => Ok(token),
            Some(token) => Err(Diagnostic::fatal(format!(
                "expected token {expected}, got token {}",
                token.kind()
            ))
            .with_code(ErrorCode::E103)
            .with_label(token.span, format!("expected {expected} here"))),
            None => Err(Diagnostic::fatal(format!(
                "expected token {expected}, got token {}",
                TokenKind::EndOfFile
            ))
            .with_code(ErrorCode::E103)
            .with_label(self.end, format!("expected {expected} here"))),
        }
    }
}

/// Builds the untyped [`Module`] from a token sequence.
///
/// # Errors
///
/// Returns a fatal [`Diagnostic`] for a token that cannot start a top-level
/// form, or for input that ends inside a list.
pub fn build_module(tokens: &[PositionedToken]) -> Result<Module> {
    debug!(tokens = tokens.len(); "Parsing module");
    let mut cursor = TokenCursor::new(tokens);
    let mut forms = Vec::new();

    while let Some(token) = cursor.peek() {
        match &token.token {
            Token::LParen => forms.push(parse_sexpr(&mut cursor)?),
            Token::EndOfLine => {
                cursor.eat(TokenKind::EndOfLine)?;
            }
            Token::EndOfFile => break,
            other => {
                return Err(Diagnostic::fatal(format!(
                    "unexpected {} at top level",
                    other.kind()
                ))
                .with_code(ErrorCode::E101)
                .with_label(token.span, "expected `(` to start a form")
                .with_help("top-level code must be written as lists, e.g. `(f 1)`"));
            }
        }
    }

    debug!(forms = forms.len(); "Parsed module");
    Ok(Module::new(forms))
}

/// Parses one list, starting at its `(`.
fn parse_sexpr(cursor: &mut TokenCursor<'_>) -> Result<Expr> {
    let open = cursor.eat(TokenKind::LParen)?.span;
    let mut children = Vec::new();

    loop {
        let Some(token) = cursor.advance() else {
            return Err(incomplete_input(open, cursor.end));
        };

        let child = match &token.token {
            Token::RParen => {
                return Ok(Expr::new(
                    ExprKind::SExpression(children),
                    open.union(token.span),
                ));
            }
            Token::LParen => {
                cursor.unget();
                parse_sexpr(cursor)?
            }
            Token::Identifier(name) => {
                Expr::new(ExprKind::Identifier(name.clone()), token.span)
            }
            Token::NumberLiteral(value) => Expr::new(ExprKind::NumberLiteral(*value), token.span),
            Token::StringLiteral(value) => {
                Expr::new(ExprKind::StringLiteral(value.clone()), token.span)
            }
            Token::EndOfLine => continue,
            Token::EndOfFile => return Err(incomplete_input(open, token.span)),
        };
        children.push(child);
    }
}

fn incomplete_input(open: Span, end: Span) -> Diagnostic {
    Diagnostic::fatal("incomplete input: list is never closed")
        .with_code(ErrorCode::E102)
        .with_label(open, "list opened here")
        .with_secondary_label(end, "input ends here")
        .with_help("add the missing `)`")
}
