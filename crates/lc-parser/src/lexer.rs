//! Tokenizer for preprocessed source text.
//!
//! The tokenizer dispatches on the next character of the normalized stream:
//! parens, blanks, line breaks, `;` comments, integer literals, string
//! literals and, for any other run of non-blank characters, identifiers.
//! Token spans are mapped back through the [`ProvenanceMap`] so they refer to
//! the original source.
//!
//! Unlike the later stages, the tokenizer stops at the first problem: there is
//! no meaningful token to recover with, so the error is returned as a fatal
//! [`Diagnostic`].

use log::{debug, trace};
use winnow::{
    Parser as _,
    ascii::digit1,
    combinator::{alt, cut_err, opt, preceded, repeat, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{any, none_of, take_till, take_while},
};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    preprocess::{Preprocessed, ProvenanceMap},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Diagnostic details attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    code: ErrorCode,
    message: &'static str,
    label: &'static str,
    help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn paren<'a>(input: &mut Input<'a>) -> IResult<'a, Token> {
    alt(('('.value(Token::LParen), ')'.value(Token::RParen))).parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token> {
    '\n'.value(Token::EndOfLine).parse_next(input)
}

/// Spaces, tabs and carriage returns.
fn blank<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    take_while(1.., [' ', '\t', '\r']).void().parse_next(input)
}

/// A `;` comment, including the line break that ends it.
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, ()> {
    (';', take_till(0.., '\n'), opt('\n'))
        .void()
        .parse_next(input)
}

fn digits<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    digit1.parse_next(input)
}

/// A run of decimal digits.
///
/// The run stops at the first non-digit, so `12ab` is the number `12`
/// followed by the identifier `ab`.
fn number_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token> {
    let start = input.current_token_start();
    let digits = digits(input)?;
    match digits.parse::<i64>() {
        Ok(value) => Ok(Token::NumberLiteral(value)),
        Err(_) => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "integer literal out of range",
                label: "does not fit in a 64-bit signed integer",
                help: None,
                start,
            },
        ))),
    }
}

/// A double-quoted string.
///
/// The body runs to the next unescaped `"` and is kept verbatim: a backslash
/// only prevents the following character from closing the string.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token> {
    let start = input.current_token_start();

    let character = alt((preceded('\\', any).void(), none_of(['"', '\\']).void()));
    let body = repeat(0.., character).map(|()| ()).take();

    preceded('"', cut_err(terminated(body, '"')))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated string literal",
            label: "string starts here",
            help: Some("add closing `\"`"),
            start,
        })
        .map(|body: &str| Token::StringLiteral(body.to_owned()))
        .parse_next(input)
}

/// Any other run of characters that are neither blank nor parens.
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token> {
    take_while(1.., |c: char| !c.is_whitespace() && c != '(' && c != ')')
        .map(|name: &str| Token::Identifier(name.to_owned()))
        .parse_next(input)
}

/// A whitespace character that no rule accepts.
fn unrecognized<'a, O>(input: &mut Input<'a>) -> IResult<'a, O> {
    let start = input.current_token_start();
    Err(ErrMode::Cut(ContextError::new().add_context(
        input,
        &input.checkpoint(),
        LexerDiagnostic {
            code: ErrorCode::E002,
            message: "unrecognized token",
            label: "this character cannot start a token",
            help: Some("only spaces, tabs and line breaks separate tokens"),
            start,
        },
    )))
}

/// Lex whatever starts at the current position.
///
/// Returns `None` for input that produces no token (blanks and comments).
fn next_token<'a>(input: &mut Input<'a>) -> IResult<'a, Option<Token>> {
    let Some(next) = input.chars().next() else {
        return Ok(None);
    };

    match next {
        '(' | ')' => paren(input).map(Some),
        '\n' => newline(input).map(Some),
        ' ' | '\t' | '\r' => blank(input).map(|()| None),
        ';' => line_comment(input).map(|()| None),
        '"' => string_literal(input).map(Some),
        c if c.is_ascii_digit() => number_literal(input).map(Some),
        c if c.is_whitespace() => unrecognized(input),
        _ => identifier(input).map(Some),
    }
}

/// Tokenizer state for one normalized text.
struct Lexer<'a> {
    text: &'a str,
    provenance: &'a ProvenanceMap,
    tokens: Vec<PositionedToken>,
}

impl<'a> Lexer<'a> {
    fn new(preprocessed: &'a Preprocessed) -> Self {
        Self {
            text: preprocessed.text(),
            provenance: preprocessed.provenance(),
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<PositionedToken>> {
        let mut input = LocatingSlice::new(self.text);

        while !input.is_empty() {
            let start = input.current_token_start();
            match next_token(&mut input) {
                Ok(Some(token)) => {
                    let end = input.current_token_start();
                    let span = self.provenance.original_span(start..end);
                    trace!(token:% = token, start = span.start(); "Token");
                    self.tokens.push(PositionedToken::new(token, span));
                }
                Ok(None) => {}
                Err(err) => return Err(self.convert_err_mode(err, input.current_token_start())),
            }
        }

        let end = self.provenance.source_len();
        self.tokens
            .push(PositionedToken::new(Token::EndOfFile, Span::new(end..end)));
        Ok(self.tokens)
    }

    /// Convert an ErrMode and error position to a fatal [`Diagnostic`] in
    /// original source coordinates.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        let fallback = LexerDiagnostic {
            code: ErrorCode::E002,
            message: "unrecognized token",
            label: "this character cannot start a token",
            help: None,
            start: error_pos,
        };
        let LexerDiagnostic {
            code,
            message,
            label,
            help,
            start,
        } = context_error.context().next().cloned().unwrap_or(fallback);

        let end = if error_pos > start {
            error_pos
        } else {
            start + self.char_len_at(start)
        };
        let span = self.provenance.original_span(start..end);

        let mut diag = Diagnostic::fatal(message)
            .with_code(code)
            .with_label(span, label);
        if let Some(help) = help {
            diag = diag.with_help(help);
        }
        diag
    }

    fn char_len_at(&self, offset: usize) -> usize {
        self.text
            .get(offset..)
            .and_then(|rest| rest.chars().next())
            .map_or(0, char::len_utf8)
    }
}

/// Tokenizes a preprocessed text.
///
/// The returned sequence always ends with a single [`Token::EndOfFile`].
///
/// # Errors
///
/// Returns a fatal [`Diagnostic`] for the first character sequence that does
/// not form a token.
pub fn tokenize(preprocessed: &Preprocessed) -> Result<Vec<PositionedToken>> {
    debug!(bytes = preprocessed.text().len(); "Tokenizing");
    let tokens = Lexer::new(preprocessed).tokenize()?;
    debug!(tokens = tokens.len(); "Tokenized");
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::Severity, preprocess::preprocess};

    fn lex(source: &str) -> Vec<Token> {
        tokenize(&preprocess(source))
            .unwrap_or_else(|err| panic!("failed to tokenize {source:?}: {err}"))
            .into_iter()
            .map(|token| token.token)
            .collect()
    }

    fn lex_err(source: &str) -> Diagnostic {
        match tokenize(&preprocess(source)) {
            Ok(tokens) => panic!("expected {source:?} to fail, got {tokens:?}"),
            Err(err) => err,
        }
    }

    fn ident(name: &str) -> Token {
        Token::Identifier(name.to_owned())
    }

    #[test]
    fn test_single_tokens() {
        assert_eq!(lex("("), [Token::LParen, Token::EndOfFile]);
        assert_eq!(lex(")"), [Token::RParen, Token::EndOfFile]);
        assert_eq!(lex("foo"), [ident("foo"), Token::EndOfFile]);
        assert_eq!(lex("42"), [Token::NumberLiteral(42), Token::EndOfFile]);
        assert_eq!(
            lex("\"hi there\""),
            [Token::StringLiteral("hi there".into()), Token::EndOfFile]
        );
        assert_eq!(lex("\n"), [Token::EndOfLine, Token::EndOfFile]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(lex(""), [Token::EndOfFile]);
        assert_eq!(lex("  \t\r "), [Token::EndOfFile]);
    }

    #[test]
    fn test_special_form_heads_are_identifiers() {
        assert_eq!(
            lex("(+ 1 2)"),
            [
                Token::LParen,
                ident("+"),
                Token::NumberLiteral(1),
                Token::NumberLiteral(2),
                Token::RParen,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_parens_split_atoms() {
        assert_eq!(
            lex("(f(g))"),
            [
                Token::LParen,
                ident("f"),
                Token::LParen,
                ident("g"),
                Token::RParen,
                Token::RParen,
                Token::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_number_followed_by_letters() {
        assert_eq!(
            lex("12ab"),
            [Token::NumberLiteral(12), ident("ab"), Token::EndOfFile]
        );
    }

    #[test]
    fn test_negative_looking_number_is_identifier() {
        assert_eq!(lex("-5"), [ident("-5"), Token::EndOfFile]);
    }

    #[test]
    fn test_comment_consumes_newline() {
        assert_eq!(
            lex("; header\n(x)\n"),
            [
                Token::LParen,
                ident("x"),
                Token::RParen,
                Token::EndOfLine,
                Token::EndOfFile,
            ]
        );
        assert_eq!(lex("(x) ; trailing"), lex("(x)"));
    }

    #[test]
    fn test_string_escapes_are_raw() {
        assert_eq!(
            lex(r#""a\"b\n""#),
            [Token::StringLiteral(r#"a\"b\n"#.into()), Token::EndOfFile]
        );
    }

    #[test]
    fn test_string_may_span_lines() {
        assert_eq!(
            lex("\"one\ntwo\""),
            [Token::StringLiteral("one\ntwo".into()), Token::EndOfFile]
        );
    }

    #[test]
    fn test_string_keeps_parens_padding() {
        // The preprocessor pads parens even inside strings.
        assert_eq!(
            lex("\"(x)\""),
            [Token::StringLiteral(" ( x ) ".into()), Token::EndOfFile]
        );
    }

    #[test]
    fn test_spans_are_original_offsets() {
        let tokens = tokenize(&preprocess("(sum 12 x)")).unwrap();
        let spans: Vec<_> = tokens
            .iter()
            .map(|t| (t.span.start(), t.span.end()))
            .collect();
        assert_eq!(spans, [(0, 1), (1, 4), (5, 7), (8, 9), (9, 10), (10, 10)]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = lex_err("(f \"abc");
        assert_eq!(err.severity(), Severity::Fatal);
        assert_eq!(err.code(), Some(ErrorCode::E001));
        assert_eq!(err.labels()[0].span().start(), 3);
    }

    #[test]
    fn test_trailing_backslash_in_string() {
        let err = lex_err("\"abc\\");
        assert_eq!(err.code(), Some(ErrorCode::E001));
    }

    #[test]
    fn test_integer_overflow() {
        let err = lex_err("(f 99999999999999999999)");
        assert_eq!(err.code(), Some(ErrorCode::E003));
        let span = err.labels()[0].span();
        assert_eq!((span.start(), span.end()), (3, 23));
    }

    #[test]
    fn test_unrecognized_whitespace() {
        let err = lex_err("(f\u{000C}1)");
        assert_eq!(err.code(), Some(ErrorCode::E002));
        assert_eq!(err.severity(), Severity::Fatal);
        let span = err.labels()[0].span();
        assert_eq!((span.start(), span.end()), (2, 3));
    }
}
