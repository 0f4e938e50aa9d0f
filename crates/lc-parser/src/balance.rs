//! Structural pre-check of parenthesis nesting.

use log::{debug, warn};

use crate::{
    error::{Diagnostic, ErrorCode, Result},
    tokens::{PositionedToken, Token},
};

/// Checks that no `)` closes more lists than were opened before it.
///
/// The whole token sequence is scanned before parsing starts. The first
/// offending `)` is reported. Unclosed `(`s are not rejected here; the parser
/// reports them when it reaches the end of input inside a list.
///
/// Returns the nesting depth at the end of the input.
///
/// # Errors
///
/// Returns a fatal [`Diagnostic`] labelled at the first unmatched `)`.
pub fn check_balance(tokens: &[PositionedToken]) -> Result<usize> {
    let mut depth = 0usize;
    let mut first_unmatched = None;

    for token in tokens {
        match token.token {
            Token::LParen => depth += 1,
            Token::RParen => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => {
                    first_unmatched.get_or_insert(token.span);
                }
            },
            _ => {}
        }
    }

    if let Some(span) = first_unmatched {
        return Err(Diagnostic::fatal("unbalanced parens")
            .with_code(ErrorCode::E100)
            .with_label(span, "this `)` has no matching `(`")
            .with_help("remove the extra `)` or add the missing `(`"));
    }

    if depth > 0 {
        warn!(depth; "Input ends with unclosed lists");
    }
    debug!(depth; "Parens balanced");
    Ok(depth)
}
