//! Error codes for the lc diagnostic system.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Tokenizer errors
//! - `E1xx` - Structure and parser errors
//! - `E2xx` - Desugaring errors
//! - `E3xx` - Code generation errors
//! - `E9xx` - Internal compiler errors

use std::fmt;

use crate::error::Phase;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Tokenizer Errors (E0xx)
    // =========================================================================
    /// Unterminated string literal.
    ///
    /// A string was opened with a quote but never closed.
    E001,

    /// Unrecognized token.
    ///
    /// A character was found that cannot start any token.
    E002,

    /// Integer literal out of range.
    ///
    /// A run of digits does not fit in a signed 64-bit integer.
    E003,

    // =========================================================================
    // Structure and Parser Errors (E1xx)
    // =========================================================================
    /// Unbalanced parentheses.
    ///
    /// A closing parenthesis has no matching opening parenthesis.
    E100,

    /// Unexpected token at top level.
    ///
    /// Only lists and line breaks may appear between top-level forms.
    E101,

    /// Incomplete input.
    ///
    /// The input ended inside a list.
    E102,

    /// Unexpected token.
    ///
    /// The parser expected one token kind and found another.
    E103,

    // =========================================================================
    // Desugaring Errors (E2xx)
    // =========================================================================
    /// Malformed `defvar`.
    ///
    /// `defvar` takes exactly a name and an initializer.
    E200,

    /// Malformed `defun`.
    ///
    /// `defun` takes exactly a prototype list and a body.
    E201,

    /// Missing arithmetic operands.
    ///
    /// `sum`/`+` and `mul`/`*` need two operands.
    E202,

    /// Extra arithmetic operands.
    ///
    /// Operands after the second one are ignored.
    E203,

    /// Malformed function prototype.
    ///
    /// A prototype is a non-empty list of identifiers.
    E204,

    // =========================================================================
    // Code Generation Errors (E3xx)
    // =========================================================================
    /// Unknown named value.
    E300,

    /// Unknown function.
    E301,

    /// Argument count mismatch.
    E302,

    /// String literal used as a value.
    E303,

    /// List with no recognized meaning.
    E304,

    /// Function definition outside the top level.
    E305,

    /// Argument failed to generate.
    E306,

    /// Function defined more than once.
    E307,

    /// Function name reserved for the entry point.
    E308,

    /// Output could not be written.
    E309,

    /// Named value used outside the function it was computed in.
    E310,

    // =========================================================================
    // Internal Errors (E9xx)
    // =========================================================================
    /// Instruction builder misuse.
    E900,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",

            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E103 => "E103",

            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",

            ErrorCode::E300 => "E300",
            ErrorCode::E301 => "E301",
            ErrorCode::E302 => "E302",
            ErrorCode::E303 => "E303",
            ErrorCode::E304 => "E304",
            ErrorCode::E305 => "E305",
            ErrorCode::E306 => "E306",
            ErrorCode::E307 => "E307",
            ErrorCode::E308 => "E308",
            ErrorCode::E309 => "E309",
            ErrorCode::E310 => "E310",

            ErrorCode::E900 => "E900",
        }
    }

    /// The phase that reports this code.
    pub fn phase(&self) -> Phase {
        match self {
            ErrorCode::E001 | ErrorCode::E002 | ErrorCode::E003 => Phase::Tokenize,
            ErrorCode::E100 => Phase::Balance,
            ErrorCode::E101 | ErrorCode::E102 | ErrorCode::E103 => Phase::Parse,
            ErrorCode::E200
            | ErrorCode::E201
            | ErrorCode::E202
            | ErrorCode::E203
            | ErrorCode::E204 => Phase::Desugar,
            ErrorCode::E300
            | ErrorCode::E301
            | ErrorCode::E302
            | ErrorCode::E303
            | ErrorCode::E304
            | ErrorCode::E305
            | ErrorCode::E306
            | ErrorCode::E307
            | ErrorCode::E308
            | ErrorCode::E309
            | ErrorCode::E310
            | ErrorCode::E900 => Phase::Lower,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E204.to_string(), "E204");
        assert_eq!(ErrorCode::E900.to_string(), "E900");
    }

    #[test]
    fn test_error_code_phase() {
        assert_eq!(ErrorCode::E002.phase(), Phase::Tokenize);
        assert_eq!(ErrorCode::E100.phase(), Phase::Balance);
        assert_eq!(ErrorCode::E102.phase(), Phase::Parse);
        assert_eq!(ErrorCode::E203.phase(), Phase::Desugar);
        assert_eq!(ErrorCode::E302.phase(), Phase::Lower);
    }
}
