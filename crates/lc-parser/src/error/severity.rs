//! Severity levels for diagnostics.

use std::fmt;

/// The severity level of a diagnostic.
///
/// - [`Severity::Info`] is advisory and never fails a run
/// - [`Severity::Error`] is recoverable: processing continues, the run fails
/// - [`Severity::Fatal`] stops the pipeline at the point of detection
/// - [`Severity::InternalError`] marks a broken compiler invariant and is
///   always fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    /// Advisory message, hidden unless explicitly requested.
    Info,

    /// A recoverable error affecting a single expression.
    Error,

    /// An unrecoverable error in the user's program.
    Fatal,

    /// An invariant violation inside the compiler itself.
    InternalError,
}

impl Severity {
    /// Returns `true` if this severity marks the run as failed.
    pub fn is_error(&self) -> bool {
        !matches!(self, Severity::Info)
    }

    /// Returns `true` if this severity stops the pipeline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Severity::Fatal | Severity::InternalError)
    }

    /// Returns `true` if this is an advisory severity.
    pub fn is_info(&self) -> bool {
        matches!(self, Severity::Info)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
            Severity::InternalError => write!(f, "internal error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_predicates() {
        assert!(!Severity::Info.is_error());
        assert!(Severity::Info.is_info());
        assert!(Severity::Error.is_error());
        assert!(!Severity::Error.is_fatal());
        assert!(Severity::Fatal.is_fatal());
        assert!(Severity::InternalError.is_error());
        assert!(Severity::InternalError.is_fatal());
    }

    #[test]
    fn test_severity_display() {
        assert_eq!(Severity::Info.to_string(), "info");
        assert_eq!(Severity::Fatal.to_string(), "fatal");
        assert_eq!(Severity::InternalError.to_string(), "internal error");
    }
}
