//! The core diagnostic type.
//!
//! A [`Diagnostic`] is a single message with a severity, an optional error
//! code, the phase that raised it, labeled source spans and help text.

use std::fmt;

use crate::{
    error::{ErrorCode, Label, Phase, Severity},
    span::Span,
};

/// A diagnostic message with source location information.
///
/// # Example
///
/// ```text
/// error[E301]: could not find function 'foo' at time of reference
///   ,-[1:2]
/// 1 | (foo 1)
///   :  ^^^ not defined in this module
///   `----
///   help: define it with `(defun (foo ...) ...)`
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    code: Option<ErrorCode>,
    phase: Option<Phase>,
    message: String,
    labels: Vec<Label>,
    help: Option<String>,
}

impl Diagnostic {
    /// Create an advisory diagnostic.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Create a recoverable error diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use lc_parser::error::{Diagnostic, ErrorCode};
    /// # use lc_parser::Span;
    ///
    /// let diag = Diagnostic::error("could not find named value 'y'")
    ///     .with_code(ErrorCode::E300)
    ///     .with_label(Span::new(12..13), "not bound here")
    ///     .with_help("bind it with `(defvar y ...)` or add it to the prototype");
    /// assert_eq!(diag.to_string(), "error[E300]: could not find named value 'y'");
    /// ```
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a diagnostic that stops the pipeline.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Create a diagnostic for a broken compiler invariant.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Severity::InternalError, message)
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    /// The phase that raised this diagnostic.
    ///
    /// Falls back to the phase implied by the error code.
    pub fn phase(&self) -> Option<Phase> {
        self.phase.or_else(|| self.code.map(|code| code.phase()))
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Set the phase explicitly.
    pub fn with_phase(mut self, phase: Phase) -> Self {
        self.phase = Some(phase);
        self
    }

    /// Add a primary label to this diagnostic.
    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::primary(span, message));
        self
    }

    /// Add a secondary label to this diagnostic.
    pub fn with_secondary_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push(Label::secondary(span, message));
        self
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: None,
            phase: None,
            message: message.into(),
            labels: Vec::new(),
            help: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "error[E001]: message" or "error: message"
        write!(f, "{}", self.severity)?;
        if let Some(code) = self.code {
            write!(f, "[{code}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

impl std::error::Error for Diagnostic {}
