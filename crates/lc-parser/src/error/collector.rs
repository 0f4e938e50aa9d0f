//! The diagnostic registry shared by every pipeline stage.
//!
//! Stages record recoverable problems here and keep going; a fatal problem is
//! returned as an `Err(Diagnostic)` instead, and the driver records it before
//! stopping.

use log::{debug, trace};

use crate::{
    error::{CompileError, Diagnostic, Phase, Severity},
    span::Span,
};

/// Accumulates diagnostics in the order they are recorded.
///
/// # Example
///
/// ```
/// # use lc_parser::error::{Diagnostic, DiagnosticCollector, ErrorCode};
/// # use lc_parser::Span;
///
/// let mut collector = DiagnosticCollector::new();
/// collector.emit(
///     Diagnostic::error("could not find function 'foo' at time of reference")
///         .with_code(ErrorCode::E301)
///         .with_label(Span::new(1..4), "not defined"),
/// );
///
/// assert!(collector.has_errors());
/// assert!(collector.finish().is_err());
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    has_errors: bool,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic.
    ///
    /// Anything other than [`Severity::Info`] marks the run as failed.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.severity().is_error() {
            self.has_errors = true;
        }
        trace!(
            severity:% = diagnostic.severity(),
            phase:? = diagnostic.phase();
            "Recorded diagnostic: {}", diagnostic.message()
        );
        self.diagnostics.push(diagnostic);
    }

    /// Record a plain message for `phase`, optionally anchored at `span`.
    pub fn register(
        &mut self,
        phase: Phase,
        message: impl Into<String>,
        severity: Severity,
        span: Option<Span>,
    ) {
        let mut diagnostic = match severity {
            Severity::Info => Diagnostic::info(message),
            Severity::Error => Diagnostic::error(message),
            Severity::Fatal => Diagnostic::fatal(message),
            Severity::InternalError => Diagnostic::internal(message),
        }
        .with_phase(phase);
        if let Some(span) = span {
            diagnostic = diagnostic.with_label(span, phase.as_str());
        }
        self.emit(diagnostic);
    }

    /// Returns `true` once any error, fatal or internal error was recorded.
    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// All diagnostics in recorded order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finish the run.
    ///
    /// - If anything failed the run, returns `Err(CompileError)` with all diagnostics.
    /// - Otherwise returns the advisory diagnostics that were recorded.
    pub fn finish(self) -> Result<Vec<Diagnostic>, CompileError> {
        debug!(
            diagnostics = self.diagnostics.len(),
            failed = self.has_errors;
            "Finishing diagnostic collection"
        );
        if self.has_errors {
            Err(CompileError::new(self.diagnostics))
        } else {
            Ok(self.diagnostics)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_collector_new_finish_ok() {
        let collector = DiagnosticCollector::new();
        assert!(!collector.has_errors());
        assert_eq!(collector.finish().unwrap().len(), 0);
    }

    #[test]
    fn test_collector_emit_info_finish_ok() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::info("extra operands ignored").with_code(ErrorCode::E203));

        assert!(!collector.has_errors());
        let diagnostics = collector.finish().unwrap();
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_collector_keeps_recorded_order() {
        let mut collector = DiagnosticCollector::new();
        collector.emit(Diagnostic::error("error 1"));
        collector.emit(Diagnostic::info("info 1"));
        collector.emit(Diagnostic::fatal("fatal 1"));

        let err = collector.finish().unwrap_err();
        let messages: Vec<_> = err.diagnostics().iter().map(|d| d.message()).collect();
        assert_eq!(messages, ["error 1", "info 1", "fatal 1"]);
    }

    #[test]
    fn test_collector_register() {
        let mut collector = DiagnosticCollector::new();
        collector.register(
            Phase::Lower,
            "could not open output",
            Severity::Fatal,
            None,
        );
        collector.register(
            Phase::Parse,
            "unexpected token",
            Severity::Error,
            Some(Span::new(3..4)),
        );

        assert!(collector.has_errors());
        let diagnostics = collector.diagnostics();
        assert_eq!(diagnostics[0].phase(), Some(Phase::Lower));
        assert!(diagnostics[0].labels().is_empty());
        assert_eq!(diagnostics[1].labels()[0].span(), Span::new(3..4));
    }
}
