//! Error adapter for converting lc diagnostics and errors to miette reports.
//!
//! This module bridges the library's error types and miette's graphical
//! formatting used in the CLI. Every recorded [`Diagnostic`] becomes its own
//! [`Reportable`], so a failed run prints each message in recorded order.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan, Severity as MietteSeverity, SourceSpan};

use lc::{
    LcError,
    diagnostics::{Diagnostic, Severity},
};

/// Adapter for a single lc diagnostic.
pub struct DiagnosticAdapter<'a> {
    diag: &'a Diagnostic,
    /// Source code for displaying snippets
    src: &'a str,
}

impl<'a> DiagnosticAdapter<'a> {
    /// Create a new diagnostic adapter.
    pub fn new(diag: &'a Diagnostic, src: &'a str) -> Self {
        Self { diag, src }
    }
}

impl fmt::Debug for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiagnosticAdapter")
            .field("diag", &self.diag)
            .finish()
    }
}

impl fmt::Display for DiagnosticAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.diag.severity() {
            Severity::Info | Severity::Error => write!(f, "{}", self.diag.message()),
            severity @ (Severity::Fatal | Severity::InternalError) => {
                write!(f, "{severity}: {}", self.diag.message())
            }
        }
    }
}

impl std::error::Error for DiagnosticAdapter<'_> {}

impl MietteDiagnostic for DiagnosticAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .code()
            .map(|c| Box::new(c) as Box<dyn fmt::Display>)
    }

    fn severity(&self) -> Option<MietteSeverity> {
        Some(match self.diag.severity() {
            Severity::Info => MietteSeverity::Advice,
            Severity::Error | Severity::Fatal | Severity::InternalError => MietteSeverity::Error,
        })
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.diag
            .help()
            .map(|h| Box::new(h) as Box<dyn fmt::Display>)
    }

    fn source_code(&self) -> Option<&dyn miette::SourceCode> {
        Some(&self.src as &dyn miette::SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let labels = self.diag.labels();
        if labels.is_empty() {
            return None;
        }

        Some(Box::new(labels.iter().map(|label| {
            let span = span_to_miette(label.span());
            let message = Some(label.message().to_string());
            if label.is_primary() {
                LabeledSpan::new_primary_with_span(message, span)
            } else {
                LabeledSpan::new_with_span(message, span)
            }
        })))
    }
}

/// Adapter for [`LcError`] variants that carry no diagnostics.
pub struct ErrorAdapter<'a>(pub &'a LcError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(self.0)
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            LcError::Io(_) => "lc::io",
            LcError::Compile { .. } => return None,
            LcError::Eval(_) => "lc::eval",
            LcError::Config(_) => "lc::config",
            LcError::NoTarget => "lc::internal",
        };
        Some(Box::new(code))
    }
}

/// A diagnostic or error ready to be rendered by miette.
pub type Reportable<'a> = Box<dyn MietteDiagnostic + 'a>;

/// Convert an lc [`Span`](lc_parser::Span) to a miette [`SourceSpan`].
fn span_to_miette(span: lc_parser::Span) -> SourceSpan {
    SourceSpan::new(span.start().into(), span.len())
}

/// Wraps each of `diagnostics` for rendering against `src`.
pub fn diagnostics_to_reportables<'a>(
    diagnostics: &'a [Diagnostic],
    src: &'a str,
) -> Vec<Reportable<'a>> {
    diagnostics
        .iter()
        .map(|d| Box::new(DiagnosticAdapter::new(d, src)) as Reportable<'a>)
        .collect()
}

/// Convert an [`LcError`] into a list of reportable errors.
///
/// A compile error yields one entry per recorded diagnostic, any other error a
/// single entry.
pub fn to_reportables(err: &LcError) -> Vec<Reportable<'_>> {
    match err {
        LcError::Compile {
            err: compile_err,
            src,
        } => diagnostics_to_reportables(compile_err.diagnostics(), src),
        _ => vec![Box::new(ErrorAdapter(err)) as Reportable<'_>],
    }
}
