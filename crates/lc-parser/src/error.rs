//! Error and diagnostic system for the lc front end.
//!
//! Every stage reports through [`Diagnostic`]s. Recoverable problems are
//! recorded in a [`DiagnosticCollector`] and processing continues; fatal ones
//! are returned as `Err(Diagnostic)` so the driver can stop the pipeline at
//! the point of detection. A failed run ends as a [`CompileError`] carrying
//! everything that was recorded.
//!
//! # Example
//!
//! ```
//! # use lc_parser::error::{Diagnostic, ErrorCode, Severity};
//! # use lc_parser::Span;
//!
//! let diag = Diagnostic::fatal("unbalanced parens")
//!     .with_code(ErrorCode::E100)
//!     .with_label(Span::new(7..8), "no matching `(`")
//!     .with_help("remove the extra `)`");
//! assert_eq!(diag.severity(), Severity::Fatal);
//! ```

mod collector;
mod compile_error;
mod diagnostic;
mod error_code;
mod label;
mod phase;
mod severity;

pub(crate) use compile_error::Result;

pub use collector::DiagnosticCollector;
pub use compile_error::CompileError;
pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use phase::Phase;
pub use severity::Severity;
