//! # lc Parser
//!
//! Front end of the lc compiler for a small S-expression language. The
//! pipeline runs each stage to completion before the next one starts:
//!
//! 1. **Preprocess** - Pad parens with spaces and record provenance
//! 2. **Tokenize** - Turn the normalized text into tokens
//! 3. **Balance** - Reject any `)` without a matching `(`
//! 4. **Parse** - Build the untyped list tree
//! 5. **Desugar** - Rewrite special forms and calls into typed nodes
//!
//! Every stage is exported so drivers can inspect intermediate results;
//! [`parse`] runs them all.
//!
//! ## Usage
//!
//! ```
//! # use lc_parser::{parse, error::DiagnosticCollector};
//! let mut diagnostics = DiagnosticCollector::new();
//! let module = parse("(defun (f a b) (sum a b))\n(f 4 5)", &mut diagnostics).unwrap();
//! assert_eq!(module.forms.len(), 2);
//! assert!(!diagnostics.has_errors());
//! ```

pub mod ast;
mod balance;
mod desugar;
pub mod error;
mod lexer;
mod parser;
#[cfg(test)]
mod parser_tests;
mod preprocess;
mod span;
pub mod tokens;

pub use balance::check_balance;
pub use desugar::desugar;
pub use lexer::tokenize;
pub use parser::build_module;
pub use preprocess::{Preprocessed, ProvenanceMap, preprocess};
pub use span::{Span, Spanned};

use ast::Module;
use error::{Diagnostic, DiagnosticCollector};

/// Runs the whole front end over `source`.
///
/// Advisory diagnostics are recorded in `diagnostics`. Spans in the returned
/// tree and in every diagnostic refer to `source`.
///
/// # Errors
///
/// Returns the fatal [`Diagnostic`] of the first stage that could not
/// continue.
pub fn parse(source: &str, diagnostics: &mut DiagnosticCollector) -> Result<Module, Diagnostic> {
    // Step 1: Preprocess
    let preprocessed = preprocess(source);

    // Step 2: Tokenize
    let tokens = tokenize(&preprocessed)?;

    // Step 3: Balance
    check_balance(&tokens)?;

    // Step 4: Parse
    let module = build_module(&tokens)?;

    // Step 5: Desugar
    desugar(module, diagnostics)
}
