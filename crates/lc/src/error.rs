//! Error types for lc operations.

use std::io;

use thiserror::Error;

use lc_core::eval::EvalError;
use lc_parser::error::CompileError;

/// The main error type for lc operations.
///
/// The `Compile` variant keeps the source text next to the diagnostics so
/// they can be rendered with source excerpts.
#[derive(Debug, Error)]
pub enum LcError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{err}")]
    Compile { err: CompileError, src: String },

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("no target module was produced")]
    NoTarget,
}

impl LcError {
    /// Create a new `Compile` error with the associated source code.
    pub fn new_compile_error(err: CompileError, src: impl Into<String>) -> Self {
        Self::Compile {
            err,
            src: src.into(),
        }
    }
}
