//! Pipeline phases that diagnostics are attributed to.

use std::fmt;

/// The pipeline stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Preprocess,
    Tokenize,
    Balance,
    Parse,
    Desugar,
    Lower,
}

impl Phase {
    /// Short name used when printing diagnostics and selecting dumps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Preprocess => "preproc",
            Phase::Tokenize => "tok",
            Phase::Balance => "balance",
            Phase::Parse => "parse",
            Phase::Desugar => "desugar",
            Phase::Lower => "lower",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
