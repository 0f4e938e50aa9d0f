//! Command-line argument definitions for the lc CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, logging verbosity, phase dumps and how far the pipeline runs.

use clap::{Parser, ValueEnum};

/// Command-line arguments for the lc compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input source file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output listing; standard output when omitted
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Print the state after a phase; may be repeated
    #[arg(long, value_enum, value_name = "PHASE")]
    pub dump: Vec<DumpPhase>,

    /// Stop after desugaring
    #[arg(long)]
    pub syntax_only: bool,

    /// Show advisory diagnostics
    #[arg(long)]
    pub info: bool,

    /// Interpret the compiled module and print its result
    #[arg(long)]
    pub run: bool,
}

/// A pipeline phase whose output can be dumped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum DumpPhase {
    /// The normalized character stream
    Preproc,
    /// One token per line with its original offset
    Tokens,
    /// The tree as parsed
    Ast,
    /// The tree after desugaring
    Desugared,
    /// The listing of the target module
    Ir,
    /// Every phase above
    All,
}

impl Args {
    /// Returns `true` if `phase` was requested, directly or through `all`.
    pub fn dumps(&self, phase: DumpPhase) -> bool {
        self.dump
            .iter()
            .any(|requested| *requested == phase || *requested == DumpPhase::All)
    }
}
