//! Configuration types for the lc compiler.
//!
//! All types implement [`serde::Deserialize`] so the CLI can load them from a
//! TOML file; every field has a default.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining all sections.
//! - [`CodegenConfig`] - Names used in the generated module.
//! - [`EvalConfig`] - Limits of the reference interpreter.
//! - [`DiagnosticsConfig`] - Which diagnostics are shown.
//!
//! # Example
//!
//! ```
//! # use lc::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.codegen().module_name(), "lisp compiler");
//! assert_eq!(config.codegen().entry_name(), "main");
//! assert_eq!(config.eval().max_call_depth(), 256);
//! assert!(!config.diagnostics().show_info());
//! ```

use serde::Deserialize;

pub use lc_core::eval::EvalConfig;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Code generation section.
    #[serde(default)]
    codegen: CodegenConfig,

    /// Interpreter section.
    #[serde(default)]
    eval: EvalConfig,

    /// Diagnostics section.
    #[serde(default)]
    diagnostics: DiagnosticsConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(codegen: CodegenConfig, eval: EvalConfig, diagnostics: DiagnosticsConfig) -> Self {
        Self {
            codegen,
            eval,
            diagnostics,
        }
    }

    pub fn codegen(&self) -> &CodegenConfig {
        &self.codegen
    }

    pub fn eval(&self) -> &EvalConfig {
        &self.eval
    }

    pub fn diagnostics(&self) -> &DiagnosticsConfig {
        &self.diagnostics
    }

    /// Returns a copy with advisory diagnostics switched on or off.
    pub fn with_show_info(mut self, show_info: bool) -> Self {
        self.diagnostics.show_info = show_info;
        self
    }
}

/// Names used in the generated target module.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodegenConfig {
    /// Name of the generated module.
    #[serde(default = "default_module_name")]
    module_name: String,

    /// Name of the synthetic entry function.
    #[serde(default = "default_entry_name")]
    entry_name: String,
}

fn default_module_name() -> String {
    "lisp compiler".to_owned()
}

fn default_entry_name() -> String {
    "main".to_owned()
}

impl CodegenConfig {
    pub fn new(module_name: impl Into<String>, entry_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            entry_name: entry_name.into(),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }
}

impl Default for CodegenConfig {
    fn default() -> Self {
        Self::new(default_module_name(), default_entry_name())
    }
}

/// Diagnostic visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DiagnosticsConfig {
    /// Show advisory (`info`) diagnostics.
    #[serde(default)]
    show_info: bool,
}

impl DiagnosticsConfig {
    pub fn new(show_info: bool) -> Self {
        Self { show_info }
    }

    pub fn show_info(&self) -> bool {
        self.show_info
    }
}
