//! lc - a compiler for a small parenthesized language.
//!
//! Source text goes through the front end in [`lc_parser`] (preprocessing,
//! tokenizing, balance checking, parsing, desugaring) and is then lowered by
//! the [`codegen`] module into an [`lc_core::ir::TargetModule`], which can be
//! listed as text or run by the reference interpreter.

pub mod codegen;
pub mod config;

mod error;

pub use lc_core::{eval, identifier, ir};
pub use lc_parser::{ast, error as diagnostics, tokens};

pub use error::LcError;

use log::{debug, info, trace};

use lc_core::{eval::Interpreter, ir::TargetModule};
use lc_parser::{
    Preprocessed,
    ast::Module,
    error::{CompileError, Diagnostic, DiagnosticCollector},
    tokens::PositionedToken,
};

use config::AppConfig;

/// Options for a single [`Compiler::compile`] run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Stop after desugaring; no target module is produced.
    pub syntax_only: bool,
    /// Keep the output of every stage for inspection.
    pub keep_stages: bool,
}

/// Everything a compilation run produced.
///
/// Stages that did not run, or whose output was not kept, are `None`. The
/// diagnostics are in recorded order and include the fatal one that stopped
/// the run, if any.
#[derive(Debug, Default)]
pub struct Compilation {
    preprocessed: Option<Preprocessed>,
    tokens: Option<Vec<PositionedToken>>,
    parsed: Option<Module>,
    desugared: Option<Module>,
    target: Option<TargetModule>,
    diagnostics: DiagnosticCollector,
}

impl Compilation {
    pub fn preprocessed(&self) -> Option<&Preprocessed> {
        self.preprocessed.as_ref()
    }

    pub fn tokens(&self) -> Option<&[PositionedToken]> {
        self.tokens.as_deref()
    }

    /// The tree as parsed, before desugaring.
    pub fn parsed(&self) -> Option<&Module> {
        self.parsed.as_ref()
    }

    pub fn desugared(&self) -> Option<&Module> {
        self.desugared.as_ref()
    }

    /// The generated module, best effort when [`Compilation::failed`].
    pub fn target(&self) -> Option<&TargetModule> {
        self.target.as_ref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.diagnostics.diagnostics()
    }

    /// Returns `true` if any error, fatal or internal error was recorded.
    pub fn failed(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Records a diagnostic raised after compilation, such as an output
    /// failure.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.emit(diagnostic);
    }

    /// Turns the run into its target module.
    ///
    /// # Errors
    ///
    /// Returns [`LcError::Compile`] with every recorded diagnostic if the run
    /// failed, or [`LcError::NoTarget`] if code generation did not run.
    pub fn into_target(self, src: &str) -> Result<TargetModule, LcError> {
        let Compilation {
            target,
            diagnostics,
            ..
        } = self;
        diagnostics
            .finish()
            .map_err(|err: CompileError| LcError::new_compile_error(err, src))?;
        target.ok_or(LcError::NoTarget)
    }
}

/// Driver for the compilation pipeline.
///
/// # Examples
///
/// ```
/// use lc::{Compiler, config::AppConfig};
///
/// let compiler = Compiler::new(AppConfig::default());
/// let module = compiler
///     .build("(defun (f a b) (sum a b))\n(f 4 5)")
///     .expect("program should compile");
/// let result = compiler.evaluate(&module).expect("program should run");
/// assert_eq!(result, 9.0);
/// ```
#[derive(Debug, Default)]
pub struct Compiler {
    config: AppConfig,
}

impl Compiler {
    /// Create a new compiler with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the pipeline over `source` until it finishes or a stage fails
    /// fatally.
    ///
    /// This never fails by itself; problems are reported through
    /// [`Compilation::diagnostics`].
    pub fn compile(&self, source: &str, options: CompileOptions) -> Compilation {
        info!(bytes = source.len(), syntax_only = options.syntax_only; "Compiling");
        let mut compilation = Compilation::default();
        if let Err(fatal) = self.run_stages(source, options, &mut compilation) {
            debug!(severity:% = fatal.severity(); "Pipeline stopped");
            compilation.diagnostics.emit(fatal);
        }
        info!(
            diagnostics = compilation.diagnostics().len(),
            failed = compilation.failed();
            "Compilation finished"
        );
        compilation
    }

    fn run_stages(
        &self,
        source: &str,
        options: CompileOptions,
        compilation: &mut Compilation,
    ) -> Result<(), Diagnostic> {
        let preprocessed = lc_parser::preprocess(source);
        let tokens = lc_parser::tokenize(&preprocessed);
        if options.keep_stages {
            compilation.preprocessed = Some(preprocessed);
        }
        let tokens = tokens?;

        lc_parser::check_balance(&tokens)?;
        let parsed = lc_parser::build_module(&tokens);
        if options.keep_stages {
            compilation.tokens = Some(tokens);
        }
        let parsed = parsed?;

        if options.keep_stages {
            compilation.parsed = Some(parsed.clone());
        }
        let desugared = lc_parser::desugar(parsed, &mut compilation.diagnostics)?;
        trace!(module:% = desugared; "Desugared module");

        if options.syntax_only {
            compilation.desugared = Some(desugared);
            return Ok(());
        }

        let target = codegen::generate(
            &desugared,
            self.config.codegen(),
            &mut compilation.diagnostics,
        );
        compilation.desugared = Some(desugared);
        compilation.target = Some(target?);
        Ok(())
    }

    /// Compiles `source` into a target module.
    ///
    /// # Errors
    ///
    /// Returns [`LcError::Compile`] if any error was recorded.
    pub fn build(&self, source: &str) -> Result<TargetModule, LcError> {
        self.compile(source, CompileOptions::default())
            .into_target(source)
    }

    /// Runs the entry function of `module` with the reference interpreter.
    ///
    /// # Errors
    ///
    /// Returns [`LcError::Eval`] if execution fails.
    pub fn evaluate(&self, module: &TargetModule) -> Result<f64, LcError> {
        let result = Interpreter::with_config(module, *self.config.eval()).run_entry()?;
        info!(result; "Evaluated entry function");
        Ok(result)
    }
}
