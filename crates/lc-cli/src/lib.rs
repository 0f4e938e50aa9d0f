//! CLI logic for the lc compiler.
//!
//! [`run`] drives one invocation: it loads the configuration, compiles the
//! input file, prints the requested phase dumps, emits the listing of the
//! target module and optionally interprets it.

pub mod error_adapter;

mod args;
mod config;
mod dump;

pub use args::{Args, DumpPhase};

use std::{
    fs,
    io::{self, Write},
};

use log::{info, warn};

use lc::{
    CompileOptions, Compilation, Compiler, LcError,
    diagnostics::{CompileError, Diagnostic, ErrorCode},
};

/// The result of a successful invocation.
#[derive(Debug)]
pub struct Outcome {
    source: String,
    notes: Vec<Diagnostic>,
    status: i32,
}

impl Outcome {
    /// The compiled source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Advisory diagnostics to show, in recorded order.
    pub fn notes(&self) -> &[Diagnostic] {
        &self.notes
    }

    /// Process exit status.
    ///
    /// Zero, unless `--run` was given: the interpreted result truncated to an
    /// 8-bit signed integer.
    pub fn status(&self) -> i32 {
        self.status
    }
}

/// Run the lc CLI application
///
/// # Errors
///
/// Returns `LcError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Compilation failures, carrying every diagnostic to show
/// - Evaluation errors with `--run`
pub fn run(args: &Args) -> Result<Outcome, LcError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Compiling file"
    );

    let mut app_config = config::load_config(args.config.as_ref(), &args.input)?;
    if args.info {
        app_config = app_config.with_show_info(true);
    }
    let show_info = app_config.diagnostics().show_info();

    let source = fs::read_to_string(&args.input)?;

    let compiler = Compiler::new(app_config);
    let options = CompileOptions {
        syntax_only: args.syntax_only,
        keep_stages: !args.dump.is_empty(),
    };
    let mut compilation = compiler.compile(&source, options);

    dump::write_dumps(&mut io::stdout().lock(), &args.dump, &compilation)?;

    let listing = compilation
        .target()
        .filter(|_| !compilation.failed())
        .map(ToString::to_string);
    if let Some(listing) = listing {
        write_listing(args, &listing, &mut compilation);
    }

    let shown: Vec<Diagnostic> = compilation
        .diagnostics()
        .iter()
        .filter(|diag| show_info || !diag.severity().is_info())
        .cloned()
        .collect();

    if compilation.failed() {
        let err = CompileError::new(shown);
        warn!(errors = err.error_count(); "Compilation failed");
        return Err(LcError::new_compile_error(err, source));
    }

    let mut status = 0;
    if args.run {
        match compilation.target() {
            Some(target) => {
                let result = compiler.evaluate(target)?;
                println!("{result}");
                status = exit_status(result);
            }
            None => warn!("Nothing to run without a target module"),
        }
    }

    Ok(Outcome {
        source,
        notes: shown,
        status,
    })
}

/// Truncates `result` to an 8-bit signed integer, wrapping like an integer
/// conversion rather than saturating.
fn exit_status(result: f64) -> i32 {
    i32::from((result as i64) as i8)
}

/// Writes the listing to `--output`, or to stdout unless `--run` replaces it.
///
/// A write failure is recorded as a fatal diagnostic.
fn write_listing(args: &Args, listing: &str, compilation: &mut Compilation) {
    match &args.output {
        Some(path) => match fs::write(path, listing) {
            Ok(()) => info!(output_file = path; "Listing written"),
            Err(err) => compilation.record(
                Diagnostic::fatal(format!("could not write output file '{path}': {err}"))
                    .with_code(ErrorCode::E309),
            ),
        },
        None if args.run => {}
        None => {
            let mut stdout = io::stdout().lock();
            if let Err(err) = stdout.write_all(listing.as_bytes()) {
                compilation.record(
                    Diagnostic::fatal(format!("could not write listing: {err}"))
                        .with_code(ErrorCode::E309),
                );
            }
        }
    }
}
