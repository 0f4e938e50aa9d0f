//! lc CLI entry point.

use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use lc::LcError;
use lc_cli::{
    Args,
    error_adapter::{diagnostics_to_reportables, to_reportables},
};

fn render(reportable: &dyn miette::Diagnostic) -> String {
    let reporter = miette::GraphicalReportHandler::new();
    let mut writer = String::new();
    reporter
        .render_report(&mut writer, reportable)
        .expect("Writing to String buffer is infallible");
    writer
}

fn main() {
    // Install miette's pretty panic hook early for better panic reports
    miette::set_panic_hook();

    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting lc");
    debug!(args:?; "Parsed arguments");

    match lc_cli::run(&args) {
        Ok(outcome) => {
            for reportable in diagnostics_to_reportables(outcome.notes(), outcome.source()) {
                info!("{}", render(reportable.as_ref()));
            }
            info!(status = outcome.status(); "Completed successfully");
            process::exit(outcome.status());
        }
        Err(err) => {
            for reportable in to_reportables(&err) {
                error!("{}", render(reportable.as_ref()));
            }
            match &err {
                LcError::Compile { err, .. } => {
                    error!("aborting due to {} previous error(s)", err.error_count());
                }
                _ => error!("lc failed"),
            }
            process::exit(1);
        }
    }
}
