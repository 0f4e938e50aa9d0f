//! Printing of intermediate pipeline state for `--dump`.

use std::io::{self, Write};

use log::debug;

use lc::Compilation;

use crate::args::DumpPhase;

/// Phases in pipeline order.
const PHASES: [DumpPhase; 5] = [
    DumpPhase::Preproc,
    DumpPhase::Tokens,
    DumpPhase::Ast,
    DumpPhase::Desugared,
    DumpPhase::Ir,
];

/// Writes every requested phase that ran to `out`, in pipeline order.
///
/// Phases the run never reached are skipped.
pub fn write_dumps(
    out: &mut impl Write,
    requested: &[DumpPhase],
    compilation: &Compilation,
) -> io::Result<()> {
    let all = requested.contains(&DumpPhase::All);
    for phase in PHASES {
        if !all && !requested.contains(&phase) {
            continue;
        }
        if !write_phase(out, phase, compilation)? {
            debug!(phase:?; "Phase did not run, nothing to dump");
        }
    }
    Ok(())
}

fn write_phase(out: &mut impl Write, phase: DumpPhase, compilation: &Compilation) -> io::Result<bool> {
    match phase {
        DumpPhase::Preproc => {
            let Some(preprocessed) = compilation.preprocessed() else {
                return Ok(false);
            };
            writeln!(out, ";; preproc")?;
            writeln!(out, "{}", preprocessed.text())?;
        }
        DumpPhase::Tokens => {
            let Some(tokens) = compilation.tokens() else {
                return Ok(false);
            };
            writeln!(out, ";; tokens")?;
            for token in tokens {
                writeln!(out, "{token}")?;
            }
        }
        DumpPhase::Ast => {
            let Some(module) = compilation.parsed() else {
                return Ok(false);
            };
            writeln!(out, ";; ast")?;
            write!(out, "{module}")?;
        }
        DumpPhase::Desugared => {
            let Some(module) = compilation.desugared() else {
                return Ok(false);
            };
            writeln!(out, ";; desugared")?;
            write!(out, "{module}")?;
        }
        DumpPhase::Ir => {
            let Some(target) = compilation.target() else {
                return Ok(false);
            };
            writeln!(out, ";; ir")?;
            write!(out, "{target}")?;
        }
        DumpPhase::All => return Ok(false),
    }
    Ok(true)
}
