//! Rendering of engine outcomes for the terminal or for scripts.

use std::io::Write;
use std::process::ExitCode;

use clap::ValueEnum;
use lez_engine::Outcome;

use crate::{AppError, IoStreams};

/// How outcomes are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Successful answers on stdout, errors on stderr, as plain text.
    #[default]
    Human,
    /// One JSON object per outcome on stdout.
    Json,
}

/// Writes `outcome` in the requested format.
pub(crate) fn write_outcome<W, E>(
    outcome: &Outcome,
    format: OutputFormat,
    io: &mut IoStreams<'_, W, E>,
) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    match format {
        OutputFormat::Human if outcome.is_success() => {
            writeln!(io.stdout, "{outcome}").map_err(AppError::WriteOutput)?;
            io.stdout.flush().map_err(AppError::WriteOutput)
        }
        OutputFormat::Human => {
            writeln!(io.stderr, "{outcome}").map_err(AppError::WriteOutput)?;
            io.stderr.flush().map_err(AppError::WriteOutput)
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut *io.stdout, outcome).map_err(AppError::SerialiseOutcome)?;
            io.stdout.write_all(b"\n").map_err(AppError::WriteOutput)?;
            io.stdout.flush().map_err(AppError::WriteOutput)
        }
    }
}

/// Process exit status for a final outcome.
pub(crate) fn exit_code_for(outcome: &Outcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
