//! Interactive question-and-answer session.
//!
//! The session verifies the engine setup once, then reads one question per
//! line until `exit`, end of input or an interrupt. Each question gets its
//! own engine invocation; a failed question is reported and the session
//! carries on.

use std::io::{BufRead, Write};
use std::process::ExitCode;

use lez_engine::{EngineExecutor, Outcome, QueryPipeline, normalize};
use tracing::info;

use crate::signals::Interrupts;
use crate::{AppError, IoStreams};

const CONSOLE_TARGET: &str = "lez_cli::console";

pub(crate) const BANNER: &str = "LEZ Access Checker\n\
Ask whether a vehicle may enter a low-emission zone.\n\
Example: can my 2010 low income diesel van from e15 enter sw1a";
pub(crate) const PROMPT: &str = "Your query (or type 'exit'): ";
pub(crate) const SETUP_HINT: &str =
    "Check that the inference engine is installed and that the rule base and grammar paths are correct.";
pub(crate) const EMPTY_QUERY_NOTICE: &str = "Please enter a valid query";
pub(crate) const FAREWELL: &str = "Goodbye!";
const EXIT_COMMAND: &str = "exit";

/// Runs the session over `input`, returning the process exit status.
pub(crate) fn run_session<X, R, W, E>(
    pipeline: &QueryPipeline<X>,
    mut input: R,
    io: &mut IoStreams<'_, W, E>,
    interrupts: &Interrupts,
) -> Result<ExitCode, AppError>
where
    X: EngineExecutor,
    R: BufRead,
    W: Write,
    E: Write,
{
    writeln!(io.stdout, "{BANNER}\n").map_err(AppError::WriteOutput)?;

    let setup = interrupts.while_busy(|| pipeline.check_setup());
    match &setup {
        Outcome::Success(summary) => {
            writeln!(io.stdout, "Engine ready: {summary}\n").map_err(AppError::WriteOutput)?;
        }
        failure => {
            writeln!(io.stderr, "Setup error: {}", failure.message())
                .map_err(AppError::WriteOutput)?;
            writeln!(io.stderr, "{SETUP_HINT}").map_err(AppError::WriteOutput)?;
            return Ok(ExitCode::FAILURE);
        }
    }

    interrupts.enter_session();
    let mut line = String::new();
    loop {
        if interrupts.is_raised() {
            break;
        }
        write!(io.stdout, "{PROMPT}").map_err(AppError::WriteOutput)?;
        io.stdout.flush().map_err(AppError::WriteOutput)?;

        line.clear();
        if input.read_line(&mut line).map_err(AppError::ReadInput)? == 0 {
            writeln!(io.stdout).map_err(AppError::WriteOutput)?;
            break;
        }

        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case(EXIT_COMMAND) {
            break;
        }
        if normalize(question).is_empty() {
            writeln!(io.stdout, "{EMPTY_QUERY_NOTICE}").map_err(AppError::WriteOutput)?;
            continue;
        }

        let outcome = interrupts.while_busy(|| pipeline.ask(question));
        if interrupts.is_raised() {
            info!(target: CONSOLE_TARGET, "session interrupted");
            writeln!(io.stdout).map_err(AppError::WriteOutput)?;
            break;
        }
        report(&outcome, io)?;
    }

    writeln!(io.stdout, "{FAREWELL}").map_err(AppError::WriteOutput)?;
    Ok(ExitCode::SUCCESS)
}

fn report<W, E>(outcome: &Outcome, io: &mut IoStreams<'_, W, E>) -> Result<(), AppError>
where
    W: Write,
    E: Write,
{
    match outcome {
        Outcome::Success(answer) => {
            writeln!(io.stdout, "{answer}\n").map_err(AppError::WriteOutput)
        }
        other => writeln!(io.stderr, "Warning: {}\n", other.message())
            .map_err(AppError::WriteOutput),
    }
}
