//! CLI entrypoint for the low-emission zone access checker.
//!
//! The binary delegates to [`lez_cli::run`], which loads configuration,
//! parses the command line, verifies the inference engine setup and then
//! answers a single question or runs an interactive session.

use std::io::{self, StderrLock, StdinLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let stdin: StdinLock<'_> = io::stdin().lock();
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    lez_cli::run(std::env::args_os(), stdin, &mut stdout, &mut stderr)
}
