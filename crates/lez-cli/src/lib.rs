//! Command-line runtime for the low-emission zone access checker.
//!
//! The runtime owns argument parsing, configuration bootstrapping, logging
//! setup and the choice between the three modes of the `lez` binary: a setup
//! check (`--check`), a single question given on the command line, and an
//! interactive session reading questions from stdin. Configuration loading,
//! the engine executor and the IO streams can all be substituted in tests.

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use lez_config::Config;
use lez_engine::{
    EngineExecutor, EngineInvoker, EngineResources, EngineSettings, ProcessExecutor,
    QueryCompiler, QueryPipeline,
};
use tracing::debug;

mod config;
mod console;
mod errors;
mod render;
mod signals;
mod telemetry;

use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
pub use render::OutputFormat;
use render::{exit_code_for, write_outcome};
use signals::Interrupts;

const CLI_TARGET: &str = "lez_cli";

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the fields of
/// `lez_config::Config`.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--engine-executable",
    "--rule-base-path",
    "--grammar-path",
    "--entry-predicate",
    "--query-timeout-secs",
    "--log-filter",
    "--log-format",
];

/// Bundles the output streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) const fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "lez",
    version,
    about = "Check whether a vehicle may enter a low-emission zone",
    long_about = "Check whether a vehicle may enter a low-emission zone.\n\n\
        Configuration flags (--rule-base-path, --engine-executable, ...) must \
        come before any other argument. Without a question, an interactive \
        session reads one question per line from stdin."
)]
pub(crate) struct Cli {
    /// Verify the inference engine, rule base and grammar, then exit.
    #[arg(long)]
    pub(crate) check: bool,
    /// Output format for the setup check and one-shot answers.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) format: OutputFormat,
    /// Question to answer, e.g. `can my 2010 diesel van from e15 enter sw1a`.
    #[arg(trailing_var_arg = true)]
    pub(crate) query: Vec<String>,
}

impl Cli {
    fn question(&self) -> Option<String> {
        (!self.query.is_empty()).then(|| self.query.join(" "))
    }
}

struct CliRunner<'a, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
}

impl<'a, W, E, L> CliRunner<'a, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    const fn new(io: &'a mut IoStreams<'a, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I, R>(&mut self, args: I, input: R) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
        R: BufRead,
    {
        let result = self.parse(args).and_then(|(cli, config)| {
            telemetry::initialise(&config)?;
            let interrupts = Interrupts::install()?;
            let pipeline = build_pipeline(&config, &interrupts)?;
            execute(&cli, &pipeline, input, self.io, &interrupts)
        });
        self.finish(result)
    }

    fn parse<I>(&self, args: I) -> Result<(Cli, Config), AppError>
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let cli = Cli::try_parse_from(cli_arguments).map_err(AppError::CliUsage)?;
        let config = self.loader.load(&split.config_arguments)?;
        Ok((cli, config))
    }

    fn finish(&mut self, result: Result<ExitCode, AppError>) -> ExitCode {
        match result {
            Ok(exit_code) => exit_code,
            Err(error) if error.is_informational() => {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, R, W, E>(args: I, input: R, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, input, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<'a, I, R, W, E, L>(
    args: I,
    input: R,
    io: &'a mut IoStreams<'a, W, E>,
    loader: &'a L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    R: BufRead,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args, input)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if split.command_start < args.len() {
        cli_arguments.extend(args[split.command_start..].iter().cloned());
    }
    cli_arguments
}

fn build_pipeline(
    config: &Config,
    interrupts: &Interrupts,
) -> Result<QueryPipeline<ProcessExecutor>, AppError> {
    let compiler = QueryCompiler::new(config.entry_predicate()).map_err(AppError::EntryPredicate)?;
    let resources = EngineResources::new(
        config.rule_base_path().as_std_path(),
        config.grammar_path().as_std_path(),
    );
    let settings = EngineSettings::new(config.engine_executable(), resources);
    let executor = ProcessExecutor::new()
        .with_timeout(config.query_timeout())
        .with_interrupt(interrupts.flag());
    debug!(
        target: CLI_TARGET,
        engine = settings.executable(),
        rule_base = %settings.resources().rule_base().display(),
        grammar = %settings.resources().grammar().display(),
        "configured engine pipeline"
    );
    Ok(QueryPipeline::new(
        compiler,
        EngineInvoker::new(settings, executor),
    ))
}

pub(crate) fn execute<X, R, W, E>(
    cli: &Cli,
    pipeline: &QueryPipeline<X>,
    input: R,
    io: &mut IoStreams<'_, W, E>,
    interrupts: &Interrupts,
) -> Result<ExitCode, AppError>
where
    X: EngineExecutor,
    R: BufRead,
    W: Write,
    E: Write,
{
    if cli.check {
        let outcome = interrupts.while_busy(|| pipeline.check_setup());
        write_outcome(&outcome, cli.format, io)?;
        return Ok(exit_code_for(&outcome));
    }

    let Some(question) = cli.question() else {
        return console::run_session(pipeline, input, io, interrupts);
    };

    let setup = interrupts.while_busy(|| pipeline.check_setup());
    if !setup.is_success() {
        write_outcome(&setup, cli.format, io)?;
        return Ok(ExitCode::FAILURE);
    }
    let outcome = interrupts.while_busy(|| pipeline.ask(&question));
    write_outcome(&outcome, cli.format, io)?;
    Ok(exit_code_for(&outcome))
}
