//! Engine invocation and the one-time setup check.
//!
//! Every call launches a fresh engine process through an
//! [`EngineExecutor`]; nothing is kept warm between queries, so a crashed
//! or corrupted engine cannot affect the next query. [`EngineInvoker`] owns
//! the executable name and resource locations and builds the argument list,
//! while the executor owns the process lifetime. The production executor is
//! [`ProcessExecutor`](crate::process::ProcessExecutor); tests substitute
//! executors that return canned results.

mod directive;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::classify::{InvocationContext, classify};
use crate::compile::CompiledQuery;
use crate::error::EngineError;
use crate::outcome::Outcome;

pub use self::directive::{Directive, SETUP_SENTINEL};

/// Tracing target for invocation and setup events.
const INVOKE_TARGET: &str = "lez_engine::invoke";

/// How the engine process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The process exited with a status code.
    Exited(i32),
    /// The process was terminated by a signal it did not handle.
    Signalled {
        /// Signal number, when the platform reports one.
        signal: Option<i32>,
    },
    /// The process outlived the configured timeout and was killed.
    TimedOut {
        /// Timeout that elapsed.
        after: Duration,
    },
    /// The caller raised the interrupt flag and the process was killed.
    Interrupted,
}

/// Raw output of one engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationResult {
    termination: Termination,
    stdout: String,
    stderr: String,
}

impl InvocationResult {
    /// Creates a result from its parts.
    #[must_use]
    pub fn new(
        termination: Termination,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            termination,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Creates a result for a process that exited with `code`.
    #[must_use]
    pub fn exited(code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::new(Termination::Exited(code), stdout, stderr)
    }

    /// How the process ended.
    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    /// Exit status, when the process exited normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        match self.termination {
            Termination::Exited(code) => Some(code),
            Termination::Signalled { .. } | Termination::TimedOut { .. } | Termination::Interrupted => {
                None
            }
        }
    }

    /// Captured standard output.
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Captured standard error.
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }
}

/// Program and arguments for one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineInvocation {
    program: String,
    args: Vec<String>,
}

impl EngineInvocation {
    /// Creates an invocation from a program and its arguments.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `<program> -q -t <directive>`.
    #[must_use]
    pub fn directive(program: impl Into<String>, directive: &Directive) -> Self {
        Self::new(
            program,
            vec![
                String::from("-q"),
                String::from("-t"),
                directive.as_str().to_owned(),
            ],
        )
    }

    /// `<program> --version`.
    #[must_use]
    pub fn version(program: impl Into<String>) -> Self {
        Self::new(program, vec![String::from("--version")])
    }

    /// Program to launch.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed to the program.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Trait abstracting engine process execution for testability.
pub trait EngineExecutor {
    /// Runs one engine process to completion and captures its output.
    ///
    /// Engine-reported failures are returned inside the
    /// [`InvocationResult`]; only failures to run the process are errors.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the process cannot be spawned or its
    /// streams cannot be read.
    fn run(&self, invocation: &EngineInvocation) -> Result<InvocationResult, EngineError>;
}

impl<E: EngineExecutor + ?Sized> EngineExecutor for &E {
    fn run(&self, invocation: &EngineInvocation) -> Result<InvocationResult, EngineError> {
        (**self).run(invocation)
    }
}

/// The rule base and grammar consulted on every invocation.
///
/// Relative paths are resolved against the current directory when the
/// resources are created, so directives always carry absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineResources {
    rule_base: PathBuf,
    grammar: PathBuf,
}

impl EngineResources {
    /// Creates the resource pair, resolving relative paths.
    #[must_use]
    pub fn new(rule_base: impl Into<PathBuf>, grammar: impl Into<PathBuf>) -> Self {
        Self {
            rule_base: absolute(rule_base.into()),
            grammar: absolute(grammar.into()),
        }
    }

    /// Rule base location.
    #[must_use]
    pub fn rule_base(&self) -> &Path {
        &self.rule_base
    }

    /// Grammar location.
    #[must_use]
    pub fn grammar(&self) -> &Path {
        &self.grammar
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}

/// Executable and resources used for every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    executable: String,
    resources: EngineResources,
}

impl EngineSettings {
    /// Creates settings for the given executable and resources.
    #[must_use]
    pub fn new(executable: impl Into<String>, resources: EngineResources) -> Self {
        Self {
            executable: executable.into(),
            resources,
        }
    }

    /// Engine executable.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Resources consulted on every invocation.
    #[must_use]
    pub const fn resources(&self) -> &EngineResources {
        &self.resources
    }
}

/// Launches the engine once per query and verifies the environment.
#[derive(Debug)]
pub struct EngineInvoker<E> {
    settings: EngineSettings,
    executor: E,
}

impl<E> EngineInvoker<E> {
    /// Creates an invoker with the given settings and executor.
    #[must_use]
    pub const fn new(settings: EngineSettings, executor: E) -> Self {
        Self { settings, executor }
    }

    /// Settings used for every invocation.
    #[must_use]
    pub const fn settings(&self) -> &EngineSettings {
        &self.settings
    }
}

impl<E: EngineExecutor> EngineInvoker<E> {
    /// Runs a compiled query in a fresh engine process.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the process cannot be run. Non-zero
    /// exits and engine error text are returned in the result.
    pub fn invoke(&self, query: &CompiledQuery) -> Result<InvocationResult, EngineError> {
        let directive = Directive::query(self.settings.resources(), query);
        debug!(
            target: INVOKE_TARGET,
            executable = self.settings.executable(),
            query = query.as_str(),
            "invoking inference engine"
        );
        let invocation = EngineInvocation::directive(self.settings.executable(), &directive);
        let result = self.executor.run(&invocation)?;
        debug!(
            target: INVOKE_TARGET,
            termination = ?result.termination(),
            stdout_bytes = result.stdout().len(),
            stderr_bytes = result.stderr().len(),
            "inference engine finished"
        );
        Ok(result)
    }

    /// Verifies the environment before any query runs.
    ///
    /// The checks run in order and stop at the first failure: the engine
    /// reports a version, the rule base and grammar are readable files, and
    /// a trial invocation loads both without engine error text. Failures
    /// are returned as [`Outcome::SetupError`] with an actionable message;
    /// success carries the engine's version line.
    pub fn check_setup(&self) -> Outcome {
        let resources = self.settings.resources();
        let result = self.verify_version().and_then(|version| {
            verify_resource("rule base", resources.rule_base())?;
            verify_resource("grammar", resources.grammar())?;
            self.verify_trial_load()?;
            Ok(version)
        });

        match result {
            Ok(version) => {
                info!(
                    target: INVOKE_TARGET,
                    version = %version,
                    "setup verified"
                );
                Outcome::Success(format!(
                    "{version}; rule base and grammar loaded"
                ))
            }
            Err(message) => {
                warn!(target: INVOKE_TARGET, %message, "setup check failed");
                Outcome::SetupError(message)
            }
        }
    }

    fn verify_version(&self) -> Result<String, String> {
        let executable = self.settings.executable();
        let result = self
            .executor
            .run(&EngineInvocation::version(executable))
            .map_err(|error| match error {
                EngineError::ExecutableNotFound { .. } => format!(
                    "inference engine executable '{executable}' was not found; \
                     install it or point engine_executable at it"
                ),
                other => other.to_string(),
            })?;

        if result.exit_code() != Some(0) {
            let detail = classify(&result, InvocationContext::Setup);
            return Err(format!(
                "'{executable} --version' failed: {}",
                detail.message()
            ));
        }

        let version = result
            .stdout()
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .ok_or_else(|| format!("inference engine '{executable}' did not report a version"))?;
        info!(target: INVOKE_TARGET, version, "found inference engine");
        Ok(version.to_owned())
    }

    fn verify_trial_load(&self) -> Result<(), String> {
        let directive = Directive::setup_probe(self.settings.resources());
        let invocation = EngineInvocation::directive(self.settings.executable(), &directive);
        let result = self
            .executor
            .run(&invocation)
            .map_err(|error| error.to_string())?;

        match classify(&result, InvocationContext::Setup) {
            Outcome::Success(output) if output.contains(SETUP_SENTINEL) => {
                info!(target: INVOKE_TARGET, "rule base and grammar loaded");
                Ok(())
            }
            Outcome::Success(output) if output.is_empty() => Err(String::from(
                "trial load produced no output; the engine did not confirm both files loaded",
            )),
            Outcome::Success(output) => Err(format!(
                "trial load did not confirm both files loaded; engine printed: {output}"
            )),
            Outcome::SetupError(message) | Outcome::RuntimeError(message) => Err(format!(
                "failed to load rule base and grammar: {message}"
            )),
        }
    }
}

fn verify_resource(label: &str, path: &Path) -> Result<(), String> {
    let metadata =
        fs::metadata(path).map_err(|_| format!("{label} not found at {}", path.display()))?;
    if !metadata.is_file() {
        return Err(format!("{label} at {} is not a file", path.display()));
    }
    File::open(path)
        .map_err(|error| format!("{label} at {} is not readable: {error}", path.display()))?;
    info!(
        target: INVOKE_TARGET,
        resource = label,
        path = %path.display(),
        "found resource"
    );
    Ok(())
}
