//! The caller-facing query surface.
//!
//! [`QueryPipeline`] ties the stages together: raw text is normalised,
//! compiled, run in a fresh engine process and classified. Callers run
//! [`QueryPipeline::check_setup`] once before the first query and treat a
//! [`Outcome::SetupError`] as fatal for the session. After that,
//! [`QueryPipeline::ask`] may be called any number of times; a
//! [`Outcome::RuntimeError`] affects only the query that produced it.

use tracing::{debug, info};

use crate::classify::{InvocationContext, classify};
use crate::compile::{CompileError, QueryCompiler};
use crate::invoke::{EngineExecutor, EngineInvoker};
use crate::normalize::normalize;
use crate::outcome::Outcome;

/// Tracing target for pipeline events.
const PIPELINE_TARGET: &str = "lez_engine::pipeline";

/// Message returned when normalisation leaves nothing to ask.
pub const NO_USABLE_QUERY: &str = "no usable query: the input contained no words";

/// Normalise, compile, invoke and classify, one query at a time.
///
/// # Example
///
/// ```
/// use lez_engine::{
///     EngineError, EngineExecutor, EngineInvocation, EngineInvoker, EngineResources,
///     EngineSettings, InvocationResult, Outcome, QueryCompiler, QueryPipeline,
/// };
///
/// struct Answering;
///
/// impl EngineExecutor for Answering {
///     fn run(&self, _invocation: &EngineInvocation) -> Result<InvocationResult, EngineError> {
///         Ok(InvocationResult::exited(0, "You may enter.\n", ""))
///     }
/// }
///
/// let settings = EngineSettings::new("swipl", EngineResources::new("kb.pl", "dcg.pl"));
/// let pipeline = QueryPipeline::new(
///     QueryCompiler::new("process_tokens").expect("valid predicate"),
///     EngineInvoker::new(settings, Answering),
/// );
/// assert_eq!(
///     pipeline.ask("Can my van enter SW1A?"),
///     Outcome::Success(String::from("You may enter.")),
/// );
/// ```
#[derive(Debug)]
pub struct QueryPipeline<E> {
    compiler: QueryCompiler,
    invoker: EngineInvoker<E>,
}

impl<E> QueryPipeline<E> {
    /// Creates a pipeline from a compiler and an invoker.
    #[must_use]
    pub const fn new(compiler: QueryCompiler, invoker: EngineInvoker<E>) -> Self {
        Self { compiler, invoker }
    }

    /// The query compiler.
    #[must_use]
    pub const fn compiler(&self) -> &QueryCompiler {
        &self.compiler
    }

    /// The engine invoker.
    #[must_use]
    pub const fn invoker(&self) -> &EngineInvoker<E> {
        &self.invoker
    }
}

impl<E: EngineExecutor> QueryPipeline<E> {
    /// Verifies the environment; see [`EngineInvoker::check_setup`].
    pub fn check_setup(&self) -> Outcome {
        self.invoker.check_setup()
    }

    /// Answers one free-text question.
    ///
    /// Input that normalises to no tokens is reported as a
    /// [`Outcome::RuntimeError`] without starting the engine. A failure to
    /// start the engine is also a runtime error at this point, because the
    /// setup check has already passed.
    pub fn ask(&self, raw: &str) -> Outcome {
        let tokens = normalize(raw);
        debug!(
            target: PIPELINE_TARGET,
            tokens = ?tokens.to_strings(),
            "normalised input"
        );

        let query = match self.compiler.compile(&tokens) {
            Ok(query) => query,
            Err(CompileError::EmptyTokens) => {
                return Outcome::RuntimeError(NO_USABLE_QUERY.to_owned());
            }
            Err(error) => return Outcome::RuntimeError(error.to_string()),
        };

        let outcome = match self.invoker.invoke(&query) {
            Ok(result) => classify(&result, InvocationContext::Query),
            Err(error) => Outcome::RuntimeError(error.to_string()),
        };
        info!(
            target: PIPELINE_TARGET,
            kind = ?outcome.kind(),
            token_count = tokens.len(),
            "query classified"
        );
        outcome
    }
}
