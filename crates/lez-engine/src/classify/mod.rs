//! Classification of raw engine output into an [`Outcome`].
//!
//! Classification is pure: it looks only at the [`InvocationResult`] and
//! the context the invocation ran in, and performs no I/O.

use crate::invoke::{InvocationResult, Termination};
use crate::outcome::Outcome;

/// Marker the engine prefixes to error reports, colon included so that
/// words such as "ERRORS" are not mistaken for one.
pub const ERROR_MARKER: &str = "ERROR:";

/// Why the engine was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationContext {
    /// The startup trial load.
    Setup,
    /// A user query.
    Query,
}

/// Classifies an invocation result.
///
/// - No exit code (signal, timeout, interrupt): [`Outcome::RuntimeError`].
/// - Non-zero exit: the trimmed stderr, or a message naming the status when
///   stderr is blank. [`Outcome::SetupError`] in setup context,
///   [`Outcome::RuntimeError`] otherwise.
/// - Zero exit: the trimmed stdout as [`Outcome::Success`], unless it
///   begins with [`ERROR_MARKER`], which is a runtime error. In setup context
///   the marker anywhere in either stream is a setup error.
///
/// # Example
///
/// ```
/// use lez_engine::{InvocationContext, InvocationResult, Outcome, classify};
///
/// let result = InvocationResult::exited(2, "", "");
/// assert_eq!(
///     classify(&result, InvocationContext::Query),
///     Outcome::RuntimeError(String::from("engine exited with status 2")),
/// );
/// ```
#[must_use]
pub fn classify(result: &InvocationResult, context: InvocationContext) -> Outcome {
    let Some(code) = result.exit_code() else {
        return Outcome::RuntimeError(describe_abnormal_exit(result.termination()));
    };

    if code != 0 {
        let stderr = result.stderr().trim();
        let message = if stderr.is_empty() {
            format!("engine exited with status {code}")
        } else {
            stderr.to_owned()
        };
        return failure(context, message);
    }

    let payload = result.stdout().trim();
    match context {
        InvocationContext::Query if payload.starts_with(ERROR_MARKER) => {
            Outcome::RuntimeError(payload.to_owned())
        }
        InvocationContext::Setup if mentions_error(result) => {
            Outcome::SetupError(first_error_report(result))
        }
        InvocationContext::Query | InvocationContext::Setup => {
            Outcome::Success(payload.to_owned())
        }
    }
}

fn failure(context: InvocationContext, message: String) -> Outcome {
    match context {
        InvocationContext::Setup => Outcome::SetupError(message),
        InvocationContext::Query => Outcome::RuntimeError(message),
    }
}

fn describe_abnormal_exit(termination: Termination) -> String {
    match termination {
        Termination::Signalled { signal: Some(signal) } => {
            format!("engine was terminated by signal {signal}")
        }
        Termination::Signalled { signal: None } => {
            String::from("engine was terminated without an exit status")
        }
        Termination::TimedOut { after } => {
            format!("engine did not finish within {after:?} and was stopped")
        }
        Termination::Interrupted => String::from("query was interrupted"),
        Termination::Exited(code) => format!("engine exited with status {code}"),
    }
}

fn mentions_error(result: &InvocationResult) -> bool {
    result.stdout().contains(ERROR_MARKER) || result.stderr().contains(ERROR_MARKER)
}

/// Prefers the stream carrying the marker, stderr first.
fn first_error_report(result: &InvocationResult) -> String {
    [result.stderr(), result.stdout()]
        .into_iter()
        .map(str::trim)
        .find(|text| text.contains(ERROR_MARKER))
        .map_or_else(
            || String::from("engine reported an error while loading"),
            str::to_owned,
        )
}
