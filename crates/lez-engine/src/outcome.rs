//! The only value handed back across the core boundary.

use std::fmt;

use serde::Serialize;

/// Discriminant of an [`Outcome`], useful for logging and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The engine answered the query.
    Success,
    /// The environment is not ready to answer queries.
    SetupError,
    /// A single query failed; later queries may still succeed.
    RuntimeError,
}

/// Classified result of a setup check or a query.
///
/// Every variant carries human-readable text. Error messages are never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum Outcome {
    /// Trimmed engine output for a successful invocation.
    Success(String),
    /// The environment is not ready; fatal for the session.
    SetupError(String),
    /// One query failed; the session remains usable.
    RuntimeError(String),
}

impl Outcome {
    /// Returns the variant discriminant.
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Success(_) => OutcomeKind::Success,
            Self::SetupError(_) => OutcomeKind::SetupError,
            Self::RuntimeError(_) => OutcomeKind::RuntimeError,
        }
    }

    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Payload or error message carried by the outcome.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success(text) | Self::SetupError(text) | Self::RuntimeError(text) => text,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => formatter.write_str(text),
            Self::SetupError(text) => write!(formatter, "setup error: {text}"),
            Self::RuntimeError(text) => write!(formatter, "error: {text}"),
        }
    }
}
