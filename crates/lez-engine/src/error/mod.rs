//! Process-level errors raised while invoking the inference engine.
//!
//! Engine-reported failures (non-zero exits, error text) are not errors at
//! this level; they travel inside an
//! [`InvocationResult`](crate::invoke::InvocationResult) and are classified
//! later. Only failures to run the process at all are represented here. I/O
//! errors are wrapped in `Arc` to keep the enum cheap to move and
//! `Send + Sync`.

use std::sync::Arc;

use thiserror::Error;

/// Errors arising when the engine process cannot be run to completion.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine executable could not be located.
    #[error("inference engine executable '{program}' was not found")]
    ExecutableNotFound {
        /// Program that was looked up.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// The engine process could not be started for another reason.
    #[error("inference engine '{program}' failed to start: {source}")]
    SpawnFailed {
        /// Program that was launched.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },

    /// Communicating with or waiting on the running process failed.
    #[error("I/O error while running inference engine '{program}': {source}")]
    Io {
        /// Program that was running.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: Arc<std::io::Error>,
    },
}

impl EngineError {
    /// Classifies a spawn failure by its I/O error kind.
    pub(crate) fn from_spawn(program: &str, error: std::io::Error) -> Self {
        if error.kind() == std::io::ErrorKind::NotFound {
            Self::ExecutableNotFound {
                program: program.to_owned(),
                source: Arc::new(error),
            }
        } else {
            Self::SpawnFailed {
                program: program.to_owned(),
                source: Arc::new(error),
            }
        }
    }

    pub(crate) fn io(program: &str, error: std::io::Error) -> Self {
        Self::Io {
            program: program.to_owned(),
            source: Arc::new(error),
        }
    }
}
