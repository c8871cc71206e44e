//! Error types for the CLI runtime.

use std::io;
use std::sync::Arc;

use lez_engine::CompileError;
use thiserror::Error;

use crate::telemetry::TelemetryError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<ortho_config::OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("failed to initialise logging: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("invalid entry predicate in configuration: {0}")]
    EntryPredicate(CompileError),
    #[error("failed to install the interrupt handler: {0}")]
    InstallSignalHandler(io::Error),
    #[error("failed to read input: {0}")]
    ReadInput(io::Error),
    #[error("failed to write output: {0}")]
    WriteOutput(io::Error),
    #[error("failed to serialise outcome: {0}")]
    SerialiseOutcome(serde_json::Error),
}

impl AppError {
    /// Help and version requests surface as clap errors but are not failures.
    pub(crate) fn is_informational(&self) -> bool {
        matches!(
            self,
            Self::CliUsage(error)
                if matches!(
                    error.kind(),
                    clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
                )
        )
    }
}
