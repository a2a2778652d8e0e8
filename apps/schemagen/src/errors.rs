use std::process::ExitCode;

use thiserror::Error;

use crate::llm_client::TransportError;
use crate::materialize::MaterializationError;
use crate::persist::PersistError;
use crate::schema::SchemaError;

/// Application-level error type.
/// `report` logs it and maps it to the process exit status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0:#}")]
    Config(anyhow::Error),

    #[error("input error: {0}")]
    Input(String),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("client setup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Materialization(#[from] MaterializationError),

    #[error("persist stage failed: {0}")]
    Persist(#[from] PersistError),

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Exit status for bad invocations (missing config, unreadable input, bad schema).
const EXIT_USAGE: u8 = 2;
/// Exit status for a run that started but could not produce output.
const EXIT_FAILURE: u8 = 1;

impl AppError {
    /// Logs the failure, prints a one-line diagnostic to stderr and returns
    /// the exit code the process should terminate with.
    pub fn report(&self) -> ExitCode {
        if let AppError::Internal(e) = self {
            tracing::error!("Internal error: {e:?}");
        }
        tracing::error!("{}: {self}", self.kind());
        eprintln!("error: {self}");
        ExitCode::from(self.exit_status())
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            AppError::Config(_) | AppError::Input(_) | AppError::Schema(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Input(_) => "INPUT_ERROR",
            AppError::Schema(_) => "SCHEMA_ERROR",
            AppError::Transport(_) => "CLIENT_ERROR",
            AppError::Materialization(_) => "MATERIALIZATION_ERROR",
            AppError::Persist(_) => "PERSIST_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
