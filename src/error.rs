//! Typed failures reported by check collaborators
//!
//! Every collaborator error is turned into a failed check result; none of
//! these propagate past a check.

use std::time::Duration;

use thiserror::Error;

/// Failure to load a module through a [`ModuleLoader`](crate::health::checks::ModuleLoader)
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid module name '{0}'")]
    InvalidName(String),

    #[error("module '{module}' could not be imported: {reason}")]
    NotFound { module: String, reason: String },

    #[error("failed to run interpreter '{interpreter}': {source}")]
    Interpreter {
        interpreter: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the database collaborator
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("missing database setting {0}")]
    MissingSetting(&'static str),

    #[error("invalid DB_PORT '{0}'")]
    InvalidPort(String),

    #[error("connection pool not initialized")]
    NotInitialized,

    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of the external model API collaborator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),

    #[error("{0}")]
    Other(String),
}
