//! Engine lifecycle errors.
//!
//! Probe failures never show up here; they only ever surface as `false`.

use thiserror::Error;

use crate::config::ValidationError;
use crate::probe::ProbeError;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The configuration failed validation.
    #[error("invalid configuration: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
    InvalidConfig(Vec<ValidationError>),

    /// The HTTP client could not be built.
    #[error("failed to build probe client: {0}")]
    Client(#[from] ProbeError),

    /// `start` was called outside a Tokio runtime.
    #[error("engine must be started from within a Tokio runtime")]
    NoRuntime,

    #[error("engine is already running")]
    AlreadyRunning,

    /// The engine was stopped; stopping is terminal.
    #[error("engine has been stopped")]
    Stopped,
}

pub type EngineResult<T> = Result<T, EngineError>;
