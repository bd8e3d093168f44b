//! Probe failure taxonomy.

use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a probe counted as unreachable.
///
/// These never leave the prober: they are logged and folded into `false`.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The deadline elapsed before the response arrived.
    #[error("probe timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// DNS, connect, TLS or any other failure below HTTP.
    #[error("transport failure: {0}")]
    Transport(#[source] BoxError),

    /// The server answered with a status outside the expected set.
    #[error("unexpected status {0}")]
    UnexpectedStatus(u16),

    /// The probe was cancelled because the engine shut down.
    #[error("probe cancelled")]
    Cancelled,
}

impl ProbeError {
    /// Label used for the `outcome` metric dimension.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProbeError::Timeout(_) => "timeout",
            ProbeError::Transport(_) => "transport",
            ProbeError::UnexpectedStatus(_) => "unexpected_status",
            ProbeError::Cancelled => "cancelled",
        }
    }

    /// Messages of every underlying cause, outermost first.
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut next = std::error::Error::source(self);
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        causes
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(e: reqwest::Error) -> Self {
        ProbeError::Transport(Box::new(e))
    }
}
