//! Error types shared across the server

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

/// Errors that stop the server from starting
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid address '{addr}': {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("Invalid route table: {0}")]
    InvalidRoute(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single worker task
///
/// The sleep placeholder never produces one of these; they exist so real
/// work units can report timeouts and cancellation through the executor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkerFailure {
    #[error("worker {ordinal} timed out after {elapsed:?}")]
    Timeout { ordinal: usize, elapsed: Duration },

    #[error("worker {ordinal} was cancelled")]
    Cancelled { ordinal: usize },

    #[error("worker {ordinal} panicked")]
    Panicked { ordinal: usize },
}

impl WorkerFailure {
    pub const fn ordinal(&self) -> usize {
        match self {
            Self::Timeout { ordinal, .. }
            | Self::Cancelled { ordinal }
            | Self::Panicked { ordinal } => *ordinal,
        }
    }
}

/// Misuse of a completion barrier
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierError {
    #[error("barrier already received all {expected} signals")]
    Overflow { expected: usize },
}
