//! Worker lifecycle events

use crate::error::WorkerFailure;
use crate::logger;

/// Sink for worker lifecycle events
pub trait WorkerEvents: Send + Sync {
    fn starting(&self, ordinal: usize);
    fn done(&self, ordinal: usize);
    fn failed(&self, failure: &WorkerFailure);
}

/// Default sink, writes events to the server log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEvents;

impl WorkerEvents for LogEvents {
    fn starting(&self, ordinal: usize) {
        logger::log_worker_starting(ordinal);
    }

    fn done(&self, ordinal: usize) {
        logger::log_worker_done(ordinal);
    }

    fn failed(&self, failure: &WorkerFailure) {
        logger::log_worker_failed(failure);
    }
}
