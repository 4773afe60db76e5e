//! Work units run by each worker task

use std::future::Future;
use std::time::Duration;

use crate::error::WorkerFailure;

/// One unit of work executed by a worker
///
/// Implementations replace the placeholder delay without touching the
/// fan-out/fan-in mechanics in [`super::FanOutExecutor`].
pub trait WorkUnit: Send + Sync + 'static {
    fn run(&self, ordinal: usize) -> impl Future<Output = Result<(), WorkerFailure>> + Send;
}

/// Placeholder work: sleep for a fixed delay, never fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepWork {
    delay: Duration,
}

impl SleepWork {
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl WorkUnit for SleepWork {
    async fn run(&self, _ordinal: usize) -> Result<(), WorkerFailure> {
        tokio::time::sleep(self.delay).await;
        Ok(())
    }
}
