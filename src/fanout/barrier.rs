//! Completion barrier
//!
//! A one-shot latch released once a fixed number of signals has arrived.
//! Each fan-out invocation owns exactly one barrier; workers hold a
//! [`CompletionGuard`] that signals when the worker finishes, including
//! when it unwinds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use crate::error::BarrierError;
use crate::logger;

pub struct CompletionBarrier {
    expected: usize,
    signalled: AtomicUsize,
    released: Notify,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            signalled: AtomicUsize::new(0),
            released: Notify::new(),
        }
    }

    pub fn signalled(&self) -> usize {
        self.signalled.load(Ordering::Acquire)
    }

    pub fn is_released(&self) -> bool {
        self.signalled() >= self.expected
    }

    /// Record one completion, returning the new signal count
    ///
    /// The count never exceeds `expected`; extra signals are rejected.
    pub fn signal(&self) -> Result<usize, BarrierError> {
        let prev = self
            .signalled
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                if count < self.expected {
                    Some(count + 1)
                } else {
                    None
                }
            })
            .map_err(|_| BarrierError::Overflow {
                expected: self.expected,
            })?;

        let count = prev + 1;
        if count == self.expected {
            self.released.notify_waiters();
        }
        Ok(count)
    }

    /// Suspend until every expected signal has arrived
    pub async fn wait(&self) {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            // Register before checking so a concurrent release is not missed
            notified.as_mut().enable();

            if self.is_released() {
                return;
            }
            notified.await;
        }
    }

    /// Hand out a guard that signals this barrier when dropped
    pub fn guard(self: &Arc<Self>) -> CompletionGuard {
        CompletionGuard {
            barrier: Arc::clone(self),
        }
    }
}

/// Signals its barrier exactly once, on drop
pub struct CompletionGuard {
    barrier: Arc<CompletionBarrier>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.barrier.signal() {
            logger::log_warning(&format!("Completion signal dropped: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_zero_barrier_is_released_immediately() {
        let barrier = CompletionBarrier::new(0);
        assert!(barrier.is_released());
        barrier.wait().await;
        assert_eq!(
            barrier.signal(),
            Err(BarrierError::Overflow { expected: 0 })
        );
    }

    #[test]
    fn test_signal_never_exceeds_expected() {
        let barrier = CompletionBarrier::new(2);
        assert_eq!(barrier.signal(), Ok(1));
        assert!(!barrier.is_released());
        assert_eq!(barrier.signal(), Ok(2));
        assert!(barrier.is_released());
        assert!(barrier.signal().is_err());
        assert_eq!(barrier.signalled(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_releases_after_all_signals() {
        let barrier = Arc::new(CompletionBarrier::new(3));

        for i in 1..=3u64 {
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(100 * i)).await;
                barrier.signal().unwrap();
            });
        }

        barrier.wait().await;
        assert_eq!(barrier.signalled(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_is_pending_until_last_signal() {
        let barrier = Arc::new(CompletionBarrier::new(2));
        barrier.signal().unwrap();

        let waited = tokio::time::timeout(Duration::from_secs(1), barrier.wait()).await;
        assert!(waited.is_err(), "barrier released with a signal missing");

        barrier.signal().unwrap();
        barrier.wait().await;
    }

    #[test]
    fn test_guard_signals_on_drop() {
        let barrier = Arc::new(CompletionBarrier::new(1));
        let guard = barrier.guard();
        assert_eq!(barrier.signalled(), 0);
        drop(guard);
        assert!(barrier.is_released());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_signals_count_exactly_expected() {
        const EXPECTED: usize = 64;
        const EXTRA: usize = 16;

        let barrier = Arc::new(CompletionBarrier::new(EXPECTED));
        let waiter = {
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move { barrier.wait().await })
        };

        // Every task signals at once after the start gate opens
        let gate = Arc::new(tokio::sync::Barrier::new(EXPECTED + EXTRA));
        let handles: Vec<_> = (0..EXPECTED + EXTRA)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                let gate = Arc::clone(&gate);
                tokio::spawn(async move {
                    gate.wait().await;
                    barrier.signal()
                })
            })
            .collect();

        let mut counts = Vec::new();
        let mut overflows = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(count) => counts.push(count),
                Err(e) => {
                    assert_eq!(e, BarrierError::Overflow { expected: EXPECTED });
                    overflows += 1;
                }
            }
        }

        counts.sort_unstable();
        assert_eq!(counts, (1..=EXPECTED).collect::<Vec<_>>());
        assert_eq!(overflows, EXTRA);
        assert_eq!(barrier.signalled(), EXPECTED);

        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter not released")
            .unwrap();
    }
}
