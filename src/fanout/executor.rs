//! Fan-out/fan-in executor
//!
//! Spawns one task per worker ordinal, waits on a per-invocation
//! [`CompletionBarrier`] and then reports a [`ResponseSummary`].
//!
//! Workers are not cancelled when the caller goes away: dropping the
//! returned future detaches the spawned tasks, which run until their work
//! unit finishes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::barrier::CompletionBarrier;
use super::events::{LogEvents, WorkerEvents};
use super::work::WorkUnit;
use crate::error::WorkerFailure;

/// Result of one completed fan-out invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSummary {
    pub workers_requested: usize,
    pub cpu_count: usize,
}

impl ResponseSummary {
    /// Response body, newline terminated
    pub fn to_body(self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for ResponseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed {} workers using {} CPUs",
            self.workers_requested, self.cpu_count
        )
    }
}

pub struct FanOutExecutor<W> {
    num_workers: usize,
    cpu_count: usize,
    worker_timeout: Option<Duration>,
    unit: Arc<W>,
    events: Arc<dyn WorkerEvents>,
}

impl<W: WorkUnit> FanOutExecutor<W> {
    pub fn new(num_workers: usize, unit: W) -> Self {
        Self {
            num_workers,
            cpu_count: num_cpus::get(),
            worker_timeout: None,
            unit: Arc::new(unit),
            events: Arc::new(LogEvents),
        }
    }

    /// Fail workers whose unit runs longer than `timeout`
    #[must_use]
    pub fn with_worker_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.worker_timeout = timeout;
        self
    }

    /// Override the reported CPU count
    #[cfg(test)]
    #[must_use]
    pub fn with_cpu_count(mut self, cpu_count: usize) -> Self {
        self.cpu_count = cpu_count;
        self
    }

    /// Route worker events to a different sink
    #[cfg(test)]
    #[must_use]
    pub fn with_events(mut self, events: Arc<dyn WorkerEvents>) -> Self {
        self.events = events;
        self
    }

    pub const fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Run one fan-out/fan-in round
    ///
    /// Returns only after every worker has signalled completion. With zero
    /// workers nothing is spawned and the summary is returned immediately.
    /// The first failing ordinal (in ordinal order) is reported.
    pub async fn execute(&self) -> Result<ResponseSummary, WorkerFailure> {
        if self.num_workers == 0 {
            return Ok(self.summary());
        }

        let barrier = Arc::new(CompletionBarrier::new(self.num_workers));
        let handles: Vec<_> = (1..=self.num_workers)
            .map(|ordinal| self.spawn_worker(ordinal, &barrier))
            .collect();

        barrier.wait().await;

        let mut first_failure = None;
        for (ordinal, handle) in (1..).zip(handles) {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => {
                    let failure = if e.is_panic() {
                        WorkerFailure::Panicked { ordinal }
                    } else {
                        WorkerFailure::Cancelled { ordinal }
                    };
                    self.events.failed(&failure);
                    Err(failure)
                }
            };
            if let Err(failure) = outcome {
                first_failure.get_or_insert(failure);
            }
        }

        match first_failure {
            Some(failure) => Err(failure),
            None => Ok(self.summary()),
        }
    }

    fn spawn_worker(
        &self,
        ordinal: usize,
        barrier: &Arc<CompletionBarrier>,
    ) -> JoinHandle<Result<(), WorkerFailure>> {
        let unit = Arc::clone(&self.unit);
        let events = Arc::clone(&self.events);
        let worker_timeout = self.worker_timeout;
        let guard = barrier.guard();

        tokio::spawn(async move {
            // Dropped last, after the done event
            let _guard = guard;

            events.starting(ordinal);
            let result = match worker_timeout {
                Some(limit) => tokio::time::timeout(limit, unit.run(ordinal))
                    .await
                    .unwrap_or_else(|_| {
                        Err(WorkerFailure::Timeout {
                            ordinal,
                            elapsed: limit,
                        })
                    }),
                None => unit.run(ordinal).await,
            };
            match &result {
                Ok(()) => events.done(ordinal),
                Err(failure) => events.failed(failure),
            }
            result
        })
    }

    const fn summary(&self) -> ResponseSummary {
        ResponseSummary {
            workers_requested: self.num_workers,
            cpu_count: self.cpu_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fanout::SleepWork;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Starting(usize),
        Done(usize),
        Failed(usize),
    }

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<Event>>,
    }

    impl Recorder {
        fn ordinals(&self, pick: fn(&Event) -> Option<usize>) -> Vec<usize> {
            let mut ordinals: Vec<usize> =
                self.events.lock().unwrap().iter().filter_map(pick).collect();
            ordinals.sort_unstable();
            ordinals
        }

        fn started(&self) -> Vec<usize> {
            self.ordinals(|e| match e {
                Event::Starting(i) => Some(*i),
                _ => None,
            })
        }

        fn done(&self) -> Vec<usize> {
            self.ordinals(|e| match e {
                Event::Done(i) => Some(*i),
                _ => None,
            })
        }

        fn failed(&self) -> Vec<usize> {
            self.ordinals(|e| match e {
                Event::Failed(i) => Some(*i),
                _ => None,
            })
        }
    }

    impl WorkerEvents for Recorder {
        fn starting(&self, ordinal: usize) {
            self.events.lock().unwrap().push(Event::Starting(ordinal));
        }

        fn done(&self, ordinal: usize) {
            self.events.lock().unwrap().push(Event::Done(ordinal));
        }

        fn failed(&self, failure: &WorkerFailure) {
            self.events
                .lock()
                .unwrap()
                .push(Event::Failed(failure.ordinal()));
        }
    }

    /// Staggered delays plus a completion counter
    struct CountingWork {
        finished: Arc<AtomicUsize>,
    }

    impl WorkUnit for CountingWork {
        async fn run(&self, ordinal: usize) -> Result<(), WorkerFailure> {
            let delay = 100 * u64::try_from(ordinal).unwrap();
            tokio::time::sleep(Duration::from_millis(delay)).await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FailingWork {
        bad_ordinal: usize,
    }

    impl WorkUnit for FailingWork {
        async fn run(&self, ordinal: usize) -> Result<(), WorkerFailure> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if ordinal == self.bad_ordinal {
                return Err(WorkerFailure::Timeout {
                    ordinal,
                    elapsed: Duration::from_millis(10),
                });
            }
            Ok(())
        }
    }

    struct PanickingWork;

    impl WorkUnit for PanickingWork {
        async fn run(&self, ordinal: usize) -> Result<(), WorkerFailure> {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert_ne!(ordinal, 3, "worker 3 blew up");
            Ok(())
        }
    }

    fn sleep_executor(num_workers: usize, recorder: &Arc<Recorder>) -> FanOutExecutor<SleepWork> {
        FanOutExecutor::new(num_workers, SleepWork::new(Duration::from_secs(2)))
            .with_cpu_count(4)
            .with_events(Arc::clone(recorder) as Arc<dyn WorkerEvents>)
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_workers_on_four_cpus() {
        let recorder = Arc::new(Recorder::default());
        let executor = sleep_executor(5, &recorder);

        let summary = executor.execute().await.unwrap();

        assert_eq!(
            summary,
            ResponseSummary {
                workers_requested: 5,
                cpu_count: 4
            }
        );
        assert_eq!(summary.to_body(), "Completed 5 workers using 4 CPUs\n");
        assert_eq!(recorder.started(), vec![1, 2, 3, 4, 5]);
        assert_eq!(recorder.done(), vec![1, 2, 3, 4, 5]);
        assert!(recorder.failed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_workers_run_concurrently() {
        let recorder = Arc::new(Recorder::default());
        let executor = sleep_executor(5, &recorder);

        let start = Instant::now();
        executor.execute().await.unwrap();
        let elapsed = start.elapsed();

        // Five sequential sleeps would take ten seconds
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(3), "took {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_workers_returns_immediately() {
        let recorder = Arc::new(Recorder::default());
        let executor = sleep_executor(0, &recorder);

        let start = Instant::now();
        let summary = executor.execute().await.unwrap();

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(summary.to_body(), "Completed 0 workers using 4 CPUs\n");
        assert!(recorder.started().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_waits_for_every_worker() {
        let finished = Arc::new(AtomicUsize::new(0));
        let recorder = Arc::new(Recorder::default());
        let executor = FanOutExecutor::new(
            7,
            CountingWork {
                finished: Arc::clone(&finished),
            },
        )
        .with_events(Arc::clone(&recorder) as Arc<dyn WorkerEvents>);

        let summary = executor.execute().await.unwrap();

        assert_eq!(finished.load(Ordering::SeqCst), 7);
        assert_eq!(recorder.done().len(), 7);
        assert_eq!(summary.workers_requested, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_rounds_are_identical() {
        let recorder = Arc::new(Recorder::default());
        let executor = sleep_executor(3, &recorder);

        let first = executor.execute().await.unwrap();
        let second = executor.execute().await.unwrap();

        assert_eq!(first.to_body(), second.to_body());
        assert_eq!(recorder.done(), vec![1, 1, 2, 2, 3, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_unit_is_reported() {
        let recorder = Arc::new(Recorder::default());
        let executor = FanOutExecutor::new(4, FailingWork { bad_ordinal: 2 })
            .with_events(Arc::clone(&recorder) as Arc<dyn WorkerEvents>);

        let err = executor.execute().await.unwrap_err();

        assert_eq!(err.ordinal(), 2);
        assert!(matches!(err, WorkerFailure::Timeout { .. }));
        assert_eq!(recorder.done(), vec![1, 3, 4]);
        assert_eq!(recorder.failed(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_worker_timeout() {
        let recorder = Arc::new(Recorder::default());
        let executor = sleep_executor(3, &recorder).with_worker_timeout(Some(Duration::from_secs(1)));

        let start = Instant::now();
        let err = executor.execute().await.unwrap_err();

        assert_eq!(
            err,
            WorkerFailure::Timeout {
                ordinal: 1,
                elapsed: Duration::from_secs(1)
            }
        );
        assert_eq!(recorder.failed(), vec![1, 2, 3]);
        assert!(recorder.done().is_empty());
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_unit_still_releases_barrier() {
        let recorder = Arc::new(Recorder::default());
        let executor = FanOutExecutor::new(5, PanickingWork)
            .with_events(Arc::clone(&recorder) as Arc<dyn WorkerEvents>);

        let err = executor.execute().await.unwrap_err();

        assert_eq!(err, WorkerFailure::Panicked { ordinal: 3 });
        assert_eq!(recorder.done(), vec![1, 2, 4, 5]);
        assert_eq!(recorder.failed(), vec![3]);
    }
}
