// Application state module
// Everything a request handler needs, built once at startup

use super::types::Config;
use crate::fanout::{FanOutExecutor, SleepWork};
use crate::handler::RouteTable;

/// Application state
pub struct AppState {
    pub config: Config,
    pub routes: RouteTable,
    pub executor: FanOutExecutor<SleepWork>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let executor = FanOutExecutor::new(
            config.fanout.num_workers,
            SleepWork::new(config.fanout.worker_delay()),
        )
        .with_worker_timeout(config.fanout.worker_timeout());
        Self::with_executor(config, executor)
    }

    /// Build state around a preconfigured executor
    pub fn with_executor(config: &Config, executor: FanOutExecutor<SleepWork>) -> Self {
        Self {
            config: config.clone(),
            routes: RouteTable::from_config(&config.routes),
            executor,
        }
    }
}
