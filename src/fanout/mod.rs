//! Fan-out/fan-in module
//!
//! Launches a fixed number of concurrent workers per request and waits for
//! all of them before summarising.

pub mod barrier;
pub mod events;
pub mod executor;
pub mod work;

// Re-export commonly used types
pub use executor::FanOutExecutor;
pub use work::{SleepWork, WorkUnit};
