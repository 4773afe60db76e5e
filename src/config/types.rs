// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub fanout: FanOutConfig,
    pub routes: RoutesConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads (defaults to CPU cores when unset)
    pub workers: Option<usize>,
    /// Allow several processes to share the listening port
    pub reuse_port: bool,
}

/// Fan-out executor configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct FanOutConfig {
    /// Workers launched per request, 0 answers immediately
    pub num_workers: usize,
    /// Placeholder delay each worker sleeps for
    pub worker_delay_ms: u64,
    /// Optional per-worker deadline, unset means workers always run to completion
    #[serde(default)]
    pub worker_timeout_ms: Option<u64>,
}

/// Route table configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RoutesConfig {
    /// Path served by the fan-out handler
    pub fanout_path: String,
    /// Path served by the health handler
    pub health_path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Connection handling configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Time allowed for a request's headers to arrive, in seconds (0 disables)
    pub header_read_timeout: u64,
    pub max_connections: Option<u64>,
}
