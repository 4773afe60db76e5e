// Configuration module entry point
// Loads layered configuration and builds the shared application state

mod state;
mod types;

use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{Config, FanOutConfig, RoutesConfig};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SERVER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.reuse_port", false)?
            .set_default("fanout.num_workers", 5)?
            .set_default("fanout.worker_delay_ms", 2000)?
            .set_default("routes.fanout_path", "/")?
            .set_default("routes.health_path", "/health")?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .build()?;

        settings.try_deserialize()
    }

    /// Load configuration, taking the file path from the first CLI argument
    pub fn load() -> Result<Self, config::ConfigError> {
        let path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
        Self::load_from(&path)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|e| ServerError::InvalidAddress {
            addr,
            reason: format!("{e}"),
        })
    }

    /// Reject route tables the router cannot serve unambiguously
    pub fn validate_routes(&self) -> Result<(), ServerError> {
        let routes = &self.routes;
        for path in [&routes.fanout_path, &routes.health_path] {
            if !path.starts_with('/') {
                return Err(ServerError::InvalidRoute(format!(
                    "route path '{path}' must start with '/'"
                )));
            }
        }
        if routes.fanout_path == routes.health_path {
            return Err(ServerError::InvalidRoute(format!(
                "fan-out and health handlers both claim '{}'",
                routes.fanout_path
            )));
        }
        Ok(())
    }
}

impl FanOutConfig {
    pub const fn worker_delay(&self) -> Duration {
        Duration::from_millis(self.worker_delay_ms)
    }

    pub fn worker_timeout(&self) -> Option<Duration> {
        self.worker_timeout_ms.map(Duration::from_millis)
    }
}
