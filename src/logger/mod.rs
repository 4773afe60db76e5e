//! Logger module
//!
//! Provides logging utilities for the HTTP server including:
//! - Server startup logging
//! - Worker lifecycle events
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use crate::error::WorkerFailure;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        LogLevel::parse(&config.logging.level),
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn enabled(level: LogLevel) -> bool {
    !writer::is_initialized() || writer::get().enabled(level)
}

/// Write to info log
fn write_info(message: &str) {
    if writer::is_initialized() {
        writer::get().write_info(message);
    } else {
        println!("{message}");
    }
}

/// Write to error log
fn write_error(message: &str) {
    if writer::is_initialized() {
        writer::get().write_error(message);
    } else {
        eprintln!("{message}");
    }
}

/// Write to access log specifically
fn write_access(message: &str) {
    if writer::is_initialized() {
        writer::get().write_access(message);
    } else {
        println!("{message}");
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Fan-out server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    match config.server.workers {
        Some(workers) => write_info(&format!("Runtime threads: {workers}")),
        None => write_info("Runtime threads: default (CPU cores)"),
    }
    write_info(&format!(
        "Fan-out: {} workers x {} ms on {}",
        config.fanout.num_workers, config.fanout.worker_delay_ms, config.routes.fanout_path
    ));
    write_info(&format!("Health check: {}", config.routes.health_path));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[Connection] Accepted from: {peer_addr}"));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    if enabled(LogLevel::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_worker_starting(ordinal: usize) {
    if enabled(LogLevel::Info) {
        write_info(&format!("Worker {ordinal} starting"));
    }
}

pub fn log_worker_done(ordinal: usize) {
    if enabled(LogLevel::Info) {
        write_info(&format!("Worker {ordinal} done"));
    }
}

pub fn log_worker_failed(failure: &WorkerFailure) {
    write_error(&format!(
        "[ERROR] Worker {} failed: {failure}",
        failure.ordinal()
    ));
}

pub fn log_fanout_complete(summary: &impl std::fmt::Display, elapsed_ms: u128) {
    if enabled(LogLevel::Debug) {
        write_info(&format!("[FanOut] {summary} in {elapsed_ms} ms"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
