//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: exact-match route lookup,
//! dispatch and access logging.

use crate::config::{AppState, RoutesConfig};
use crate::handler::{fanout, health};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Request, Response, Version};
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Handler a path is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    FanOut,
    Health,
}

/// Exact-match route table, fixed after startup
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<String, RouteKind>,
}

impl RouteTable {
    pub fn from_config(config: &RoutesConfig) -> Self {
        let routes = HashMap::from([
            (config.fanout_path.clone(), RouteKind::FanOut),
            (config.health_path.clone(), RouteKind::Health),
        ]);
        Self { routes }
    }

    pub fn lookup(&self, path: &str) -> Option<RouteKind> {
        self.routes.get(path).copied()
    }
}

/// Main entry point for HTTP request handling
///
/// Method, headers and body are not inspected by either handler.
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let start = Instant::now();
    let path = req.uri().path();

    let response = match state.routes.lookup(path) {
        Some(RouteKind::Health) => health::handle_health(),
        Some(RouteKind::FanOut) => fanout::handle_fanout(&state.executor).await,
        None => http::build_404_response(),
    };

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, peer_addr, start);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    start: Instant,
) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header_value(req, "referer");
    entry.user_agent = header_value(req, "user-agent");
    entry.request_time_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
