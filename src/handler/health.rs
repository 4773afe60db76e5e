//! Health check handler
//!
//! Liveness only: answers as long as the process can serve HTTP.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::http;

pub fn handle_health() -> Response<Full<Bytes>> {
    http::build_health_response()
}
