//! Fan-out handler
//!
//! Runs one fan-out/fan-in round per request and reports the summary.

use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::fanout::{FanOutExecutor, WorkUnit};
use crate::http;
use crate::logger;

pub async fn handle_fanout<W: WorkUnit>(executor: &FanOutExecutor<W>) -> Response<Full<Bytes>> {
    let start = Instant::now();

    match executor.execute().await {
        Ok(summary) => {
            logger::log_fanout_complete(&summary, start.elapsed().as_millis());
            http::build_text_response(StatusCode::OK, summary.to_body())
        }
        Err(failure) => {
            logger::log_error(&format!(
                "Fan-out of {} workers failed: {failure}",
                executor.num_workers()
            ));
            http::build_500_response()
        }
    }
}
