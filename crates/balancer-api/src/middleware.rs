//! Request tracking middleware.
//!
//! Wraps every routed request in a tracing span and records its status and
//! duration under the matched route template.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{Instrument, debug, info_span, warn};

use balancer_metrics::error_category;

use crate::ApiState;

/// Route label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

pub async fn track_requests(State(state): State<ApiState>, req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
    let span = info_span!("request", method = %req.method(), %route);

    let start = Instant::now();
    let response = next.run(req).instrument(span.clone()).await;
    let elapsed = start.elapsed();

    let status = response.status().as_u16();
    state.metrics.record_request(&route, status, elapsed).await;

    let elapsed_us = elapsed.as_micros() as u64;
    span.in_scope(|| {
        if status >= 400 {
            warn!(status, category = error_category(status), elapsed_us, "request failed");
        } else {
            debug!(status, elapsed_us, "request completed");
        }
    });
    response
}
