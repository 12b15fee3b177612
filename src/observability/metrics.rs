//! Metrics collection and exposition.
//!
//! # Metrics
//! - `roots_requests_total` (counter): dispatched requests by method, status
//! - `roots_request_duration_seconds` (histogram): dispatch latency
//! - `roots_route_misses_total` (counter): requests with no matching route
//! - `roots_queries_total` (counter): executed statements by statement, outcome
//!
//! # Design Decisions
//! - Without an installed recorder every call is a no-op
//! - The Prometheus exporter is optional and started from config

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "roots_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("roots_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_route_miss() {
    counter!("roots_route_misses_total").increment(1);
}

pub fn record_query(statement: &str, success: bool) {
    let outcome = if success { "ok" } else { "error" };
    counter!(
        "roots_queries_total",
        "statement" => statement.to_string(),
        "outcome" => outcome
    )
    .increment(1);
}
