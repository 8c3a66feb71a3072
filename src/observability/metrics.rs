//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, outcome
//! - `proxy_request_duration_seconds` (histogram): end-to-end latency
//! - `proxy_stage_failures_total` (counter): failed pipeline stage
//! - `proxy_pipeline_reloads_total` (counter): hot reloads by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Start the Prometheus scrape endpoint. Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "method" => method.to_string())
        .record(start.elapsed().as_secs_f64());
}

/// Count a forward that stopped at `stage` (see `ProxyError::kind`).
pub fn record_stage_failure(stage: &'static str) {
    metrics::counter!("proxy_stage_failures_total", "stage" => stage).increment(1);
}

pub fn record_pipeline_reload(success: bool) {
    let result = if success { "applied" } else { "rejected" };
    metrics::counter!("proxy_pipeline_reloads_total", "result" => result).increment(1);
}
