//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by outcome
//!   (compressed, bypass, loopback, origin_redirect, fetch_error,
//!   transcode_error, invalid_url, identification)
//! - `proxy_bytes_saved_total` (counter): bytes shaved off by successful
//!   transcodes; negative savings (image grew) are not subtracted
//!
//! # Design Decisions
//! - Recording is cheap (atomic increments) and never fails the request
//! - The Prometheus exporter is opt-in via config

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on its own listener. Call once at
/// startup, from within the runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "metrics exporter listening"),
        Err(error) => tracing::error!(%error, "failed to install metrics exporter"),
    }
}

/// Count a finished request by outcome.
pub fn record_request(outcome: &'static str) {
    counter!("proxy_requests_total", "outcome" => outcome).increment(1);
}

/// Accumulate savings from a successful transcode.
pub fn record_bytes_saved(saved: i64) {
    if saved > 0 {
        counter!("proxy_bytes_saved_total").increment(saved as u64);
    }
}
