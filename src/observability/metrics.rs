//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gate_upstream_requests_total` (counter): upstream exchanges by mode, status
//! - `gate_upstream_duration_seconds` (histogram): upstream latency by mode
//! - `gate_transport_errors_total` (counter): failed exchanges by mode

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed upstream exchange.
pub fn record_fetch(mode: &'static str, status: u16, start: Instant) {
    metrics::counter!(
        "gate_upstream_requests_total",
        "mode" => mode,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!("gate_upstream_duration_seconds", "mode" => mode)
        .record(start.elapsed().as_secs_f64());
}

/// Record an upstream exchange that never produced a response.
pub fn record_transport_error(mode: &'static str) {
    metrics::counter!("gate_transport_errors_total", "mode" => mode).increment(1);
}
