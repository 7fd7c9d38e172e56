//! Metrics collection and exposition.
//!
//! # Metrics
//! - `asset_requests_total` (counter): requests by outcome (hit, compiled, declined, error)
//! - `asset_compiles_total` (counter): successful compilations
//! - `asset_compile_errors_total` (counter): failed compilations by plugin
//! - `asset_compile_duration_seconds` (histogram): compile latency
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - Prometheus exposition is opt-in

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Request outcome label values.
pub mod outcome {
    pub const HIT: &str = "hit";
    pub const COMPILED: &str = "compiled";
    pub const DECLINED: &str = "declined";
    pub const ERROR: &str = "error";
}

/// Install the Prometheus recorder and its scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(outcome: &'static str) {
    counter!("asset_requests_total", "outcome" => outcome).increment(1);
}

pub fn record_compile(start: Instant) {
    counter!("asset_compiles_total").increment(1);
    histogram!("asset_compile_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_compile_error(plugin: &str) {
    counter!("asset_compile_errors_total", "plugin" => plugin.to_string()).increment(1);
}
