//! Metrics collection and exposition.
//!
//! # Metrics
//! - `vault_requests_total` (counter): requests by method, status
//! - `vault_request_duration_seconds` (histogram): latency distribution
//! - `vault_rate_limited_total` (counter): throttled requests by scope
//! - `vault_login_attempts_total` (counter): login attempts by outcome
//! - `vault_ideas` (gauge): ideas currently stored
//!
//! # Design Decisions
//! - Low-overhead metric updates (atomic operations)
//! - Prometheus exposition on its own listener, separate from the API

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter on its own address.
///
/// Failure is logged, never fatal: the vault serves traffic without
/// metrics rather than refusing to start.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed (or short-circuited) request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "vault_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("vault_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// Record a request rejected by one of the rate limiters.
pub fn record_rate_limited(scope: &'static str) {
    counter!("vault_rate_limited_total", "scope" => scope).increment(1);
}

/// Record a login attempt outcome ("success", "failure", "throttled").
pub fn record_login(outcome: &'static str) {
    counter!("vault_login_attempts_total", "outcome" => outcome).increment(1);
}

/// Track the current number of stored ideas.
pub fn record_idea_count(count: usize) {
    gauge!("vault_ideas").set(count as f64);
}
