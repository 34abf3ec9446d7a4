//! Metrics collection and exposition.
//!
//! # Metrics
//! - `occupancy_requests_total` (counter): requests by method, status
//! - `occupancy_request_duration_seconds` (histogram): latency distribution
//! - `occupancy_checkins_total` (counter): check-ins by outcome
//! - `occupancy_checkouts_total` (counter): completed checkouts
//! - `occupancy_active_visits` (gauge): current visitors per room
//! - `occupancy_audit_failures_total` (counter): dropped audit entries
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, status: u16, start: Instant) {
    counter!(
        "occupancy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("occupancy_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

/// `outcome` is `admitted` or `at_capacity`.
pub fn record_checkin(outcome: &'static str) {
    counter!("occupancy_checkins_total", "outcome" => outcome).increment(1);
}

pub fn record_checkout() {
    counter!("occupancy_checkouts_total").increment(1);
}

pub fn record_room_occupancy(room: &str, active: usize) {
    gauge!("occupancy_active_visits", "room" => room.to_string()).set(active as f64);
}

pub fn record_audit_failure() {
    counter!("occupancy_audit_failures_total").increment(1);
}
