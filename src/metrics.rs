//! Prometheus metrics for fetches and report cycles.
//!
//! This module provides metrics for:
//! - Store fetch latency and failures
//! - Malformed records skipped during normalization
//! - Opportunities found per cycle
//! - Reports delivered

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

// === Metric Name Constants ===

/// Store fetch latency metric name.
pub const METRIC_FETCH_LATENCY: &str = "store_fetch_latency_ms";
/// Successful fetches counter metric name.
pub const METRIC_FETCHES: &str = "store_fetches_total";
/// Failed fetches counter metric name.
pub const METRIC_FETCH_FAILURES: &str = "store_fetch_failures_total";
/// Skipped records counter metric name.
pub const METRIC_RECORDS_SKIPPED: &str = "listing_records_skipped_total";
/// Opportunities gauge metric name.
pub const METRIC_OPPORTUNITIES: &str = "opportunities_current";
/// Reports delivered counter metric name.
pub const METRIC_REPORTS_SENT: &str = "reports_sent_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(METRIC_FETCH_LATENCY, "Store fetch latency in milliseconds");
    describe_counter!(METRIC_FETCHES, "Total number of successful store fetches");
    describe_counter!(METRIC_FETCH_FAILURES, "Total number of failed store fetches");
    describe_counter!(
        METRIC_RECORDS_SKIPPED,
        "Total number of malformed offer records skipped"
    );
    describe_gauge!(
        METRIC_OPPORTUNITIES,
        "Opportunities found in the most recent cycle"
    );
    describe_counter!(METRIC_REPORTS_SENT, "Total number of reports delivered");

    debug!("Metrics initialized");
}

/// Install the Prometheus exporter on `port`.
pub fn install_exporter(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Record store fetch latency.
pub fn record_fetch_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_FETCH_LATENCY).record(latency_ms);
}

/// Increment successful fetch counter.
pub fn inc_fetches() {
    counter!(METRIC_FETCHES).increment(1);
}

/// Increment failed fetch counter.
pub fn inc_fetch_failures() {
    counter!(METRIC_FETCH_FAILURES).increment(1);
}

/// Add skipped records.
pub fn add_records_skipped(count: usize) {
    counter!(METRIC_RECORDS_SKIPPED).increment(count as u64);
}

/// Set the opportunities found in the latest cycle.
pub fn set_opportunities(count: usize) {
    gauge!(METRIC_OPPORTUNITIES).set(count as f64);
}

/// Increment reports delivered, labelled by channel.
pub fn inc_reports_sent(channel: &'static str) {
    counter!(METRIC_REPORTS_SENT, "channel" => channel).increment(1);
}
