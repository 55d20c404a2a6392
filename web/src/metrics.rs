//! Prometheus exporter and metric descriptions.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `slotbook_reservations_total{outcome}` - Create attempts by outcome
//! - `slotbook_cancellations_total{outcome}` - Cancel attempts by outcome
//!
//! ## Histograms
//! - `slotbook_engine_duration_seconds{operation}` - Engine unit-of-work latency

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use slotbook_core::telemetry::{CANCELLATIONS_TOTAL, ENGINE_DURATION_SECONDS, RESERVATIONS_TOTAL};
use std::net::SocketAddr;

/// Register descriptions for every engine metric.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_engine_metrics() {
    describe_counter!(
        RESERVATIONS_TOTAL,
        "Reservation attempts by outcome (ok or a failure kind)"
    );
    describe_counter!(
        CANCELLATIONS_TOTAL,
        "Cancellation attempts by outcome (ok or a failure kind)"
    );
    describe_histogram!(
        ENGINE_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Time spent in one reservation engine unit of work"
    );

    tracing::info!("Engine metrics registered");
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// # Errors
///
/// Returns an error if a recorder is already installed or the listener cannot bind.
pub fn install_exporter(addr: SocketAddr) -> anyhow::Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    register_engine_metrics();
    tracing::info!(%addr, "Prometheus exporter listening");
    Ok(())
}
