//! Metrics and log events shared by every engine implementation.
//!
//! # Exported Metrics
//!
//! - `slotbook_reservations_total{outcome}` - create attempts by outcome
//! - `slotbook_cancellations_total{outcome}` - cancel attempts by outcome
//! - `slotbook_engine_duration_seconds{operation}` - unit-of-work latency
//!
//! `outcome` is `"ok"` or a [`BookingError::kind`] code.

use crate::error::BookingError;
use crate::types::Order;
use std::time::Instant;

/// Metric name for create attempts.
pub const RESERVATIONS_TOTAL: &str = "slotbook_reservations_total";
/// Metric name for cancel attempts.
pub const CANCELLATIONS_TOTAL: &str = "slotbook_cancellations_total";
/// Metric name for engine latency.
pub const ENGINE_DURATION_SECONDS: &str = "slotbook_engine_duration_seconds";

/// Engine operation being observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOperation {
    /// `create_reserved_order`
    Create,
    /// `cancel_reserved_order`
    Cancel,
}

impl EngineOperation {
    /// Label value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create_reserved_order",
            Self::Cancel => "cancel_reserved_order",
        }
    }

    const fn counter(self) -> &'static str {
        match self {
            Self::Create => RESERVATIONS_TOTAL,
            Self::Cancel => CANCELLATIONS_TOTAL,
        }
    }
}

/// Record the outcome of one engine call and log failures at the level
/// their category deserves.
pub fn record_outcome(
    operation: EngineOperation,
    started: Instant,
    result: &Result<Order, BookingError>,
) {
    let outcome = match result {
        Ok(_) => "ok",
        Err(err) => err.kind(),
    };

    metrics::counter!(operation.counter(), "outcome" => outcome).increment(1);
    metrics::histogram!(ENGINE_DURATION_SECONDS, "operation" => operation.as_str())
        .record(started.elapsed().as_secs_f64());

    match result {
        Ok(order) => tracing::info!(
            operation = operation.as_str(),
            order_id = %order.id,
            timeslot_id = %order.timeslot_id,
            status = %order.status,
            "Engine operation committed"
        ),
        Err(err @ BookingError::InconsistentState(_)) => tracing::error!(
            operation = operation.as_str(),
            error = %err,
            "Internal consistency failure, operator attention required"
        ),
        Err(err @ BookingError::StoreFailure(_)) => tracing::warn!(
            operation = operation.as_str(),
            error = %err,
            "Engine operation rolled back on store failure"
        ),
        Err(err) => tracing::debug!(
            operation = operation.as_str(),
            outcome,
            error = %err,
            "Engine operation rejected"
        ),
    }
}
