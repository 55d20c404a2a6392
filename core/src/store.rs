//! Store abstractions for the reservation engine and its read paths.
//!
//! # Implementations
//!
//! - `PostgresBookingStore` (in `slotbook-postgres`): row locks inside a relational transaction
//! - `InMemoryBookingStore` (in `slotbook-testing`): fast, deterministic testing
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! traits can be used as `Arc<dyn BookingStore>` in the HTTP layer.

use crate::error::{BookingError, Result};
use crate::ids::{BranchId, OrderId, TimeslotId};
use crate::timetable::TimetableItem;
use crate::types::{Branch, CustomerName, Order, ServiceDate, Timeslot};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// Boxed future returned by store methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Transaction boundary settings shared by every store implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Deadline for one whole create/cancel unit of work. On expiry the attempt
    /// is abandoned and rolled back.
    pub transaction_timeout: Duration,
    /// How long a single row-lock acquisition may wait inside the store.
    pub lock_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            transaction_timeout: Duration::from_secs(5),
            lock_timeout: Duration::from_secs(2),
        }
    }
}

/// Run one unit of work under a deadline.
///
/// Dropping the inner future on expiry drops whatever transaction it owns,
/// which discards the uncommitted writes.
///
/// # Errors
///
/// Returns the inner error, or [`BookingError::StoreFailure`] if `timeout` elapses first.
pub async fn within_deadline<T, F>(timeout: Duration, operation: &'static str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if let Ok(result) = tokio::time::timeout(timeout, work).await {
        result
    } else {
        tracing::warn!(
            operation,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            "Unit of work abandoned after deadline"
        );
        Err(BookingError::StoreFailure(format!(
            "{operation} timed out after {timeout:?}"
        )))
    }
}

/// The transactional core: the only writer of `reserved` and of order status.
pub trait ReservationEngine: Send + Sync {
    /// Reserve one seat of a timeslot and create an order for it, atomically.
    ///
    /// The timeslot row is exclusively locked for the duration of the unit of
    /// work, so concurrent callers on the same slot are serialized and at most
    /// `capacity` of them can ever succeed.
    ///
    /// # Errors
    ///
    /// - `TimeslotNotFound`: no such timeslot in this branch
    /// - `TimeslotInactive`: the slot is not accepting bookings
    /// - `TimeslotFullyBooked`: `reserved >= capacity`
    /// - `StoreFailure`: I/O, lock timeout, deadline exceeded
    fn create_reserved_order(
        &self,
        branch_id: BranchId,
        timeslot_id: TimeslotId,
        customer_name: CustomerName,
    ) -> StoreFuture<'_, Order>;

    /// Cancel an order and release its seat, atomically.
    ///
    /// Both the order row and its timeslot row are locked, in that order.
    /// Cancelling twice is rejected rather than treated as a no-op.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound`: no such order
    /// - `OrderNotCancellable`: the order is already cancelled
    /// - `InconsistentState`: the referenced timeslot is missing or has nothing to release
    /// - `StoreFailure`: I/O, lock timeout, deadline exceeded
    fn cancel_reserved_order(&self, order_id: OrderId) -> StoreFuture<'_, Order>;
}

/// Plain filtered read paths. No locks, no side effects.
pub trait BookingQuery: Send + Sync {
    /// All branches, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the store cannot be read.
    fn list_branches(&self) -> StoreFuture<'_, Vec<Branch>>;

    /// Timeslots of a branch on a date, ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the store cannot be read.
    fn list_timeslots(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Timeslot>>;

    /// Orders (any status) of a branch on a date, ordered by slot start time
    /// then creation time.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the store cannot be read.
    fn list_orders(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Order>>;
}

/// Read-only timetable projection.
pub trait TimetableQuery: Send + Sync {
    /// Every timeslot of a branch on a date with its active orders.
    ///
    /// Slots are ordered by start time, orders by creation time. Slots without
    /// active orders are present with an empty list.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the store cannot be read.
    fn orders_timetable(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<TimetableItem>>;
}

/// Everything the transport layer needs from a store.
pub trait BookingStore: ReservationEngine + BookingQuery + TimetableQuery {
    /// Cheap connectivity check for readiness probes.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the store is unreachable.
    fn ping(&self) -> StoreFuture<'_, ()>;
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_passes_inner_result_through() {
        let ok = within_deadline(Duration::from_secs(1), "noop", async { Ok(7) }).await;
        assert_eq!(ok, Ok(7));

        let err: Result<()> = within_deadline(Duration::from_secs(1), "noop", async {
            Err(BookingError::OrderNotFound(OrderId::from_raw(1)))
        })
        .await;
        assert_eq!(err, Err(BookingError::OrderNotFound(OrderId::from_raw(1))));
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_store_failure() {
        let result: Result<()> = within_deadline(Duration::from_millis(10), "slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(err @ BookingError::StoreFailure(_)) => {
                assert!(err.is_retryable());
                assert!(err.to_string().contains("slow timed out"));
            }
            other => panic!("expected StoreFailure, got {other:?}"),
        }
    }
}
