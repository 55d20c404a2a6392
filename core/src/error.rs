//! Error taxonomy for booking operations.
//!
//! Every store operation returns [`BookingError`] on failure. The variants form a
//! closed set so callers (the HTTP layer in particular) can match exhaustively:
//!
//! - **Input errors**: [`BookingError::InvalidArgument`], raised before any store access
//! - **Domain conflicts**: the five not-found/inactive/full/not-cancellable variants.
//!   They reflect true state and are never worth retrying.
//! - **Internal consistency**: [`BookingError::InconsistentState`], a referential or
//!   counter invariant was found broken. Fatal to the operation.
//! - **Store failures**: [`BookingError::StoreFailure`], connection loss, lock timeout,
//!   deadlock. The failed attempt left nothing behind, so a retry is safe.

use crate::ids::{BranchId, OrderId, TimeslotId};
use crate::types::OrderStatus;
use thiserror::Error;

/// Errors surfaced by the reservation engine and the read paths.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// Input failed validation (non-positive id, malformed date, empty name).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// No timeslot with this id exists in this branch.
    #[error("Timeslot {timeslot_id} not found in branch {branch_id}")]
    TimeslotNotFound {
        /// Branch the caller addressed.
        branch_id: BranchId,
        /// Timeslot the caller addressed.
        timeslot_id: TimeslotId,
    },

    /// The timeslot exists but is not accepting bookings.
    #[error("Timeslot {0} is inactive")]
    TimeslotInactive(TimeslotId),

    /// Every seat of the timeslot is already reserved.
    #[error("Timeslot {timeslot_id} is fully booked (capacity {capacity})")]
    TimeslotFullyBooked {
        /// The full timeslot.
        timeslot_id: TimeslotId,
        /// Its capacity at the time of the check.
        capacity: u32,
    },

    /// No order with this id exists.
    #[error("Order {0} not found")]
    OrderNotFound(OrderId),

    /// The order is no longer in the `created` state.
    #[error("Order {order_id} is not cancellable (status: {status})")]
    OrderNotCancellable {
        /// The order the caller tried to cancel.
        order_id: OrderId,
        /// Its current status.
        status: OrderStatus,
    },

    /// Stored data violates an invariant the engine relies on.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// The underlying store failed (I/O, lock timeout, deadlock, deadline exceeded).
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl BookingError {
    /// Build an [`BookingError::InvalidArgument`] from any message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// True for the expected, user-facing conflicts.
    #[must_use]
    pub const fn is_domain_conflict(&self) -> bool {
        matches!(
            self,
            Self::TimeslotNotFound { .. }
                | Self::TimeslotInactive(_)
                | Self::TimeslotFullyBooked { .. }
                | Self::OrderNotFound(_)
                | Self::OrderNotCancellable { .. }
        )
    }

    /// True when repeating the whole operation may succeed.
    ///
    /// Only store failures qualify: operations are atomic, so a failed attempt
    /// leaves no partial state behind. The transaction deadline never covers
    /// the commit itself; a connection lost while committing is the one case
    /// where the outcome is unknown to the caller.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreFailure(_))
    }

    /// Stable machine-readable code, used in logs, metric labels and error bodies.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidArgument(_) => "invalid_argument",
            Self::TimeslotNotFound { .. } => "timeslot_not_found",
            Self::TimeslotInactive(_) => "timeslot_inactive",
            Self::TimeslotFullyBooked { .. } => "timeslot_fully_booked",
            Self::OrderNotFound(_) => "order_not_found",
            Self::OrderNotCancellable { .. } => "order_not_cancellable",
            Self::InconsistentState(_) => "inconsistent_state",
            Self::StoreFailure(_) => "store_failure",
        }
    }
}

/// Result alias for booking operations.
pub type Result<T> = std::result::Result<T, BookingError>;
