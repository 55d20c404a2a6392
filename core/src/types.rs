//! Domain entities and validated value objects.

use crate::error::BookingError;
use crate::ids::{BranchId, OrderId, TimeslotId};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Value objects
// ============================================================================

/// Calendar date of a timeslot, in canonical `YYYY-MM-DD` form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceDate(NaiveDate);

impl ServiceDate {
    /// Canonical textual format.
    pub const FORMAT: &'static str = "%Y-%m-%d";

    /// Parse a `YYYY-MM-DD` date. Non-padded or impossible dates are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] if `raw` is not a valid calendar date.
    pub fn parse(raw: &str) -> Result<Self, BookingError> {
        let invalid = || BookingError::invalid("date must be YYYY-MM-DD");
        let canonical = raw.len() == 10
            && raw.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !canonical {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(raw, Self::FORMAT)
            .map(Self)
            .map_err(|_| invalid())
    }

    /// Wrap an already-valid date.
    #[must_use]
    pub const fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The underlying date.
    #[must_use]
    pub const fn date(self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for ServiceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

/// Customer name attached to an order: trimmed, never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    /// Trim and validate a caller-supplied name.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] if nothing is left after trimming.
    pub fn parse(raw: &str) -> Result<Self, BookingError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BookingError::invalid("customer_name must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take ownership of the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of an order. The only transition is `Created -> Cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Holding one unit of its timeslot's capacity.
    Created,
    /// Released; terminal.
    Cancelled,
}

impl OrderStatus {
    /// Database/wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse the stored representation.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InconsistentState`] for unknown values, which can
    /// only come from rows written outside this crate.
    pub fn parse(s: &str) -> Result<Self, BookingError> {
        match s {
            "created" => Ok(Self::Created),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(BookingError::InconsistentState(format!(
                "unknown order status: {other}"
            ))),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated `(branch, date)` filter shared by the read paths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BranchDay {
    /// Branch to read
    pub branch_id: BranchId,
    /// Day to read
    pub date: ServiceDate,
}

impl BranchDay {
    /// Validate raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] if `branch_id <= 0` or `date`
    /// is not a valid `YYYY-MM-DD` calendar date.
    pub fn parse(branch_id: i64, date: &str) -> Result<Self, BookingError> {
        Ok(Self {
            branch_id: BranchId::new(branch_id)?,
            date: ServiceDate::parse(date)?,
        })
    }
}

// ============================================================================
// Entities
// ============================================================================

/// A location that offers timeslots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Branch {
    /// Branch id
    pub id: BranchId,
    /// Display name
    pub name: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// A dated, capacity-bounded service window at a branch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Timeslot {
    /// Timeslot id
    pub id: TimeslotId,
    /// Owning branch
    pub branch_id: BranchId,
    /// Day of service
    pub service_date: ServiceDate,
    /// Start of the window (serialized `HH:MM:SS`)
    pub start_time: NaiveTime,
    /// End of the window (serialized `HH:MM:SS`)
    pub end_time: NaiveTime,
    /// Maximum number of active orders
    pub capacity: u32,
    /// Number of active orders currently holding a seat
    pub reserved: u32,
    /// Whether new orders are accepted
    pub is_active: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last reserve/release timestamp
    pub updated_at: DateTime<Utc>,
}

impl Timeslot {
    /// Seats still free.
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.reserved)
    }

    /// Check whether one more order may be reserved against this slot.
    ///
    /// Mirrors steps 2 and 3 of the create path: inactive first, then full.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::TimeslotInactive`] or [`BookingError::TimeslotFullyBooked`].
    pub fn check_bookable(&self) -> Result<(), BookingError> {
        if !self.is_active {
            return Err(BookingError::TimeslotInactive(self.id));
        }
        if self.reserved >= self.capacity {
            return Err(BookingError::TimeslotFullyBooked {
                timeslot_id: self.id,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Administrative input for creating a timeslot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTimeslot {
    /// Owning branch
    pub branch_id: BranchId,
    /// Day of service
    pub service_date: ServiceDate,
    /// Start of the window
    pub start_time: NaiveTime,
    /// End of the window
    pub end_time: NaiveTime,
    /// Maximum number of active orders
    pub capacity: u32,
    /// Whether new orders are accepted
    pub is_active: bool,
}

impl NewTimeslot {
    /// Active timeslot with the given window and capacity.
    #[must_use]
    pub const fn new(
        branch_id: BranchId,
        service_date: ServiceDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        capacity: u32,
    ) -> Self {
        Self {
            branch_id,
            service_date,
            start_time,
            end_time,
            capacity,
            is_active: true,
        }
    }

    /// Mark the timeslot as not accepting orders.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// Validate capacity and window.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] for zero capacity or an empty window.
    pub fn validate(&self) -> Result<(), BookingError> {
        if self.capacity == 0 {
            return Err(BookingError::invalid("capacity must be positive"));
        }
        if self.end_time <= self.start_time {
            return Err(BookingError::invalid("end_time must be after start_time"));
        }
        Ok(())
    }
}

/// A customer's booking against one timeslot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Order {
    /// Order id
    pub id: OrderId,
    /// Branch of the booked timeslot
    pub branch_id: BranchId,
    /// Booked timeslot
    pub timeslot_id: TimeslotId,
    /// Trimmed customer name
    pub customer_name: String,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// True while the order holds a seat.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Created
    }
}
