//! Administrative seeding of branches and timeslots.
//!
//! Not part of the engine: a new timeslot starts with `reserved = 0` and is
//! only ever modified by the engine afterwards.

use crate::PostgresBookingStore;
use crate::errors::{is_foreign_key_violation, store_failure};
use crate::rows::{self, BRANCH_COLUMNS, TIMESLOT_COLUMNS};
use slotbook_core::{BookingError, Branch, NewTimeslot, Result, Timeslot};

impl PostgresBookingStore {
    /// Insert a branch.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] for a blank name, or
    /// [`BookingError::StoreFailure`] if the insert fails.
    pub async fn create_branch(&self, name: &str) -> Result<Branch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookingError::invalid("branch name must not be empty"));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO branches (name) VALUES ($1) RETURNING {BRANCH_COLUMNS}"
        ))
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_failure("Failed to insert branch", &e))?;

        rows::branch(&row)
    }

    /// Insert a timeslot with `reserved = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] if the slot is invalid or the
    /// branch does not exist, or [`BookingError::StoreFailure`] if the insert fails.
    pub async fn create_timeslot(&self, new: NewTimeslot) -> Result<Timeslot> {
        new.validate()?;
        let capacity = i32::try_from(new.capacity)
            .map_err(|_| BookingError::invalid("capacity is too large"))?;

        let row = sqlx::query(&format!(
            "INSERT INTO timeslots \
                 (branch_id, service_date, start_time, end_time, capacity, reserved, is_active) \
             VALUES ($1, $2, $3, $4, $5, 0, $6) \
             RETURNING {TIMESLOT_COLUMNS}"
        ))
        .bind(new.branch_id.get())
        .bind(new.service_date.date())
        .bind(new.start_time)
        .bind(new.end_time)
        .bind(capacity)
        .bind(new.is_active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                BookingError::invalid(format!("branch {} does not exist", new.branch_id))
            } else {
                store_failure("Failed to insert timeslot", &e)
            }
        })?;

        rows::timeslot(&row)
    }
}
