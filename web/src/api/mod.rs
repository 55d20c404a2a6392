//! HTTP API handlers.
//!
//! Handlers validate raw input, call the store and shape JSON responses.
//! Store errors convert into [`AppError`](crate::error::AppError) through `?`.

pub mod branches;
pub mod orders;
pub mod timeslots;
pub mod timetable;

use crate::error::AppError;
use serde::Deserialize;
use slotbook_core::{BookingError, BranchDay};

/// `?branch_id=&date=` query parameters, kept as raw strings so that
/// missing and malformed values produce specific messages.
#[derive(Debug, Default, Deserialize)]
pub struct BranchDayParams {
    /// Branch id, expected to be a positive integer
    pub branch_id: Option<String>,
    /// Service date, expected as `YYYY-MM-DD`
    pub date: Option<String>,
}

impl BranchDayParams {
    /// Validate into a [`BranchDay`].
    ///
    /// # Errors
    ///
    /// Returns a 400 [`AppError`] when either parameter is missing or invalid.
    pub fn validate(&self) -> Result<BranchDay, AppError> {
        let branch_id = self.branch_id.as_deref().map(str::trim).unwrap_or_default();
        let date = self.date.as_deref().map(str::trim).unwrap_or_default();
        if branch_id.is_empty() || date.is_empty() {
            return Err(AppError::bad_request("branch_id and date are required"));
        }

        let branch_id = branch_id.parse::<i64>().map_err(|_| {
            AppError::from(BookingError::invalid("branch_id must be a positive integer"))
        })?;

        Ok(BranchDay::parse(branch_id, date)?)
    }
}
