//! Timeslot listing.
//!
//! - GET /timeslots?branch_id=&date= - Slots of one branch on one day, by start time

use super::BranchDayParams;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use slotbook_core::{BookingQuery, Timeslot};

/// Response for the timeslot listing.
#[derive(Debug, Serialize)]
pub struct TimeslotListResponse {
    /// Timeslots, ordered by start time
    pub items: Vec<Timeslot>,
    /// Number of items
    pub count: usize,
}

/// List the timeslots of a branch on a date.
///
/// # Errors
///
/// Returns 400 for missing or invalid parameters, 500 if the store fails.
pub async fn list_timeslots(
    State(state): State<AppState>,
    Query(params): Query<BranchDayParams>,
) -> Result<Json<TimeslotListResponse>, AppError> {
    let day = params.validate()?;
    let items = state.store.list_timeslots(day.branch_id, day.date).await?;
    Ok(Json(TimeslotListResponse {
        count: items.len(),
        items,
    }))
}
