//! Timetable projection endpoint.
//!
//! - GET /timetable?branch_id=&date= - Every slot of the day with its active orders

use super::BranchDayParams;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use slotbook_core::{BranchId, ServiceDate, TimetableItem, TimetableQuery};

/// Response for the timetable query.
#[derive(Debug, Serialize)]
pub struct TimetableResponse {
    /// Requested branch
    pub branch_id: BranchId,
    /// Requested day
    pub date: ServiceDate,
    /// One entry per timeslot, ordered by start time
    pub items: Vec<TimetableItem>,
}

/// Timetable of a branch on a date.
///
/// # Example
///
/// ```bash
/// curl 'http://localhost:8080/timetable?branch_id=1&date=2025-01-15'
/// ```
///
/// Response:
/// ```json
/// {
///   "branch_id": 1,
///   "date": "2025-01-15",
///   "items": [
///     {
///       "timeslot": {"id": 4, "start_time": "09:00:00", "end_time": "10:00:00",
///                    "capacity": 3, "reserved": 1, "is_active": true},
///       "orders": [{"id": 12, "customer_name": "Ada", "status": "created",
///                   "created_at": "2025-01-10T08:00:00Z"}]
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 for missing or invalid parameters, 500 if the store fails.
pub async fn get_timetable(
    State(state): State<AppState>,
    Query(params): Query<BranchDayParams>,
) -> Result<Json<TimetableResponse>, AppError> {
    let day = params.validate()?;
    let items = state.store.orders_timetable(day.branch_id, day.date).await?;
    Ok(Json(TimetableResponse {
        branch_id: day.branch_id,
        date: day.date,
        items,
    }))
}
