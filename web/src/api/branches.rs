//! Branch listing.
//!
//! - GET /branches - All branches, ordered by id

use crate::error::AppError;
use crate::server::state::AppState;
use axum::{Json, extract::State};
use serde::Serialize;
use slotbook_core::{BookingQuery, Branch};

/// Response for the branch listing.
#[derive(Debug, Serialize)]
pub struct BranchListResponse {
    /// Branches, ordered by id
    pub items: Vec<Branch>,
    /// Number of items
    pub count: usize,
}

/// List all branches.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/branches
/// # {"items":[{"id":1,"name":"Siam","created_at":"..."}],"count":1}
/// ```
///
/// # Errors
///
/// Returns 500 if the store fails.
pub async fn list_branches(State(state): State<AppState>) -> Result<Json<BranchListResponse>, AppError> {
    let items = state.store.list_branches().await?;
    Ok(Json(BranchListResponse {
        count: items.len(),
        items,
    }))
}
