//! Order endpoints.
//!
//! - POST /orders - Reserve a seat and create an order
//! - GET /orders?branch_id=&date= - Orders of one branch on one day, any status
//! - PATCH /orders/:id/cancel - Cancel an order and release its seat

use super::BranchDayParams;
use crate::error::AppError;
use crate::middleware::CorrelationId;
use crate::server::state::AppState;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use slotbook_core::{
    BookingQuery, BranchId, CustomerName, Order, OrderId, ReservationEngine, ServiceDate,
    TimeslotId,
};

const REQUIRED_FIELDS: &str = "branch_id, timeslot_id, customer_name are required";

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Branch of the timeslot
    pub branch_id: Option<i64>,
    /// Timeslot to book
    pub timeslot_id: Option<i64>,
    /// Customer name; surrounding whitespace is trimmed
    pub customer_name: Option<String>,
}

impl CreateOrderRequest {
    fn validate(self) -> Result<(BranchId, TimeslotId, CustomerName), AppError> {
        let required = || AppError::bad_request(REQUIRED_FIELDS);

        let branch_id = self
            .branch_id
            .and_then(|raw| BranchId::new(raw).ok())
            .ok_or_else(required)?;
        let timeslot_id = self
            .timeslot_id
            .and_then(|raw| TimeslotId::new(raw).ok())
            .ok_or_else(required)?;
        let customer_name = self
            .customer_name
            .as_deref()
            .and_then(|raw| CustomerName::parse(raw).ok())
            .ok_or_else(required)?;

        Ok((branch_id, timeslot_id, customer_name))
    }
}

/// Response wrapping a single order.
#[derive(Debug, Serialize)]
pub struct OrderResponse {
    /// The created or cancelled order
    pub order: Order,
}

/// Response for the order listing.
#[derive(Debug, Serialize)]
pub struct OrderListResponse {
    /// Requested branch
    pub branch_id: BranchId,
    /// Requested day
    pub date: ServiceDate,
    /// Number of items
    pub count: usize,
    /// Orders ordered by timeslot start time, then creation time
    pub items: Vec<Order>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Create an order, reserving one seat of the timeslot.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/orders \
///   -H 'Content-Type: application/json' \
///   -d '{"branch_id":1,"timeslot_id":4,"customer_name":"Ada"}'
/// ```
///
/// # Errors
///
/// - 400 for an unreadable body or missing fields
/// - 404 if the timeslot does not exist in the branch
/// - 409 if the timeslot is inactive or fully booked
/// - 500 on store or consistency failure
pub async fn create_order(
    State(state): State<AppState>,
    correlation: Option<Extension<CorrelationId>>,
    body: Bytes,
) -> Result<(StatusCode, Json<OrderResponse>), AppError> {
    // Decoded whatever the Content-Type header says.
    let request: CreateOrderRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected order body");
        AppError::bad_request("invalid json body")
    })?;
    let (branch_id, timeslot_id, customer_name) = request.validate()?;

    let order = state
        .store
        .create_reserved_order(branch_id, timeslot_id, customer_name)
        .await?;

    tracing::info!(
        correlation_id = ?correlation.map(|Extension(id)| id.0),
        order_id = %order.id,
        %branch_id,
        %timeslot_id,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(OrderResponse { order })))
}

/// List the orders of a branch on a date, including cancelled ones.
///
/// # Errors
///
/// Returns 400 for missing or invalid parameters, 500 if the store fails.
pub async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<BranchDayParams>,
) -> Result<Json<OrderListResponse>, AppError> {
    let day = params.validate()?;
    let items = state.store.list_orders(day.branch_id, day.date).await?;
    Ok(Json(OrderListResponse {
        branch_id: day.branch_id,
        date: day.date,
        count: items.len(),
        items,
    }))
}

/// Cancel an order, releasing its seat.
///
/// # Errors
///
/// - 400 for a non-numeric or non-positive id
/// - 404 if the order does not exist
/// - 409 if the order is already cancelled
/// - 500 on store or consistency failure
pub async fn cancel_order(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<OrderResponse>, AppError> {
    let order_id = raw_id
        .parse::<i64>()
        .ok()
        .and_then(|raw| OrderId::new(raw).ok())
        .ok_or_else(|| AppError::bad_request("invalid order id"))?;

    let order = state.store.cancel_reserved_order(order_id).await?;
    tracing::info!(order_id = %order.id, "Order cancelled");

    Ok(Json(OrderResponse { order }))
}
