//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{branches, orders, timeslots, timetable};
use crate::middleware::correlation_id;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, patch},
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

/// Preflight cache lifetime.
const CORS_MAX_AGE: Duration = Duration::from_secs(86_400);

/// Build the complete Axum router.
///
/// Configures:
/// - Health checks (`/health`, `/ready`)
/// - Branch and timeslot listings
/// - Order creation, listing and cancellation
/// - The per-day timetable
///
/// # Arguments
///
/// - `state`: Application state to share with handlers
/// - `cors_origins`: Origins allowed to call the API from a browser
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Reference data
        .route("/branches", get(branches::list_branches))
        .route("/timeslots", get(timeslots::list_timeslots))
        // Orders
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/:id/cancel", patch(orders::cancel_order))
        // Projection
        .route("/timetable", get(timetable::get_timetable))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(correlation_id))
        .layer(cors_layer(cors_origins))
}

/// CORS policy: allow-listed origins with credentials.
#[must_use]
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
