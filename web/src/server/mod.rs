//! HTTP server module.
//!
//! This module provides the Axum-based HTTP server with:
//! - Application state management
//! - Health check endpoints
//! - Router configuration
//! - Graceful shutdown handling

pub mod health;
pub mod lifecycle;
pub mod routes;
pub mod state;

pub use health::health_check;
pub use lifecycle::{Application, shutdown_signal};
pub use routes::build_router;
pub use state::AppState;
