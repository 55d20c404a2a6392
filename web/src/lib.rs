//! # Slotbook Web
//!
//! Axum HTTP transport for the Slotbook booking store.
//!
//! # Request Flow
//!
//! 1. **HTTP Request** arrives at an Axum handler
//! 2. **Validate** raw input (ids, date, customer name) into domain values
//! 3. **Call** the store through [`slotbook_core::BookingStore`]
//! 4. **Map** the result: JSON body on success, [`AppError`] on failure
//!
//! # Example
//!
//! ```ignore
//! use slotbook_web::{AppState, build_router};
//! use std::sync::Arc;
//!
//! let store = Arc::new(PostgresBookingStore::connect(url, &settings).await?);
//! let app = build_router(AppState::new(store), &["http://localhost:5173".into()]);
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod server;

// Re-export key types for convenience
pub use config::Config;
pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, correlation_id};
pub use server::{AppState, Application, build_router};
