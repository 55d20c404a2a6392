//! Error types for web handlers.
//!
//! This module bridges [`BookingError`] and HTTP responses, implementing Axum's
//! `IntoResponse` trait.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use slotbook_core::BookingError;
use std::fmt;

/// Application error type for web handlers.
///
/// # Examples
///
/// ```ignore
/// async fn handler() -> Result<Json<Data>, AppError> {
///     let order = engine.cancel_reserved_order(id).await?;
///     Ok(Json(order))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// HTTP status of this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Transport mapping of the engine's failure kinds.
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        let code = err.kind().to_ascii_uppercase();
        match err {
            BookingError::InvalidArgument(message) => {
                Self::new(StatusCode::BAD_REQUEST, message, code)
            }
            BookingError::TimeslotNotFound { .. } | BookingError::OrderNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string(), code)
            }
            BookingError::TimeslotInactive(_)
            | BookingError::TimeslotFullyBooked { .. }
            | BookingError::OrderNotCancellable { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string(), code)
            }
            BookingError::InconsistentState(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal consistency failure".to_string(),
                code,
            )
            .with_source(anyhow::Error::new(err)),
            BookingError::StoreFailure(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "temporary storage failure, retry the request".to_string(),
                code,
            )
            .with_source(anyhow::Error::new(err)),
        }
    }
}
