//! Application state shared by the HTTP handlers.

use slotbook_core::BookingStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; the store sits behind an `Arc`, so handlers work
/// the same against the Postgres store in production and the in-memory store
/// in tests.
#[derive(Clone)]
pub struct AppState {
    /// Reservation engine and read paths
    pub store: Arc<dyn BookingStore>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn BookingStore>) -> Self {
        Self { store }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone_and_send() {
        fn assert_bounds<T: Clone + Send + Sync + 'static>() {}
        assert_bounds::<AppState>();
    }
}
