//! Mapping of `sqlx` failures onto [`BookingError`].

use slotbook_core::BookingError;

/// `lock_not_available`: `lock_timeout` expired while waiting for a row lock.
const LOCK_NOT_AVAILABLE: &str = "55P03";
/// `deadlock_detected`
const DEADLOCK_DETECTED: &str = "40P01";
/// `serialization_failure`
const SERIALIZATION_FAILURE: &str = "40001";
/// `query_canceled`: raised when `statement_timeout` fires.
const QUERY_CANCELED: &str = "57014";

/// Convert a database error raised while doing `context`.
///
/// Every driver-level failure becomes [`BookingError::StoreFailure`]: the
/// transaction that hit it is rolled back, so the attempt is safe to retry.
/// Integrity violations are the exception. The engine checks everything the
/// schema enforces before writing, so a violation means stored data broke an
/// invariant, which is [`BookingError::InconsistentState`].
pub(crate) fn store_failure(context: &str, err: &sqlx::Error) -> BookingError {
    if let sqlx::Error::Database(db_err) = err {
        let code = db_err.code();
        let label = match code.as_deref() {
            Some(LOCK_NOT_AVAILABLE) => Some("lock wait timed out"),
            Some(DEADLOCK_DETECTED) => Some("deadlock detected"),
            Some(SERIALIZATION_FAILURE) => Some("serialization failure"),
            Some(QUERY_CANCELED) => Some("statement canceled"),
            _ => None,
        };

        if let (Some(label), Some(code)) = (label, code.as_deref()) {
            return BookingError::StoreFailure(format!("{context}: {label} ({code})"));
        }

        if code.as_deref().is_some_and(|c| c.starts_with("23")) {
            return BookingError::InconsistentState(format!("{context}: {db_err}"));
        }
    }

    BookingError::StoreFailure(format!("{context}: {err}"))
}

/// True when `err` is a foreign-key violation (`23503`).
pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_are_store_failures() {
        let err = store_failure("Failed to lock timeslot", &sqlx::Error::PoolTimedOut);
        assert!(matches!(err, BookingError::StoreFailure(ref m) if m.starts_with("Failed to lock timeslot")));
        assert!(err.is_retryable());
    }

    #[test]
    fn row_not_found_is_not_a_foreign_key_violation() {
        assert!(!is_foreign_key_violation(&sqlx::Error::RowNotFound));
    }
}
