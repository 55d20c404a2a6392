//! Identifier newtypes.
//!
//! Ids are server-assigned positive integers. Values coming from callers go
//! through [`BranchId::new`] and friends, which reject anything `<= 0`; values
//! read back from a store use `from_raw`.

use crate::error::BookingError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Validate a caller-supplied id.
            ///
            /// # Errors
            ///
            /// Returns [`BookingError::InvalidArgument`] if `raw` is not positive.
            pub fn new(raw: i64) -> Result<Self, BookingError> {
                if raw > 0 {
                    Ok(Self(raw))
                } else {
                    Err(BookingError::InvalidArgument(format!(
                        "{} must be a positive integer",
                        $label
                    )))
                }
            }

            /// Wrap an id read back from a store without validation.
            #[must_use]
            pub const fn from_raw(raw: i64) -> Self {
                Self(raw)
            }

            /// The underlying integer.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(
    /// Identifier of a branch.
    BranchId,
    "branch_id"
);

positive_id!(
    /// Identifier of a timeslot.
    TimeslotId,
    "timeslot_id"
);

positive_id!(
    /// Identifier of an order.
    OrderId,
    "order_id"
);
