//! # Slotbook Testing
//!
//! Testing utilities for Slotbook.
//!
//! This crate provides:
//! - [`InMemoryBookingStore`], a full store implementation with fault injection
//! - Mock implementations of environment traits
//! - Fixture helpers for seeding branches and timeslots
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use slotbook_testing::{InMemoryBookingStore, fixtures, test_clock};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn books_a_seat() {
//!     let store = InMemoryBookingStore::new().with_clock(Arc::new(test_clock()));
//!     let (branch, slots) = fixtures::seed_day(&store, "2025-01-15", &[2]).await;
//!
//!     let order = store
//!         .create_reserved_order(branch.id, slots[0].id, fixtures::name("Ada"))
//!         .await
//!         .unwrap();
//!     assert!(order.is_active());
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use chrono::{DateTime, Utc};
use slotbook_core::environment::Clock;

pub mod in_memory;

pub use in_memory::InMemoryBookingStore;

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::Mutex;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use slotbook_testing::mocks::FixedClock;
    /// use slotbook_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that advances by a fixed step on every read.
    ///
    /// Gives each order a distinct `created_at`, so ordering by creation time
    /// is observable in tests.
    #[derive(Debug)]
    pub struct SteppingClock {
        next: Mutex<DateTime<Utc>>,
        step: chrono::Duration,
    }

    impl SteppingClock {
        /// Start at `start` and advance by `step` after every read.
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                next: Mutex::new(start),
                step,
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let current = *next;
            *next = current + self.step;
            current
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }

    /// Stepping clock starting at the same instant as [`test_clock`], one second per read.
    #[must_use]
    pub fn stepping_clock() -> SteppingClock {
        SteppingClock::new(test_clock().now(), chrono::Duration::seconds(1))
    }
}

/// Fixture helpers for seeding stores.
///
/// These panic on invalid input; they are meant for tests only.
#[allow(clippy::expect_used)]
pub mod fixtures {
    use crate::InMemoryBookingStore;
    use chrono::NaiveTime;
    use slotbook_core::{Branch, CustomerName, NewTimeslot, ServiceDate, Timeslot};

    /// Parse a `YYYY-MM-DD` literal.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is not a valid date.
    #[must_use]
    pub fn date(raw: &str) -> ServiceDate {
        ServiceDate::parse(raw).expect("fixture date should be valid")
    }

    /// Wall-clock time `hour:minute:00`.
    ///
    /// # Panics
    ///
    /// Panics on an out-of-range time.
    #[must_use]
    pub fn time(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).expect("fixture time should be valid")
    }

    /// Validated customer name.
    ///
    /// # Panics
    ///
    /// Panics if `raw` is blank.
    #[must_use]
    pub fn name(raw: &str) -> CustomerName {
        CustomerName::parse(raw).expect("fixture name should be non-empty")
    }

    /// One-hour active slot starting at `hour`.
    #[must_use]
    pub fn hourly_slot(branch: &Branch, day: ServiceDate, hour: u32, capacity: u32) -> NewTimeslot {
        NewTimeslot::new(branch.id, day, time(hour, 0), time(hour + 1, 0), capacity)
    }

    /// Seed a branch with one active, hour-long slot per capacity, starting at 09:00.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails (zero capacity, for instance).
    pub async fn seed_day(
        store: &InMemoryBookingStore,
        day: &str,
        capacities: &[u32],
    ) -> (Branch, Vec<Timeslot>) {
        let day = date(day);
        let branch = store
            .create_branch("Fixture Branch")
            .await
            .expect("fixture branch should be created");

        let mut slots = Vec::with_capacity(capacities.len());
        for (hour, capacity) in (9..).zip(capacities) {
            let slot = store
                .create_timeslot(hourly_slot(&branch, day, hour, *capacity))
                .await
                .expect("fixture timeslot should be created");
            slots.push(slot);
        }

        tracing::debug!(branch_id = %branch.id, date = %day, slots = slots.len(), "Seeded fixture day");
        (branch, slots)
    }

    /// Install a test-friendly tracing subscriber. Safe to call from every test.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies.
pub mod properties {
    use proptest::prelude::*;

    /// One step of a randomized engine workload.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum EngineStep {
        /// Create an order against the slot at this index (modulo slot count).
        Create(usize),
        /// Cancel the order at this index among orders created so far (modulo count).
        Cancel(usize),
        /// Cancel an order that was already cancelled, if any.
        CancelAgain(usize),
    }

    /// Random engine step, weighted towards creates.
    pub fn engine_step() -> impl Strategy<Value = EngineStep> {
        prop_oneof![
            3 => any::<usize>().prop_map(EngineStep::Create),
            2 => any::<usize>().prop_map(EngineStep::Cancel),
            1 => any::<usize>().prop_map(EngineStep::CancelAgain),
        ]
    }

    /// Sequence of up to `max_len` engine steps.
    pub fn engine_workload(max_len: usize) -> impl Strategy<Value = Vec<EngineStep>> {
        prop::collection::vec(engine_step(), 1..=max_len)
    }

    /// Customer names with surrounding whitespace that survive trimming.
    pub fn customer_name() -> impl Strategy<Value = String> {
        ("[ \t]{0,2}", "[A-Za-z][A-Za-z ]{0,14}[A-Za-z]", "[ \t]{0,2}")
            .prop_map(|(pre, body, post)| format!("{pre}{body}{post}"))
    }
}

pub use mocks::{FixedClock, SteppingClock, stepping_clock, test_clock};
