//! # Slotbook Core
//!
//! Domain types, the error taxonomy and the store traits for booking
//! capacity-bounded timeslots at a set of branches.
//!
//! ## Core Concepts
//!
//! - **Timeslot**: a dated service window with a fixed `capacity` and a mutable `reserved` count
//! - **Order**: a booking against one timeslot, `created` until it is `cancelled`
//! - **Reservation Engine**: the only writer; creates and cancels orders while
//!   moving `reserved` in the same atomic unit of work
//! - **Timetable**: read-side projection grouping each slot with its active orders
//!
//! ## Invariants
//!
//! At every commit boundary, for every timeslot:
//!
//! ```text
//! 0 <= reserved <= capacity
//! reserved == count(orders where timeslot_id = slot.id and status = 'created')
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use slotbook_core::{BranchId, CustomerName, ReservationEngine, TimeslotId};
//!
//! async fn book<E: ReservationEngine>(engine: &E) -> slotbook_core::Result<()> {
//!     let order = engine
//!         .create_reserved_order(
//!             BranchId::new(1)?,
//!             TimeslotId::new(42)?,
//!             CustomerName::parse("  Ada ")?,
//!         )
//!         .await?;
//!     engine.cancel_reserved_order(order.id).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod error;
pub mod ids;
pub mod store;
pub mod telemetry;
pub mod timetable;
pub mod types;

pub use error::{BookingError, Result};
pub use ids::{BranchId, OrderId, TimeslotId};
pub use store::{
    BookingQuery, BookingStore, EngineOptions, ReservationEngine, StoreFuture, TimetableQuery,
    within_deadline,
};
pub use timetable::{TimetableItem, TimetableOrder, TimetableRow, TimetableTimeslot, group_rows};
pub use types::{
    Branch, BranchDay, CustomerName, NewTimeslot, Order, OrderStatus, ServiceDate, Timeslot,
};
