//! Timetable projection: timeslots grouped with their active orders.
//!
//! Stores produce a flat, left-joined row stream (one row per active order, or
//! a single order-less row for a slot without bookings) already sorted by slot
//! start time and then order creation time. [`group_rows`] folds that stream
//! into one [`TimetableItem`] per slot, keeping the incoming order.

use crate::ids::{OrderId, TimeslotId};
use crate::types::{OrderStatus, Timeslot};
use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Timeslot summary shown in the timetable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimetableTimeslot {
    /// Timeslot id
    pub id: TimeslotId,
    /// Start of the window
    pub start_time: NaiveTime,
    /// End of the window
    pub end_time: NaiveTime,
    /// Maximum number of active orders
    pub capacity: u32,
    /// Seats currently reserved
    pub reserved: u32,
    /// Whether new orders are accepted
    pub is_active: bool,
}

impl From<&Timeslot> for TimetableTimeslot {
    fn from(slot: &Timeslot) -> Self {
        Self {
            id: slot.id,
            start_time: slot.start_time,
            end_time: slot.end_time,
            capacity: slot.capacity,
            reserved: slot.reserved,
            is_active: slot.is_active,
        }
    }
}

/// Order summary shown under its timeslot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimetableOrder {
    /// Order id
    pub id: OrderId,
    /// Customer name
    pub customer_name: String,
    /// Always [`OrderStatus::Created`] in a timetable
    pub status: OrderStatus,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// One timeslot and its active orders, oldest first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TimetableItem {
    /// The slot
    pub timeslot: TimetableTimeslot,
    /// Active orders against the slot (empty when nobody booked)
    pub orders: Vec<TimetableOrder>,
}

/// One row of the timeslot/order left join.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimetableRow {
    /// Slot columns, repeated on every row of the slot
    pub timeslot: TimetableTimeslot,
    /// Order columns; `None` when the slot has no active order
    pub order: Option<TimetableOrder>,
}

/// Fold sorted join rows into timetable items.
///
/// A slot appears once, at the position of its first row. Cancelled orders are
/// dropped here as well, so a store that forgets to filter them cannot leak them
/// into the projection.
#[must_use]
pub fn group_rows<I>(rows: I) -> Vec<TimetableItem>
where
    I: IntoIterator<Item = TimetableRow>,
{
    let mut items: Vec<TimetableItem> = Vec::with_capacity(16);
    let mut index_by_timeslot: HashMap<TimeslotId, usize> = HashMap::with_capacity(16);

    for row in rows {
        let position = *index_by_timeslot.entry(row.timeslot.id).or_insert_with(|| {
            items.push(TimetableItem {
                timeslot: row.timeslot.clone(),
                orders: Vec::with_capacity(4),
            });
            items.len() - 1
        });

        if let Some(order) = row.order.filter(|o| o.status == OrderStatus::Created) {
            items[position].orders.push(order);
        }
    }

    items
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(id: i64, hour: u32) -> TimetableTimeslot {
        TimetableTimeslot {
            id: TimeslotId::from_raw(id),
            start_time: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(hour + 1, 0, 0).unwrap(),
            capacity: 5,
            reserved: 0,
            is_active: true,
        }
    }

    fn order(id: i64, status: OrderStatus, minute: u32) -> TimetableOrder {
        TimetableOrder {
            id: OrderId::from_raw(id),
            customer_name: format!("customer-{id}"),
            status,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 8, minute, 0).unwrap(),
        }
    }

    #[test]
    fn groups_orders_under_their_slot() {
        let rows = vec![
            TimetableRow { timeslot: slot(1, 9), order: Some(order(10, OrderStatus::Created, 1)) },
            TimetableRow { timeslot: slot(1, 9), order: Some(order(11, OrderStatus::Created, 2)) },
            TimetableRow { timeslot: slot(2, 10), order: None },
            TimetableRow { timeslot: slot(3, 11), order: Some(order(12, OrderStatus::Created, 3)) },
        ];

        let items = group_rows(rows);

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].timeslot.id, TimeslotId::from_raw(1));
        assert_eq!(
            items[0].orders.iter().map(|o| o.id.get()).collect::<Vec<_>>(),
            vec![10, 11]
        );
        assert!(items[1].orders.is_empty());
        assert_eq!(items[2].orders.len(), 1);
    }

    #[test]
    fn cancelled_orders_never_reach_the_projection() {
        let rows = vec![
            TimetableRow { timeslot: slot(1, 9), order: Some(order(10, OrderStatus::Cancelled, 1)) },
            TimetableRow { timeslot: slot(1, 9), order: Some(order(11, OrderStatus::Created, 2)) },
        ];

        let items = group_rows(rows);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].orders.len(), 1);
        assert_eq!(items[0].orders[0].id, OrderId::from_raw(11));
    }

    #[test]
    fn slot_with_only_cancelled_orders_keeps_an_empty_list() {
        let rows = vec![TimetableRow {
            timeslot: slot(4, 9),
            order: Some(order(20, OrderStatus::Cancelled, 1)),
        }];

        let items = group_rows(rows);

        assert_eq!(items.len(), 1);
        assert!(items[0].orders.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_timetable() {
        assert!(group_rows(Vec::new()).is_empty());
    }
}
