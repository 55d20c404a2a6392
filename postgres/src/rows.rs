//! Row decoding.
//!
//! Column lists live next to the decoders so every query that returns an
//! entity selects exactly what its decoder reads.

use crate::errors::store_failure;
use slotbook_core::{
    BookingError, Branch, BranchId, Order, OrderId, OrderStatus, Result, ServiceDate, Timeslot,
    TimeslotId, TimetableOrder, TimetableRow, TimetableTimeslot,
};
use sqlx::Row;
use sqlx::postgres::PgRow;

/// Columns read by [`branch`].
pub(crate) const BRANCH_COLUMNS: &str = "id, name, created_at";

/// Columns read by [`timeslot`].
pub(crate) const TIMESLOT_COLUMNS: &str = "id, branch_id, service_date, start_time, end_time, \
     capacity, reserved, is_active, created_at, updated_at";

/// Columns read by [`order`].
pub(crate) const ORDER_COLUMNS: &str =
    "id, branch_id, timeslot_id, customer_name, status, created_at, updated_at";

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column)
        .map_err(|e| store_failure(&format!("Failed to decode column {column}"), &e))
}

fn counter(row: &PgRow, column: &str) -> Result<u32> {
    let raw: i32 = get(row, column)?;
    u32::try_from(raw).map_err(|_| {
        BookingError::InconsistentState(format!("column {column} holds negative value {raw}"))
    })
}

pub(crate) fn branch(row: &PgRow) -> Result<Branch> {
    Ok(Branch {
        id: BranchId::from_raw(get(row, "id")?),
        name: get(row, "name")?,
        created_at: get(row, "created_at")?,
    })
}

pub(crate) fn timeslot(row: &PgRow) -> Result<Timeslot> {
    Ok(Timeslot {
        id: TimeslotId::from_raw(get(row, "id")?),
        branch_id: BranchId::from_raw(get(row, "branch_id")?),
        service_date: ServiceDate::from_date(get(row, "service_date")?),
        start_time: get(row, "start_time")?,
        end_time: get(row, "end_time")?,
        capacity: counter(row, "capacity")?,
        reserved: counter(row, "reserved")?,
        is_active: get(row, "is_active")?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

pub(crate) fn order(row: &PgRow) -> Result<Order> {
    let status: String = get(row, "status")?;
    Ok(Order {
        id: OrderId::from_raw(get(row, "id")?),
        branch_id: BranchId::from_raw(get(row, "branch_id")?),
        timeslot_id: TimeslotId::from_raw(get(row, "timeslot_id")?),
        customer_name: get(row, "customer_name")?,
        status: OrderStatus::parse(&status)?,
        created_at: get(row, "created_at")?,
        updated_at: get(row, "updated_at")?,
    })
}

/// Decode one row of the timetable left join. Order columns are all NULL for
/// a slot without active orders.
pub(crate) fn timetable_row(row: &PgRow) -> Result<TimetableRow> {
    let timeslot = TimetableTimeslot {
        id: TimeslotId::from_raw(get(row, "timeslot_id")?),
        start_time: get(row, "start_time")?,
        end_time: get(row, "end_time")?,
        capacity: counter(row, "capacity")?,
        reserved: counter(row, "reserved")?,
        is_active: get(row, "is_active")?,
    };

    let order_id: Option<i64> = get(row, "order_id")?;
    let order = match order_id {
        Some(id) => {
            let status: String = get(row, "order_status")?;
            Some(TimetableOrder {
                id: OrderId::from_raw(id),
                customer_name: get(row, "customer_name")?,
                status: OrderStatus::parse(&status)?,
                created_at: get(row, "order_created_at")?,
            })
        }
        None => None,
    };

    Ok(TimetableRow { timeslot, order })
}
