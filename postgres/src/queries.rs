//! Read paths. Each is a single statement against the pool.

use crate::PostgresBookingStore;
use crate::errors::store_failure;
use crate::rows::{self, BRANCH_COLUMNS, TIMESLOT_COLUMNS};
use slotbook_core::{
    BookingQuery, Branch, BranchId, Order, Result, ServiceDate, StoreFuture, Timeslot,
    TimetableItem, TimetableQuery, group_rows,
};

const LIST_ORDERS: &str = r"
    SELECT o.id, o.branch_id, o.timeslot_id, o.customer_name, o.status,
           o.created_at, o.updated_at
    FROM orders o
    JOIN timeslots t ON t.id = o.timeslot_id AND t.branch_id = o.branch_id
    WHERE o.branch_id = $1 AND t.service_date = $2
    ORDER BY t.start_time, t.id, o.created_at, o.id
";

const TIMETABLE: &str = r"
    SELECT t.id AS timeslot_id, t.start_time, t.end_time, t.capacity, t.reserved, t.is_active,
           o.id AS order_id, o.customer_name, o.status AS order_status,
           o.created_at AS order_created_at
    FROM timeslots t
    LEFT JOIN orders o
        ON o.timeslot_id = t.id
       AND o.branch_id = t.branch_id
       AND o.status = 'created'
    WHERE t.branch_id = $1 AND t.service_date = $2
    ORDER BY t.start_time, t.id, o.created_at, o.id
";

impl BookingQuery for PostgresBookingStore {
    fn list_branches(&self) -> StoreFuture<'_, Vec<Branch>> {
        Box::pin(async move {
            let records = sqlx::query(&format!("SELECT {BRANCH_COLUMNS} FROM branches ORDER BY id"))
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_failure("Failed to list branches", &e))?;

            records.iter().map(rows::branch).collect()
        })
    }

    fn list_timeslots(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Timeslot>> {
        Box::pin(async move {
            let records = sqlx::query(&format!(
                "SELECT {TIMESLOT_COLUMNS} FROM timeslots \
                 WHERE branch_id = $1 AND service_date = $2 \
                 ORDER BY start_time, id"
            ))
            .bind(branch_id.get())
            .bind(date.date())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_failure("Failed to list timeslots", &e))?;

            records.iter().map(rows::timeslot).collect()
        })
    }

    fn list_orders(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Order>> {
        Box::pin(async move {
            let records = sqlx::query(LIST_ORDERS)
                .bind(branch_id.get())
                .bind(date.date())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_failure("Failed to list orders", &e))?;

            records.iter().map(rows::order).collect()
        })
    }
}

impl TimetableQuery for PostgresBookingStore {
    fn orders_timetable(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<TimetableItem>> {
        Box::pin(async move {
            let records = sqlx::query(TIMETABLE)
                .bind(branch_id.get())
                .bind(date.date())
                .fetch_all(&self.pool)
                .await
                .map_err(|e| store_failure("Failed to load timetable", &e))?;

            let joined = records
                .iter()
                .map(rows::timetable_row)
                .collect::<Result<Vec<_>>>()?;

            tracing::debug!(%branch_id, %date, rows = joined.len(), "Timetable rows loaded");
            Ok(group_rows(joined))
        })
    }
}
