//! Reservation engine: the only writer of `timeslots.reserved` and `orders.status`.
//!
//! Lock order is fixed so two engine transactions can never wait on each other
//! in a cycle: create locks only the timeslot row, cancel locks the order row
//! and then its timeslot row.

use crate::PostgresBookingStore;
use crate::errors::store_failure;
use crate::rows::{self, ORDER_COLUMNS, TIMESLOT_COLUMNS};
use slotbook_core::telemetry::{EngineOperation, record_outcome};
use slotbook_core::{
    BookingError, BranchId, CustomerName, Order, OrderId, OrderStatus, ReservationEngine, Result,
    StoreFuture, TimeslotId, within_deadline,
};
use sqlx::PgConnection;
use std::time::Instant;

impl PostgresBookingStore {
    // The deadline covers begin and the locked work, never COMMIT: an
    // abandoned COMMIT may still have been applied by the server.
    #[tracing::instrument(level = "debug", skip(self, customer_name))]
    async fn reserve(
        &self,
        branch_id: BranchId,
        timeslot_id: TimeslotId,
        customer_name: CustomerName,
    ) -> Result<Order> {
        let (tx, result) = within_deadline(
            self.options.transaction_timeout,
            EngineOperation::Create.as_str(),
            async {
                let mut tx = self.begin_unit().await?;
                let result = reserve_in(&mut tx, branch_id, timeslot_id, &customer_name).await;
                Ok((tx, result))
            },
        )
        .await?;
        Self::finish_unit(tx, result).await
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn release(&self, order_id: OrderId) -> Result<Order> {
        let (tx, result) = within_deadline(
            self.options.transaction_timeout,
            EngineOperation::Cancel.as_str(),
            async {
                let mut tx = self.begin_unit().await?;
                let result = release_in(&mut tx, order_id).await;
                Ok((tx, result))
            },
        )
        .await?;
        Self::finish_unit(tx, result).await
    }
}

async fn reserve_in(
    conn: &mut PgConnection,
    branch_id: BranchId,
    timeslot_id: TimeslotId,
    customer_name: &CustomerName,
) -> Result<Order> {
    let row = sqlx::query(&format!(
        "SELECT {TIMESLOT_COLUMNS} FROM timeslots WHERE id = $1 AND branch_id = $2 FOR UPDATE"
    ))
    .bind(timeslot_id.get())
    .bind(branch_id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to lock timeslot", &e))?
    .ok_or(BookingError::TimeslotNotFound {
        branch_id,
        timeslot_id,
    })?;

    let slot = rows::timeslot(&row)?;
    slot.check_bookable()?;

    sqlx::query("UPDATE timeslots SET reserved = reserved + 1, updated_at = now() WHERE id = $1")
        .bind(timeslot_id.get())
        .execute(&mut *conn)
        .await
        .map_err(|e| store_failure("Failed to reserve seat", &e))?;

    let row = sqlx::query(&format!(
        "INSERT INTO orders (branch_id, timeslot_id, customer_name, status) \
         VALUES ($1, $2, $3, $4) RETURNING {ORDER_COLUMNS}"
    ))
    .bind(branch_id.get())
    .bind(timeslot_id.get())
    .bind(customer_name.as_str())
    .bind(OrderStatus::Created.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to insert order", &e))?;

    rows::order(&row)
}

async fn release_in(conn: &mut PgConnection, order_id: OrderId) -> Result<Order> {
    let row = sqlx::query(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
    ))
    .bind(order_id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to lock order", &e))?
    .ok_or(BookingError::OrderNotFound(order_id))?;

    let order = rows::order(&row)?;
    if order.status != OrderStatus::Created {
        return Err(BookingError::OrderNotCancellable {
            order_id,
            status: order.status,
        });
    }

    let row = sqlx::query(&format!(
        "SELECT {TIMESLOT_COLUMNS} FROM timeslots WHERE id = $1 AND branch_id = $2 FOR UPDATE"
    ))
    .bind(order.timeslot_id.get())
    .bind(order.branch_id.get())
    .fetch_optional(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to lock timeslot", &e))?
    .ok_or_else(|| {
        BookingError::InconsistentState(format!(
            "order {order_id} references missing timeslot {}",
            order.timeslot_id
        ))
    })?;

    let slot = rows::timeslot(&row)?;
    if slot.reserved == 0 {
        return Err(BookingError::InconsistentState(format!(
            "timeslot {} has no reserved seat to release for order {order_id}",
            slot.id
        )));
    }

    let row = sqlx::query(&format!(
        "UPDATE orders SET status = $2, updated_at = now() WHERE id = $1 RETURNING {ORDER_COLUMNS}"
    ))
    .bind(order_id.get())
    .bind(OrderStatus::Cancelled.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to cancel order", &e))?;
    let cancelled = rows::order(&row)?;

    sqlx::query(
        "UPDATE timeslots \
         SET reserved = CASE WHEN reserved > 0 THEN reserved - 1 ELSE 0 END, updated_at = now() \
         WHERE id = $1",
    )
    .bind(slot.id.get())
    .execute(&mut *conn)
    .await
    .map_err(|e| store_failure("Failed to release seat", &e))?;

    Ok(cancelled)
}

impl ReservationEngine for PostgresBookingStore {
    fn create_reserved_order(
        &self,
        branch_id: BranchId,
        timeslot_id: TimeslotId,
        customer_name: CustomerName,
    ) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let started = Instant::now();
            let operation = EngineOperation::Create;
            let result = self.reserve(branch_id, timeslot_id, customer_name).await;
            record_outcome(operation, started, &result);
            result
        })
    }

    fn cancel_reserved_order(&self, order_id: OrderId) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let started = Instant::now();
            let operation = EngineOperation::Cancel;
            let result = self.release(order_id).await;
            record_outcome(operation, started, &result);
            result
        })
    }
}
