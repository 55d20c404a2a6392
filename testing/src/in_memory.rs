//! In-memory booking store for fast, deterministic testing.
//!
//! Implements every store trait from `slotbook-core` with the same observable
//! semantics as the Postgres store:
//!
//! - The engine's write path holds the store's write lock for the whole unit of
//!   work, which serializes all creates and cancels (a stronger guarantee than
//!   per-row locking, with the same outcome for callers).
//! - Changes are staged and only applied after every check has passed, so a
//!   rejected or failed attempt leaves no trace.
//! - Lock acquisition honors [`EngineOptions::lock_timeout`] and the whole unit
//!   of work honors [`EngineOptions::transaction_timeout`].
//!
//! Fault injection hooks ([`InMemoryBookingStore::fail_next_commit`],
//! [`InMemoryBookingStore::stall_writes`], [`InMemoryBookingStore::overwrite_reserved`],
//! [`InMemoryBookingStore::remove_timeslot`]) let tests drive the failure branches.

use slotbook_core::environment::{Clock, SystemClock};
use slotbook_core::telemetry::{EngineOperation, record_outcome};
use slotbook_core::{
    BookingError, BookingQuery, BookingStore, Branch, BranchId, CustomerName, EngineOptions,
    NewTimeslot, Order, OrderId, OrderStatus, ReservationEngine, Result, ServiceDate,
    StoreFuture, Timeslot, TimeslotId, TimetableItem, TimetableOrder, TimetableQuery,
    TimetableRow, TimetableTimeslot, group_rows, within_deadline,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{RwLock, RwLockWriteGuard};

#[derive(Debug, Default)]
struct State {
    branches: BTreeMap<BranchId, Branch>,
    timeslots: BTreeMap<TimeslotId, Timeslot>,
    orders: BTreeMap<OrderId, Order>,
    last_branch_id: i64,
    last_timeslot_id: i64,
    last_order_id: i64,
}

impl State {
    fn slot_in_branch(&self, branch_id: BranchId, timeslot_id: TimeslotId) -> Option<&Timeslot> {
        self.timeslots
            .get(&timeslot_id)
            .filter(|slot| slot.branch_id == branch_id)
    }

    fn slots_of_day(&self, branch_id: BranchId, date: ServiceDate) -> Vec<&Timeslot> {
        let mut slots: Vec<&Timeslot> = self
            .timeslots
            .values()
            .filter(|slot| slot.branch_id == branch_id && slot.service_date == date)
            .collect();
        slots.sort_by_key(|slot| (slot.start_time, slot.id));
        slots
    }

    fn orders_of_slot(&self, slot: &Timeslot) -> Vec<&Order> {
        let mut orders: Vec<&Order> = self
            .orders
            .values()
            .filter(|order| order.timeslot_id == slot.id && order.branch_id == slot.branch_id)
            .collect();
        orders.sort_by_key(|order| (order.created_at, order.id));
        orders
    }
}

/// In-memory implementation of [`BookingStore`].
///
/// Cloning is cheap and clones share the same data.
///
/// # Example
///
/// ```
/// use slotbook_testing::InMemoryBookingStore;
/// use slotbook_core::{CustomerName, NewTimeslot, ReservationEngine, ServiceDate};
/// use chrono::NaiveTime;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryBookingStore::new();
/// let branch = store.create_branch("Siam").await?;
/// let slot = store
///     .create_timeslot(NewTimeslot::new(
///         branch.id,
///         ServiceDate::parse("2025-03-01")?,
///         NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
///         NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
///         2,
///     ))
///     .await?;
///
/// let order = store
///     .create_reserved_order(branch.id, slot.id, CustomerName::parse("Ada")?)
///     .await?;
/// assert_eq!(store.timeslot(slot.id).await.map(|s| s.reserved), Some(1));
/// # let _ = order;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryBookingStore {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
    options: EngineOptions,
    fail_next_commit: Arc<AtomicBool>,
}

impl Default for InMemoryBookingStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryBookingStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBookingStore")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl InMemoryBookingStore {
    /// Create an empty store using the system clock and default engine options.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock: Arc::new(SystemClock),
            options: EngineOptions::default(),
            fail_next_commit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Use the given clock for `created_at`/`updated_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Override the transaction boundary settings.
    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    // ------------------------------------------------------------------
    // Administrative seeding
    // ------------------------------------------------------------------

    /// Insert a branch.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] for a blank name.
    pub async fn create_branch(&self, name: &str) -> Result<Branch> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BookingError::invalid("branch name must not be empty"));
        }

        let mut state = self.state.write().await;
        state.last_branch_id += 1;
        let branch = Branch {
            id: BranchId::from_raw(state.last_branch_id),
            name: name.to_string(),
            created_at: self.clock.now(),
        };
        state.branches.insert(branch.id, branch.clone());
        Ok(branch)
    }

    /// Insert a timeslot with `reserved = 0`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidArgument`] if the slot is invalid or the
    /// branch does not exist.
    pub async fn create_timeslot(&self, new: NewTimeslot) -> Result<Timeslot> {
        new.validate()?;

        let mut state = self.state.write().await;
        if !state.branches.contains_key(&new.branch_id) {
            return Err(BookingError::invalid(format!(
                "branch {} does not exist",
                new.branch_id
            )));
        }

        state.last_timeslot_id += 1;
        let now = self.clock.now();
        let slot = Timeslot {
            id: TimeslotId::from_raw(state.last_timeslot_id),
            branch_id: new.branch_id,
            service_date: new.service_date,
            start_time: new.start_time,
            end_time: new.end_time,
            capacity: new.capacity,
            reserved: 0,
            is_active: new.is_active,
            created_at: now,
            updated_at: now,
        };
        state.timeslots.insert(slot.id, slot.clone());
        Ok(slot)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Current committed state of a timeslot.
    pub async fn timeslot(&self, timeslot_id: TimeslotId) -> Option<Timeslot> {
        self.state.read().await.timeslots.get(&timeslot_id).cloned()
    }

    /// Current committed state of an order.
    pub async fn order(&self, order_id: OrderId) -> Option<Order> {
        self.state.read().await.orders.get(&order_id).cloned()
    }

    /// Number of `created` orders referencing a timeslot.
    pub async fn active_order_count(&self, timeslot_id: TimeslotId) -> usize {
        self.state
            .read()
            .await
            .orders
            .values()
            .filter(|order| order.timeslot_id == timeslot_id && order.is_active())
            .count()
    }

    /// Total number of orders in any status.
    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }

    // ------------------------------------------------------------------
    // Fault injection
    // ------------------------------------------------------------------

    /// Make the next engine unit of work fail at its commit point.
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Hold the write lock for `duration`, as a long-running transaction would.
    pub async fn stall_writes(&self, duration: Duration) {
        let _guard = self.state.write().await;
        tokio::time::sleep(duration).await;
    }

    /// Force a timeslot's `reserved` counter, bypassing the engine.
    ///
    /// Returns `false` if the timeslot does not exist.
    pub async fn overwrite_reserved(&self, timeslot_id: TimeslotId, reserved: u32) -> bool {
        let mut state = self.state.write().await;
        state
            .timeslots
            .get_mut(&timeslot_id)
            .map(|slot| slot.reserved = reserved)
            .is_some()
    }

    /// Delete a timeslot, leaving its orders dangling.
    ///
    /// Returns the removed timeslot, if any.
    pub async fn remove_timeslot(&self, timeslot_id: TimeslotId) -> Option<Timeslot> {
        self.state.write().await.timeslots.remove(&timeslot_id)
    }

    // ------------------------------------------------------------------
    // Engine internals
    // ------------------------------------------------------------------

    async fn lock_for_write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        tokio::time::timeout(self.options.lock_timeout, self.state.write())
            .await
            .map_err(|_| {
                BookingError::StoreFailure(format!(
                    "lock wait timed out after {:?}",
                    self.options.lock_timeout
                ))
            })
    }

    fn commit_point(&self) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(BookingError::StoreFailure(
                "injected failure at commit".to_string(),
            ));
        }
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, customer_name))]
    async fn reserve(
        &self,
        branch_id: BranchId,
        timeslot_id: TimeslotId,
        customer_name: CustomerName,
    ) -> Result<Order> {
        let mut state = self.lock_for_write().await?;

        let mut slot = state
            .slot_in_branch(branch_id, timeslot_id)
            .cloned()
            .ok_or(BookingError::TimeslotNotFound {
                branch_id,
                timeslot_id,
            })?;
        slot.check_bookable()?;

        let now = self.clock.now();
        slot.reserved += 1;
        slot.updated_at = now;

        let order = Order {
            id: OrderId::from_raw(state.last_order_id + 1),
            branch_id,
            timeslot_id,
            customer_name: customer_name.into_inner(),
            status: OrderStatus::Created,
            created_at: now,
            updated_at: now,
        };

        self.commit_point()?;

        state.last_order_id += 1;
        state.timeslots.insert(slot.id, slot);
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    async fn release(&self, order_id: OrderId) -> Result<Order> {
        let mut state = self.lock_for_write().await?;

        let mut order = state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or(BookingError::OrderNotFound(order_id))?;
        if order.status != OrderStatus::Created {
            return Err(BookingError::OrderNotCancellable {
                order_id,
                status: order.status,
            });
        }

        let mut slot = state
            .slot_in_branch(order.branch_id, order.timeslot_id)
            .cloned()
            .ok_or_else(|| {
                BookingError::InconsistentState(format!(
                    "order {order_id} references missing timeslot {}",
                    order.timeslot_id
                ))
            })?;
        if slot.reserved == 0 {
            return Err(BookingError::InconsistentState(format!(
                "timeslot {} has no reserved seat to release for order {order_id}",
                slot.id
            )));
        }

        let now = self.clock.now();
        order.status = OrderStatus::Cancelled;
        order.updated_at = now;
        slot.reserved -= 1;
        slot.updated_at = now;

        self.commit_point()?;

        state.timeslots.insert(slot.id, slot);
        state.orders.insert(order.id, order.clone());
        Ok(order)
    }
}

impl ReservationEngine for InMemoryBookingStore {
    fn create_reserved_order(
        &self,
        branch_id: BranchId,
        timeslot_id: TimeslotId,
        customer_name: CustomerName,
    ) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let started = Instant::now();
            let operation = EngineOperation::Create;
            let result = within_deadline(
                self.options.transaction_timeout,
                operation.as_str(),
                self.reserve(branch_id, timeslot_id, customer_name),
            )
            .await;
            record_outcome(operation, started, &result);
            result
        })
    }

    fn cancel_reserved_order(&self, order_id: OrderId) -> StoreFuture<'_, Order> {
        Box::pin(async move {
            let started = Instant::now();
            let operation = EngineOperation::Cancel;
            let result = within_deadline(
                self.options.transaction_timeout,
                operation.as_str(),
                self.release(order_id),
            )
            .await;
            record_outcome(operation, started, &result);
            result
        })
    }
}

impl BookingQuery for InMemoryBookingStore {
    fn list_branches(&self) -> StoreFuture<'_, Vec<Branch>> {
        Box::pin(async move { Ok(self.state.read().await.branches.values().cloned().collect()) })
    }

    fn list_timeslots(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Timeslot>> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .slots_of_day(branch_id, date)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    fn list_orders(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<Order>> {
        Box::pin(async move {
            let state = self.state.read().await;
            Ok(state
                .slots_of_day(branch_id, date)
                .into_iter()
                .flat_map(|slot| state.orders_of_slot(slot))
                .cloned()
                .collect())
        })
    }
}

impl TimetableQuery for InMemoryBookingStore {
    fn orders_timetable(&self, branch_id: BranchId, date: ServiceDate) -> StoreFuture<'_, Vec<TimetableItem>> {
        Box::pin(async move {
            let state = self.state.read().await;
            let mut rows = Vec::new();

            for slot in state.slots_of_day(branch_id, date) {
                let summary = TimetableTimeslot::from(slot);
                let active: Vec<&Order> = state
                    .orders_of_slot(slot)
                    .into_iter()
                    .filter(|order| order.is_active())
                    .collect();

                if active.is_empty() {
                    rows.push(TimetableRow { timeslot: summary, order: None });
                    continue;
                }

                rows.extend(active.into_iter().map(|order| TimetableRow {
                    timeslot: summary.clone(),
                    order: Some(TimetableOrder {
                        id: order.id,
                        customer_name: order.customer_name.clone(),
                        status: order.status,
                        created_at: order.created_at,
                    }),
                }));
            }

            Ok(group_rows(rows))
        })
    }
}

impl BookingStore for InMemoryBookingStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async { Ok(()) })
    }
}
