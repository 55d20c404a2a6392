//! `PostgreSQL` booking store for Slotbook.
//!
//! Implements the store traits from `slotbook-core` on top of a `sqlx`
//! connection pool:
//!
//! - The reservation engine runs every create/cancel in one transaction and
//!   serializes competing writers with `SELECT ... FOR UPDATE` on the affected rows
//! - Each transaction sets a local `lock_timeout` and runs under an overall
//!   deadline, so a stuck writer turns into a retryable store failure
//! - Read paths are single statements, each seeing one consistent snapshot
//!
//! # Example
//!
//! ```ignore
//! use slotbook_postgres::{PoolSettings, PostgresBookingStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresBookingStore::connect(
//!         "postgres://localhost/slotbook",
//!         &PoolSettings::default(),
//!     )
//!     .await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod admin;
mod engine;
mod errors;
mod queries;
mod rows;

use slotbook_core::{BookingError, BookingStore, EngineOptions, Result, StoreFuture};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;

use crate::errors::store_failure;

/// Connection pool sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on open connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long to wait for a connection before giving up
    pub connect_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            connect_timeout: Duration::from_secs(30),
        }
    }
}

/// `PostgreSQL`-backed booking store.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone, Debug)]
pub struct PostgresBookingStore {
    pool: PgPool,
    options: EngineOptions,
}

impl PostgresBookingStore {
    /// Wrap an existing pool with default engine options.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            options: EngineOptions::default(),
        }
    }

    /// Open a pool against `database_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::StoreFailure`] if the database is unreachable.
    pub async fn connect(database_url: &str, settings: &PoolSettings) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.connect_timeout)
            .connect(database_url)
            .await
            .map_err(|e| store_failure("Failed to connect", &e))?;

        tracing::info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "Database pool ready"
        );

        Ok(Self::from_pool(pool))
    }

    /// Override the transaction boundary settings.
    #[must_use]
    pub const fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the bundled schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::StoreFailure`] if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BookingError::StoreFailure(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Begin an engine transaction with the configured row-lock timeout.
    async fn begin_unit(&self) -> Result<Transaction<'static, Postgres>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_failure("Failed to start transaction", &e))?;

        let lock_timeout = format!("{}ms", self.options.lock_timeout.as_millis());
        sqlx::query("SELECT set_config('lock_timeout', $1, true)")
            .bind(lock_timeout)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_failure("Failed to set lock timeout", &e))?;

        Ok(tx)
    }

    /// Commit on success, roll back on failure.
    async fn finish_unit<T>(tx: Transaction<'static, Postgres>, result: Result<T>) -> Result<T> {
        match result {
            Ok(value) => {
                tx.commit()
                    .await
                    .map_err(|e| store_failure("Failed to commit transaction", &e))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    // The connection is discarded either way; nothing was committed.
                    tracing::debug!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl BookingStore for PostgresBookingStore {
    fn ping(&self) -> StoreFuture<'_, ()> {
        Box::pin(async move {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(|e| store_failure("Database ping failed", &e))?;
            Ok(())
        })
    }
}
