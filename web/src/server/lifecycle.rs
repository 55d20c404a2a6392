//! Process lifecycle: wire the store, bind, serve until a shutdown signal.

use super::routes::build_router;
use super::state::AppState;
use crate::config::Config;
use slotbook_postgres::PostgresBookingStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// A fully wired server, ready to run.
pub struct Application {
    config: Config,
    store: PostgresBookingStore,
    listener: TcpListener,
}

impl Application {
    /// Connect to the database, apply migrations if configured, and bind the listener.
    ///
    /// # Errors
    ///
    /// Returns an error if the database is unreachable, a migration fails or
    /// the listen address cannot be bound.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let store = PostgresBookingStore::connect(
            &config.postgres.url,
            &config.postgres.pool_settings(),
        )
        .await?
        .with_options(config.engine.options());

        if config.postgres.run_migrations {
            store.migrate().await?;
            info!("Database migrations applied");
        }

        let addr = config.server.listen_addr()?;
        let listener = TcpListener::bind(addr).await?;

        Ok(Self {
            config,
            store,
            listener,
        })
    }

    /// Serve requests until Ctrl+C or SIGTERM, then drain and close the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP server fails.
    pub async fn run(self) -> anyhow::Result<()> {
        let address = self.listener.local_addr()?;
        let pool = self.store.pool().clone();
        let state = AppState::new(Arc::new(self.store));
        let app = build_router(state, &self.config.server.cors_allowed_origins);

        info!(%address, "HTTP server listening for requests");
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("HTTP server stopped, closing database pool");
        let grace = Duration::from_secs(self.config.server.shutdown_timeout);
        if tokio::time::timeout(grace, pool.close()).await.is_err() {
            warn!(timeout_secs = grace.as_secs(), "Database pool close timed out");
        }

        info!("Graceful shutdown complete");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
///
/// Returns when the process receives SIGINT (Ctrl+C) or SIGTERM.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        () = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}
