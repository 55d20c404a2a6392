//! Configuration management for the Slotbook server.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use slotbook_core::EngineOptions;
use slotbook_postgres::PoolSettings;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while turning configuration into runtime values.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A host/port pair does not form a socket address.
    #[error("Invalid listen address {0}")]
    InvalidAddress(String),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// `PostgreSQL` configuration
    pub postgres: PostgresConfig,
    /// Reservation engine transaction boundary
    pub engine: EngineConfig,
    /// HTTP server configuration
    pub server: ServerConfig,
}

/// `PostgreSQL` configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    /// `PostgreSQL` connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of idle connections in the pool
    pub min_connections: u32,
    /// Connection timeout in seconds
    pub connect_timeout: u64,
    /// Apply bundled migrations at startup
    pub run_migrations: bool,
}

/// Reservation engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Deadline for one create/cancel unit of work, in milliseconds
    pub transaction_timeout_ms: u64,
    /// Row-lock wait limit inside the transaction, in milliseconds
    pub lock_timeout_ms: u64,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<String>,
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Comma-separated list, trimmed, empty entries dropped.
fn list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Connection URL assembled from the discrete `DB_*` variables.
fn url_from_parts() -> String {
    format!(
        "postgres://{user}:{password}@{host}:{port}/{name}?sslmode={sslmode}",
        user = string("DB_USER", "go_backend_api"),
        password = string("DB_PASSWORD", "go_backend_api"),
        host = string("DB_HOST", "localhost"),
        port = string("DB_PORT", "5432"),
        name = string("DB_NAME", "go_backend_api_db"),
        sslmode = string("DB_SSLMODE", "disable"),
    )
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unset or unparsable values fall back to their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            postgres: PostgresConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| url_from_parts()),
                max_connections: parsed("DATABASE_MAX_CONNECTIONS", 10),
                min_connections: parsed("DATABASE_MIN_CONNECTIONS", 2),
                connect_timeout: parsed("DATABASE_CONNECT_TIMEOUT", 30),
                run_migrations: parsed("DATABASE_RUN_MIGRATIONS", true),
            },
            engine: EngineConfig {
                transaction_timeout_ms: parsed("ENGINE_TRANSACTION_TIMEOUT_MS", 5_000),
                lock_timeout_ms: parsed("ENGINE_LOCK_TIMEOUT_MS", 2_000),
            },
            server: ServerConfig {
                host: string("HOST", "0.0.0.0"),
                port: parsed("PORT", 8080),
                metrics_host: string("METRICS_HOST", "0.0.0.0"),
                metrics_port: parsed("METRICS_PORT", 9090),
                shutdown_timeout: parsed("SHUTDOWN_TIMEOUT", 30),
                cors_allowed_origins: list(&string(
                    "CORS_ALLOWED_ORIGINS",
                    "http://localhost:5173,http://127.0.0.1:5173",
                )),
            },
        }
    }
}

impl PostgresConfig {
    /// Pool sizing for the store.
    #[must_use]
    pub const fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout: Duration::from_secs(self.connect_timeout),
        }
    }
}

impl EngineConfig {
    /// Transaction boundary for the store.
    #[must_use]
    pub const fn options(&self) -> EngineOptions {
        EngineOptions {
            transaction_timeout: Duration::from_millis(self.transaction_timeout_ms),
            lock_timeout: Duration::from_millis(self.lock_timeout_ms),
        }
    }
}

impl ServerConfig {
    /// Address the HTTP API listens on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if host and port do not parse.
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(&self.host, self.port)
    }

    /// Address the Prometheus exporter listens on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if host and port do not parse.
    pub fn metrics_addr(&self) -> Result<SocketAddr, ConfigError> {
        socket_addr(&self.metrics_host, self.metrics_port)
    }
}

fn socket_addr(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let raw = format!("{host}:{port}");
    raw.parse().map_err(|_| ConfigError::InvalidAddress(raw))
}
