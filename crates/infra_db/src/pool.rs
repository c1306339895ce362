//! Database connection pool management
//!
//! This module provides connection pool configuration and creation for
//! SQLite using SQLx. The store is a single-writer design: the default pool
//! holds one connection, so every unit of work is serialized.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::error::DatabaseError;

/// Type alias for the SQLite connection pool
pub type DatabasePool = SqlitePool;

/// URL of a private in-memory store
pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// Configuration options for the database connection pool
///
/// # Example
///
/// ```rust
/// use infra_db::DatabaseConfig;
/// use std::time::Duration;
///
/// let config = DatabaseConfig::new("sqlite://police_violations.db")
///     .max_connections(1)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite connection string
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Time to wait for a pooled connection
    pub connect_timeout: Duration,
    /// Time SQLite waits on a locked database before failing
    pub busy_timeout: Duration,
    /// Maximum lifetime of a connection; `None` keeps it forever
    pub max_lifetime: Option<Duration>,
    /// Idle timeout before closing a connection; `None` never closes it
    pub idle_timeout: Option<Duration>,
}

impl DatabaseConfig {
    /// Creates a new database configuration with the given connection URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            max_lifetime: Some(Duration::from_secs(30 * 60)),
            idle_timeout: Some(Duration::from_secs(10 * 60)),
        }
    }

    /// Configuration for a private in-memory store
    ///
    /// The store lives as long as its single connection, so the connection
    /// is never recycled.
    pub fn in_memory() -> Self {
        Self {
            max_lifetime: None,
            idle_timeout: None,
            ..Self::new(IN_MEMORY_URL)
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn max_lifetime(mut self, lifetime: Option<Duration>) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Whether the URL names an in-memory store
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new("sqlite://police_violations.db")
    }
}

/// Creates a database connection pool with the given configuration
///
/// Foreign keys are enforced on every connection and file-backed stores use
/// the WAL journal. In-memory stores are pinned to a single connection since
/// each connection would otherwise see its own empty database.
///
/// # Errors
///
/// Returns `DatabaseError::ConnectionFailed` if the URL is malformed or the
/// store cannot be opened.
pub async fn create_pool(config: DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    let mut options = SqliteConnectOptions::from_str(&config.url)
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(config.busy_timeout);

    let max_connections = if config.is_in_memory() {
        1
    } else {
        options = options.journal_mode(SqliteJournalMode::Wal);
        config.max_connections.max(1)
    };

    info!(
        url = %config.url,
        max_connections,
        "Creating database pool"
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .min_connections(config.min_connections.min(max_connections))
        .acquire_timeout(config.connect_timeout)
        .max_lifetime(config.max_lifetime)
        .idle_timeout(config.idle_timeout)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!("Database pool created successfully");
    Ok(pool)
}

/// Creates a connection pool from a URL string with default settings
pub async fn create_pool_from_url(url: &str) -> Result<DatabasePool, DatabaseError> {
    create_pool(DatabaseConfig::new(url)).await
}
