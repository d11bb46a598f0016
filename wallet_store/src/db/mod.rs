//! Database module providing PostgreSQL connection pooling and utilities.
//!
//! [`Database`] is the connection gateway: every statement the repositories
//! issue goes through a connection or transaction it hands out, wrapped in its
//! per-call timeout.

use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::future::Future;
use std::time::{Duration, Instant};

pub mod config;
pub mod errors;
pub mod repository;
pub mod schema;
pub mod timeouts;

pub use config::{ConfigError, DatabaseConfig};
pub use errors::{StoreError, StoreResult};
pub use repository::{TransactionRepository, WalletRepository};

/// Pooled connection, returned to the pool when dropped
pub type ScopedConnection = PoolConnection<Postgres>;

/// Pooled connection inside an open transaction.
///
/// `commit()` must be called explicitly; dropping it on any other path rolls
/// the transaction back before the connection goes back to the pool.
pub type ScopedTransaction = Transaction<'static, Postgres>;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
    query_timeout: Duration,
}

impl Database {
    /// Create a new database connection pool
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Returns
    ///
    /// * `StoreResult<Database>` - Database instance or error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wallet_store::db::{Database, DatabaseConfig};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let config = DatabaseConfig::from_env()?;
    ///     let db = Database::new(&config).await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn new(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        log::info!(
            "Database pool ready (max_connections={}, query_timeout={}s)",
            config.max_connections,
            config.query_timeout_secs
        );

        Ok(Self::from_pool(pool, config.query_timeout()))
    }

    /// Wrap an existing pool.
    ///
    /// This is the injection point for tests and for applications that manage
    /// their own pool.
    pub fn from_pool(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    /// Check out a connection for reads.
    ///
    /// Waiting for a free connection counts against the per-call timeout.
    pub async fn acquire_read(&self) -> StoreResult<ScopedConnection> {
        timeouts::with_timeout(self.query_timeout, self.pool.acquire()).await
    }

    /// Check out a connection and open a read-write transaction on it.
    pub async fn begin_write(&self) -> StoreResult<ScopedTransaction> {
        timeouts::with_timeout(self.query_timeout, self.pool.begin()).await
    }

    /// Run one store round trip under the per-call timeout.
    ///
    /// `label` names the statement group in debug and slow-query logs.
    pub async fn timed<F, T>(&self, label: &str, future: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let start = Instant::now();
        let result = timeouts::with_timeout(self.query_timeout, future).await;
        let elapsed = start.elapsed();

        if elapsed >= timeouts::SLOW_QUERY_THRESHOLD {
            log::warn!("Slow database operation {label}: {}ms", elapsed.as_millis());
        } else {
            log::debug!("Database operation {label}: {}ms", elapsed.as_millis());
        }

        if let Err(e) = &result {
            log::debug!("Database operation {label} failed: {e}");
        }

        result
    }

    /// Check if the database connection is healthy
    ///
    /// # Returns
    ///
    /// * `StoreResult<()>` - Ok if healthy, error otherwise
    pub async fn health_check(&self) -> StoreResult<()> {
        self.timed("health_check", sqlx::query("SELECT 1").execute(&self.pool))
            .await?;
        Ok(())
    }

    /// Close the database connection pool
    pub async fn close(self) {
        self.pool.close().await;
    }
}
