//! `PostgreSQL` storage for the web-novel platform.
//!
//! This crate implements the [`Database`] and [`Transaction`] traits from
//! `webnovel-core` on top of sqlx:
//!
//! - Every transaction runs at `SERIALIZABLE` isolation, so the read-then-write
//!   aggregations (weekly applied-promotion cap, reader-of-prev weekly
//!   dedupe, cash balance checks) cannot interleave
//! - Serialization failures and pool timeouts surface as
//!   [`StoreError::Unavailable`]; unique and check violations as
//!   [`StoreError::Conflict`]
//! - A per-transaction `statement_timeout` carries the request deadline into
//!   the database
//!
//! # Example
//!
//! ```ignore
//! use webnovel_postgres::{PostgresDatabase, PoolSettings};
//! use webnovel_core::store::{Database, Transaction, LedgerStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = PostgresDatabase::connect("postgres://localhost/webnovel", &PoolSettings::default()).await?;
//!     db.migrate().await?;
//!     let mut tx = db.begin().await?;
//!     let balance = tx.balance(user_id).await?;
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod rows;
mod store;

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use webnovel_core::store::{Database, StoreError, StoreResult, Transaction};

pub use error::map_sqlx_error;

/// Connection-pool settings.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// Wait for a free connection before giving up
    pub acquire_timeout: Duration,
    /// Close connections idle longer than this
    pub idle_timeout: Duration,
    /// `statement_timeout` applied inside every transaction
    pub statement_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 2,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            statement_timeout: Duration::from_secs(30),
        }
    }
}

/// Pooled `PostgreSQL` database.
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
    statement_timeout: Duration,
}

impl PostgresDatabase {
    /// Connect a pool.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the first connection fails.
    pub async fn connect(url: &str, settings: &PoolSettings) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .connect(url)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to connect: {e}")))?;

        tracing::info!(
            max_connections = settings.max_connections,
            "PostgreSQL pool connected"
        );

        Ok(Self {
            pool,
            statement_timeout: settings.statement_timeout,
        })
    }

    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    /// Underlying pool, for readiness probes.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if a migration fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Round-trip `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the database cannot be reached.
    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error)
    }
}

impl Database for PostgresDatabase {
    type Tx = PostgresTransaction;

    async fn begin(&self) -> StoreResult<PostgresTransaction> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let timeout_ms = u64::try_from(self.statement_timeout.as_millis()).unwrap_or(u64::MAX);
        sqlx::query(&format!("SET LOCAL statement_timeout = {timeout_ms}"))
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        Ok(PostgresTransaction { tx })
    }
}

/// One `SERIALIZABLE` transaction. Dropping it without
/// [`Transaction::commit`] rolls back.
pub struct PostgresTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

impl Transaction for PostgresTransaction {
    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(|e| {
            metrics::counter!("webnovel_store_commit_failures_total").increment(1);
            map_sqlx_error(e)
        })
    }
}
