//! DuckDB repository implementation
//!
//! Connections come from an r2d2 pool. Uniqueness and foreign keys are
//! enforced by the schema; conflicting concurrent writes are serialized by
//! DuckDB's MVCC and retried here with backoff.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, DuckdbConnectionManager, OptionalExt};
use r2d2::{Pool, PooledConnection};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::DatabaseSettings;
use crate::domain::{Error, Result, Transaction, User, UserHandle};
use crate::ports::{TransactionRepository, UserRepository};
use crate::services::{MigrationResult, MigrationService};

/// Maximum attempts for opening the database or applying one write
const MAX_RETRIES: u32 = 6;

/// Initial retry delay in milliseconds (doubles each retry: 25, 50, 100, 200, 400ms)
const INITIAL_RETRY_DELAY_MS: u64 = 25;

/// Timestamp layout written to TIMESTAMP columns
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Check if an error message indicates a lock or write conflict that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    if is_unique_violation(err_msg) {
        return false;
    }
    let lower = err_msg.to_lowercase();
    // Concurrent writers
    lower.contains("write-write conflict")
        || lower.contains("transaction conflict")
        || lower.contains("conflict on")
        // File locks held by another process
        || lower.contains("could not set lock")
        || lower.contains("database is locked")
        || lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        || lower.contains("resource temporarily unavailable")
        || lower.contains("file is already open")
}

/// Check if an error message reports a UNIQUE or PRIMARY KEY violation
fn is_unique_violation(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    lower.contains("duplicate key")
        || lower.contains("duplicated key")
        || lower.contains("unique constraint")
}

/// Backoff delay for a retry attempt, with up to 50% jitter
fn retry_delay(attempt: u32) -> Duration {
    let base = INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt);
    let jitter = rand::thread_rng().gen_range(0..=base / 2);
    Duration::from_millis(base + jitter)
}

/// DuckDB-backed user and transaction storage
pub struct DuckDbRepository {
    pool: Pool<DuckdbConnectionManager>,
}

impl DuckDbRepository {
    /// Open (or create) a database file
    ///
    /// Retries with exponential backoff while another process holds the
    /// file lock.
    pub fn new(db_path: &Path, settings: &DatabaseSettings) -> anyhow::Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_pool(Some(db_path), settings) {
                Ok(pool) => {
                    return Ok(Self { pool });
                }
                Err(e) => {
                    let err_msg = format!("{:#}", e);
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay = retry_delay(attempt);
                        warn!(
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "database busy, retrying open"
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow!("Failed to open database after {} retries", MAX_RETRIES)))
    }

    /// Open a private in-memory database shared by all pooled connections
    pub fn in_memory(settings: &DatabaseSettings) -> anyhow::Result<Self> {
        Ok(Self {
            pool: Self::try_open_pool(None, settings)?,
        })
    }

    fn try_open_pool(
        db_path: Option<&Path>,
        settings: &DatabaseSettings,
    ) -> anyhow::Result<Pool<DuckdbConnectionManager>> {
        // Extension autoloading stays off; nothing here needs extensions
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        let manager = match db_path {
            Some(path) => DuckdbConnectionManager::file_with_flags(path, config)
                .with_context(|| format!("Failed to open database {}", path.display()))?,
            None => DuckdbConnectionManager::memory_with_flags(config)
                .context("Failed to open in-memory database")?,
        };

        let pool = Pool::builder()
            .max_size(settings.pool_size)
            .connection_timeout(Duration::from_millis(settings.connection_timeout_ms))
            .build(manager)
            .context("Failed to build connection pool")?;
        Ok(pool)
    }

    /// Run database migrations
    pub fn run_migrations(&self) -> anyhow::Result<MigrationResult> {
        let conn = self.pool.get().context("Failed to get connection for migrations")?;
        MigrationService::new(&conn).run_pending()
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> anyhow::Result<()> {
        self.run_migrations()?;
        Ok(())
    }

    fn connection(&self) -> Result<PooledConnection<DuckdbConnectionManager>> {
        self.pool.get().map_err(|e| {
            warn!(error = %e, "connection pool checkout failed");
            Error::from(e)
        })
    }

    /// Run a single-statement write, retrying engine-reported conflicts
    ///
    /// Each attempt checks out its own connection, so a retry never reuses
    /// an aborted transaction.
    fn write_with_retry<T>(
        &self,
        operation: &str,
        mut write: impl FnMut(&Connection) -> duckdb::Result<T>,
    ) -> Result<T> {
        let mut attempt = 0;
        loop {
            let conn = self.connection()?;
            match write(&*conn) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        drop(conn);
                        let delay = retry_delay(attempt);
                        warn!(
                            operation,
                            delay_ms = delay.as_millis() as u64,
                            attempt = attempt + 1,
                            max = MAX_RETRIES,
                            error = %err_msg,
                            "write conflict, retrying"
                        );
                        thread::sleep(delay);
                        attempt += 1;
                        continue;
                    }
                    return Err(Error::from(e));
                }
            }
        }
    }

    /// Number of registered users
    pub fn count_users(&self) -> Result<i64> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Number of stored transactions across all owners
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.connection()?;
        let count = conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl UserRepository for DuckDbRepository {
    fn insert_user(&self, username: &str, secret_hash: &str) -> Result<User> {
        let inserted = self.write_with_retry("insert_user", |conn| {
            conn.query_row(
                "INSERT INTO users (username, secret_hash) VALUES (?, ?) RETURNING user_id",
                params![username, secret_hash],
                |row| row.get::<_, i64>(0),
            )
        });

        match inserted {
            Ok(id) => Ok(User::new(UserHandle::from_raw(id), username, secret_hash)),
            Err(Error::Persistence(msg)) if is_unique_violation(&msg) => {
                Err(Error::DuplicateIdentity(username.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    fn find_user(&self, username: &str) -> Result<Option<User>> {
        let conn = self.connection()?;
        let user = conn
            .query_row(
                "SELECT user_id, username, secret_hash FROM users WHERE username = ?",
                params![username],
                |row| {
                    Ok(User::new(
                        UserHandle::from_raw(row.get(0)?),
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;
        Ok(user)
    }
}

impl TransactionRepository for DuckDbRepository {
    fn insert_transaction(
        &self,
        owner: &UserHandle,
        description: &str,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction> {
        let stored_amount = amount
            .to_f64()
            .ok_or_else(|| Error::invalid_input(format!("amount {} is out of range", amount)))?;
        let stored_at = format_timestamp(&created_at);

        let id = self.write_with_retry("insert_transaction", |conn| {
            conn.query_row(
                "INSERT INTO transactions (user_id, description, amount, created_at)
                 VALUES (?, ?, ?, CAST(? AS TIMESTAMP))
                 RETURNING transaction_id",
                params![owner.raw(), description, stored_amount, stored_at],
                |row| row.get::<_, i64>(0),
            )
        })?;

        // Materialize through the same conversions list_transactions uses
        Ok(Transaction {
            id,
            owner: *owner,
            description: description.to_string(),
            amount: decimal_from_stored(stored_amount)?,
            created_at: parse_timestamp(&stored_at)?,
        })
    }

    fn list_transactions(&self, owner: &UserHandle) -> Result<Vec<Transaction>> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT transaction_id, description, amount, created_at::VARCHAR
             FROM transactions
             WHERE user_id = ?
             ORDER BY transaction_id",
        )?;

        let rows = stmt
            .query_map(params![owner.raw()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<duckdb::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(id, description, amount, created_at)| {
                Ok(Transaction {
                    id,
                    owner: *owner,
                    description,
                    amount: decimal_from_stored(amount)?,
                    created_at: parse_timestamp(&created_at)?,
                })
            })
            .collect()
    }
}

// Helper functions

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::persistence(format!("unreadable timestamp {:?}: {}", s, e)))
}

fn decimal_from_stored(amount: f64) -> Result<Decimal> {
    Decimal::try_from(amount)
        .map_err(|e| Error::persistence(format!("unreadable amount {}: {}", amount, e)))
}
