//! Migration service - applies embedded schema migrations
//!
//! Applied migrations are recorded in `sys_migrations`, so running the
//! service again on an up-to-date database is a no-op.

use anyhow::{Context, Result};
use duckdb::Connection;
use tracing::info;

use crate::migrations::MIGRATIONS;

const BOOTSTRAP: &str = "000_migrations.sql";

/// Result of running migrations
#[derive(Debug)]
pub struct MigrationResult {
    /// Names of newly applied migrations
    pub applied: Vec<String>,
    /// Count of migrations that were already applied
    pub already_applied: usize,
}

/// Applies pending migrations over a borrowed connection
pub struct MigrationService<'a> {
    conn: &'a Connection,
}

impl<'a> MigrationService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Apply every migration not yet recorded, in order
    pub fn run_pending(&self) -> Result<MigrationResult> {
        let bootstrapped = !self.migrations_table_exists()?;
        if bootstrapped {
            self.conn
                .execute_batch(bootstrap_sql())
                .context("Failed to create sys_migrations")?;
        }

        let applied_before = self.get_applied()?;
        let mut newly_applied = Vec::new();

        for (name, sql) in MIGRATIONS.iter() {
            if applied_before.iter().any(|applied| applied == name) {
                continue;
            }
            // The bootstrap table already exists; only record it
            if *name != BOOTSTRAP {
                self.conn
                    .execute_batch(sql)
                    .with_context(|| format!("Migration {} failed", name))?;
            }
            self.record_migration(name)?;
            info!(migration = %name, "applied migration");
            newly_applied.push(name.to_string());
        }

        Ok(MigrationResult {
            applied: newly_applied,
            already_applied: applied_before.len(),
        })
    }

    fn migrations_table_exists(&self) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'sys_migrations'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Names of applied migrations, sorted
    pub fn get_applied(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT migration_name FROM sys_migrations ORDER BY migration_name")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<duckdb::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Names of migrations that have not been applied yet
    pub fn get_pending(&self) -> Result<Vec<String>> {
        let applied = self.get_applied()?;
        Ok(MIGRATIONS
            .iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| !applied.contains(name))
            .collect())
    }

    fn record_migration(&self, name: &str) -> Result<()> {
        self.conn
            .execute("INSERT INTO sys_migrations (migration_name) VALUES (?)", [name])?;
        Ok(())
    }
}

fn bootstrap_sql() -> &'static str {
    MIGRATIONS
        .iter()
        .find(|(name, _)| *name == BOOTSTRAP)
        .map(|(_, sql)| *sql)
        .unwrap_or("")
}
