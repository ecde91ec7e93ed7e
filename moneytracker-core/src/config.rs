//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "database": { "file": "moneytracker.duckdb", "poolSize": 8, "connectionTimeoutMs": 5000 },
//!   "hashing": { "timeCost": 3, "memoryCost": 65536, "parallelism": 4 },
//!   "logging": { "level": "warn" }
//! }
//! ```
//! Every section and field is optional.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::HashingParams;
use crate::services::SecretHasher;

/// Name of the settings file inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Database connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file, relative to the data directory unless absolute
    pub file: String,
    /// Maximum pooled connections
    pub pool_size: u32,
    /// How long a call waits for a free connection before failing
    pub connection_timeout_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            file: "moneytracker.duckdb".to_string(),
            pool_size: 8,
            connection_timeout_ms: 5000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// `tracing` filter directive, e.g. `info` or `moneytracker_core=debug`
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// moneytracker configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub database: DatabaseSettings,
    pub hashing: HashingParams,
    pub logging: LoggingSettings,
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing settings file yields defaults. Environment variables win
    /// over the file:
    /// - `MONEYTRACKER_DB_FILE`
    /// - `MONEYTRACKER_HASH_TIME_COST`
    /// - `MONEYTRACKER_HASH_MEMORY_COST`
    /// - `MONEYTRACKER_LOG`
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut config: Config = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("Failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid settings in {}", settings_path.display()))?
        } else {
            Config::default()
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(file) = lookup("MONEYTRACKER_DB_FILE") {
            self.database.file = file;
        }
        if let Some(value) = lookup("MONEYTRACKER_HASH_TIME_COST") {
            self.hashing.time_cost = value
                .parse()
                .with_context(|| format!("MONEYTRACKER_HASH_TIME_COST: not a number: {}", value))?;
        }
        if let Some(value) = lookup("MONEYTRACKER_HASH_MEMORY_COST") {
            self.hashing.memory_cost = value.parse().with_context(|| {
                format!("MONEYTRACKER_HASH_MEMORY_COST: not a number: {}", value)
            })?;
        }
        if let Some(level) = lookup("MONEYTRACKER_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Reject settings that would fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.database.file.trim().is_empty() {
            bail!("database.file must not be empty");
        }
        if self.database.pool_size == 0 {
            bail!("database.poolSize must be at least 1");
        }
        if self.database.connection_timeout_ms == 0 {
            bail!("database.connectionTimeoutMs must be at least 1");
        }
        SecretHasher::new(&self.hashing).context("Invalid hashing settings")?;
        Ok(())
    }

    /// Resolve the database file against the data directory
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        let file = Path::new(&self.database.file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            data_dir.join(file)
        }
    }
}
