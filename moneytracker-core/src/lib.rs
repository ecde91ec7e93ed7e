//! MoneyTracker Core - Per-user transaction ledger behind password authentication
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities (User, Credentials, Transaction) and errors
//! - **ports**: Trait definitions for the user and transaction stores
//! - **services**: Credential store, ledger store and the ownership gate
//! - **adapters**: Concrete implementations (DuckDB)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;
pub mod migrations;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use adapters::duckdb::DuckDbRepository;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{Credentials, NewTransaction, Transaction, User, UserHandle};
pub use domain::result::{Error, ErrorKind, OperationResult};
pub use services::{IdentityClaim, OwnershipGate};

/// Main context for MoneyTracker operations
///
/// Holds the connection pool, configuration and the services wired on top
/// of it. All state lives in the database, so a context can be shared
/// freely between threads.
pub struct MoneyTrackerContext {
    pub config: Config,
    pub repository: Arc<DuckDbRepository>,
    pub credentials: Arc<CredentialStore>,
    pub ledger: Arc<LedgerStore>,
    pub gate: OwnershipGate,
}

impl MoneyTrackerContext {
    /// Create a context from the settings in `data_dir`
    pub fn new(data_dir: &Path) -> Result<Self> {
        let config = Config::load(data_dir)?;
        Self::with_config(data_dir, config)
    }

    /// Create a context with an explicit configuration
    pub fn with_config(data_dir: &Path, config: Config) -> Result<Self> {
        config.validate()?;

        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create {}", data_dir.display()))?;

        let db_path = config.database_path(data_dir);
        debug!(path = %db_path.display(), "opening database");
        let repository = Arc::new(DuckDbRepository::new(&db_path, &config.database)?);

        // Initialize schema
        repository.ensure_schema()?;

        Self::assemble(config, repository)
    }

    /// Create a context backed by an in-memory database
    pub fn in_memory(config: Config) -> Result<Self> {
        config.validate()?;
        let repository = Arc::new(DuckDbRepository::in_memory(&config.database)?);
        repository.ensure_schema()?;
        Self::assemble(config, repository)
    }

    fn assemble(config: Config, repository: Arc<DuckDbRepository>) -> Result<Self> {
        let credentials = Arc::new(
            CredentialStore::new(repository.clone(), &config.hashing)
                .context("Failed to initialize credential store")?,
        );
        let ledger = Arc::new(LedgerStore::new(repository.clone()));
        let gate = OwnershipGate::new(Arc::clone(&credentials), Arc::clone(&ledger));

        Ok(Self {
            config,
            repository,
            credentials,
            ledger,
            gate,
        })
    }
}
