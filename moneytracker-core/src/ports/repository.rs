//! Repository ports - persistence abstraction
//!
//! The credential and ledger stores depend only on these traits. Every
//! method is a single persistence round-trip and must be all-or-nothing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::{Result, Transaction, User, UserHandle};

/// Storage for user identity records
pub trait UserRepository: Send + Sync {
    /// Insert a new user
    ///
    /// Must fail with `Error::DuplicateIdentity` when the username is taken,
    /// leaving the existing record untouched. The uniqueness check and the
    /// insert are one atomic step.
    fn insert_user(&self, username: &str, secret_hash: &str) -> Result<User>;

    /// Look up a user by exact username
    fn find_user(&self, username: &str) -> Result<Option<User>>;
}

/// Storage for transaction records
pub trait TransactionRepository: Send + Sync {
    /// Insert a transaction for `owner` and return the stored row
    ///
    /// The identifier is assigned by the repository.
    fn insert_transaction(
        &self,
        owner: &UserHandle,
        description: &str,
        amount: Decimal,
        created_at: DateTime<Utc>,
    ) -> Result<Transaction>;

    /// All transactions owned by `owner`, in insertion order
    fn list_transactions(&self, owner: &UserHandle) -> Result<Vec<Transaction>>;
}
