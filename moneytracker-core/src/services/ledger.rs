//! Ledger store - per-user transaction records

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::domain::{parse_amount, Result, Transaction, UserHandle};
use crate::ports::TransactionRepository;

/// Nanoseconds per microsecond; stored timestamps keep microsecond precision
const NANOS_PER_MICRO: u32 = 1_000;

/// Round up to the next whole microsecond
///
/// Rounding down could place the record before the moment of the call.
fn ceil_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let sub_micro = ts.timestamp_subsec_nanos() % NANOS_PER_MICRO;
    if sub_micro == 0 {
        ts
    } else {
        ts + Duration::nanoseconds(i64::from(NANOS_PER_MICRO - sub_micro))
    }
}

/// Creates and lists transactions scoped to one owner
pub struct LedgerStore {
    transactions: Arc<dyn TransactionRepository>,
}

impl LedgerStore {
    pub fn new(transactions: Arc<dyn TransactionRepository>) -> Self {
        Self { transactions }
    }

    /// Record a transaction for `owner`
    ///
    /// The identifier and timestamp are always assigned here. Retrying after a
    /// `Persistence` error may create a second record.
    pub fn add(&self, owner: &UserHandle, description: &str, amount: f64) -> Result<Transaction> {
        let amount = parse_amount(amount)?;
        let created_at = ceil_to_micros(Utc::now());

        let tx = self
            .transactions
            .insert_transaction(owner, description, amount, created_at)?;

        debug!(owner = %owner, transaction_id = tx.id, "added transaction");
        Ok(tx)
    }

    /// All transactions owned by `owner`, oldest first
    pub fn list_by_owner(&self, owner: &UserHandle) -> Result<Vec<Transaction>> {
        self.transactions.list_transactions(owner)
    }
}
