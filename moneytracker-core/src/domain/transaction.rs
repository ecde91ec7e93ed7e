//! Transaction domain model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};
use super::user::UserHandle;

/// A single financial entry owned by one user
///
/// Negative amounts are debits, positive amounts credits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: i64,
    /// Owner reference; never leaves the process
    #[serde(skip)]
    pub owner: UserHandle,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Assigned by the ledger store at insertion
    #[serde(rename = "date")]
    pub created_at: DateTime<Utc>,
}

/// Inbound payload for adding a transaction
///
/// Only the description and amount are accepted from callers; any `id` or
/// `date` fields in a decoded payload are dropped.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    #[serde(default)]
    pub description: String,
    pub amount: f64,
}

impl NewTransaction {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }

    /// Convert the wire amount into a decimal, rejecting NaN and infinities
    pub fn decimal_amount(&self) -> Result<Decimal> {
        parse_amount(self.amount)
    }
}

/// Validate a floating point amount and convert it into a [`Decimal`]
///
/// Amounts must be finite and within `±Decimal::MAX`. Up to 28 fractional
/// digits are kept; a nonzero amount smaller than that step is rejected
/// rather than recorded as zero.
pub fn parse_amount(amount: f64) -> Result<Decimal> {
    if !amount.is_finite() {
        return Err(Error::invalid_input(format!(
            "amount must be a finite number, got {}",
            amount
        )));
    }
    let decimal = Decimal::try_from(amount).map_err(|_| {
        Error::invalid_input(format!(
            "amount {} is out of range (limit is ±{})",
            amount,
            Decimal::MAX
        ))
    })?;
    if decimal.is_zero() && amount != 0.0 {
        return Err(Error::invalid_input(format!(
            "amount {} is too small to record (smallest step is 1e-28)",
            amount
        )));
    }
    Ok(decimal)
}
