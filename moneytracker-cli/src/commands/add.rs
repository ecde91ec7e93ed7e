//! Add command - record a transaction for the caller

use anyhow::Result;
use moneytracker_core::NewTransaction;

use super::Session;
use crate::output;

pub fn run(session: &Session, amount: f64, description: &str) -> Result<()> {
    let claim = session.claim()?;
    let ctx = session.context()?;
    let transaction = ctx
        .gate
        .add_transaction(&claim, &NewTransaction::new(description, amount))?;

    session.render(transaction, |t| {
        output::success(&format!(
            "Added transaction #{} ({})",
            t.id,
            output::format_amount(t.amount)
        ));
    })
}
