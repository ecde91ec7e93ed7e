//! List command - show the caller's transactions with a running balance

use std::collections::HashMap;

use anyhow::Result;
use colored::Colorize;
use moneytracker_core::{OperationResult, Transaction};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::Session;
use crate::output;

pub fn run(session: &Session) -> Result<()> {
    let claim = session.claim()?;
    let ctx = session.context()?;
    let transactions = ctx.gate.list_transactions(&claim)?;
    let balance = total(&transactions);

    if session.json {
        let mut context = HashMap::new();
        context.insert("count".to_string(), serde_json::json!(transactions.len()));
        context.insert("balance".to_string(), serde_json::json!(balance.to_f64()));
        let result = OperationResult::ok_with_context(transactions, context);
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if transactions.is_empty() {
        output::info("No transactions yet");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Date", "Description", "Amount", "Balance"]);

    let mut running = Decimal::ZERO;
    for t in &transactions {
        running += t.amount;
        table.add_row(vec![
            t.id.to_string(),
            t.created_at.format("%Y-%m-%d %H:%M").to_string(),
            t.description.clone(),
            output::format_amount(t.amount),
            output::format_amount(running),
        ]);
    }

    println!("{}", table);
    println!();
    println!("{} {}", "Balance:".bold(), output::format_amount(balance));
    Ok(())
}

fn total(transactions: &[Transaction]) -> Decimal {
    transactions.iter().map(|t| t.amount).sum()
}
