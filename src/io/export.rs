use anyhow::Result;
use std::io::Write;

use crate::domain::{Transaction, compute_category_breakdown, compute_daily_flow, format_cents};

/// Exporter for writing ledger data and its aggregates to CSV or JSON
pub struct Exporter<'a> {
    transactions: &'a [Transaction],
}

impl<'a> Exporter<'a> {
    pub fn new(transactions: &'a [Transaction]) -> Self {
        Self { transactions }
    }

    /// Export the ledger to CSV, newest first
    pub fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["id", "date", "type", "category", "description", "amount"])?;

        for tx in self.transactions {
            let date = tx.date.format("%Y-%m-%d").to_string();
            let amount = format_cents(tx.amount);
            csv_writer.write_record([
                tx.id.as_str(),
                date.as_str(),
                tx.transaction_type.as_str(),
                tx.category.label(),
                tx.description.as_str(),
                amount.as_str(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.transactions.len())
    }

    /// Export the per-day income/expense series to CSV
    pub fn export_daily_flow_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let flow = compute_daily_flow(self.transactions);
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["date", "income", "expense"])?;

        for day in &flow {
            csv_writer.write_record([
                day.date.format("%Y-%m-%d").to_string(),
                format_cents(day.income),
                format_cents(day.expense),
            ])?;
        }

        csv_writer.flush()?;
        Ok(flow.len())
    }

    /// Export per-category expense totals to CSV
    pub fn export_categories_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let breakdown = compute_category_breakdown(self.transactions);
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["category", "expense"])?;

        for entry in &breakdown {
            let expense = format_cents(entry.expense);
            csv_writer.write_record([entry.category.label(), expense.as_str()])?;
        }

        csv_writer.flush()?;
        Ok(breakdown.len())
    }

    /// Export the ledger in its stored JSON shape (a restorable backup)
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        serde_json::to_writer_pretty(&mut writer, self.transactions)?;
        writeln!(writer)?;
        Ok(self.transactions.len())
    }
}
