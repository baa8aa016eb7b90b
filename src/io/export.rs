use anyhow::Result;
use std::io::Write;

use crate::application::{DashboardService, TransactionEntry, TransactionFilter};
use crate::domain::{BalanceHistory, BalancePoint};

/// Exporter for writing dashboard data to CSV or JSON
pub struct Exporter<'a> {
    service: &'a DashboardService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a DashboardService) -> Self {
        Self { service }
    }

    /// Export balance points to CSV format
    pub async fn export_history_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.service.get_balance_history().await?;
        write_history_csv(&report.history.points, writer)
    }

    /// Export the balance history, seed and current balance included, as JSON
    pub async fn export_history_json<W: Write>(&self, writer: W) -> Result<usize> {
        let report = self.service.get_balance_history().await?;
        write_history_json(&report.history, writer)?;
        Ok(report.history.points.len())
    }

    /// Export every accepted transaction to CSV format
    pub async fn export_transactions_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let listing = self
            .service
            .list_transactions(TransactionFilter::default())
            .await?;
        write_transactions_csv(&listing.entries, writer)
    }

    /// Export every accepted transaction as JSON
    pub async fn export_transactions_json<W: Write>(&self, writer: W) -> Result<usize> {
        let listing = self
            .service
            .list_transactions(TransactionFilter::default())
            .await?;
        write_json(&listing.entries, writer)?;
        Ok(listing.entries.len())
    }
}

/// Write one `date,at,balance` row per point.
pub fn write_history_csv<W: Write>(points: &[BalancePoint], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["date", "at", "balance"])?;

    for point in points {
        csv_writer.write_record(&[
            point.day.to_string(),
            point.at.to_rfc3339(),
            point.balance.to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(points.len())
}

pub fn write_history_json<W: Write>(history: &BalanceHistory, writer: W) -> Result<()> {
    write_json(history, writer)
}

/// Write one row per transaction. Category is written as its ASCII key.
pub fn write_transactions_csv<W: Write>(entries: &[TransactionEntry], writer: W) -> Result<usize> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(["month", "date", "kind", "category", "amount", "description"])?;

    for entry in entries {
        let transaction = &entry.transaction;
        csv_writer.write_record(&[
            entry.month.to_string(),
            entry.day.to_string(),
            transaction.kind().to_string(),
            transaction.category().key().to_string(),
            transaction.amount().to_string(),
            transaction.description().unwrap_or_default().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(entries.len())
}

fn write_json<T: serde::Serialize + ?Sized, W: Write>(value: &T, mut writer: W) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}
