// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::NaiveDate;
use kakeibo::application::DashboardService;
use kakeibo::config::DashboardConfig;
use tempfile::TempDir;

/// Seed balance used by most scenarios.
pub const SEED: i64 = 757_232;

/// A temporary data directory that month files can be written into.
pub struct DataDir {
    pub dir: TempDir,
}

impl DataDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Write `contents` as the file for `month` (e.g. "2025-03").
    pub fn write_month(&self, month: &str, contents: &str) -> Result<()> {
        std::fs::write(self.dir.path().join(format!("{}.toml", month)), contents)?;
        Ok(())
    }

    /// Service reading this directory with the Tokyo time zone.
    pub fn service(&self, seed_balance: i64) -> DashboardService {
        DashboardService::new(
            DashboardConfig::default()
                .with_data_dir(self.dir.path())
                .with_seed_balance(seed_balance),
        )
    }
}

/// Helper to create a service over an empty temporary data directory
pub fn test_service() -> Result<(DashboardService, DataDir)> {
    let data = DataDir::new()?;
    let service = data.service(SEED);
    Ok((service, data))
}

/// Helper to parse a date string into NaiveDate
pub fn parse_date(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap()
}

/// Render one `[[expenses]]` entry.
pub fn expense(amount: i64, at: &str, cat: &str) -> String {
    format!("[[expenses]]\namount = {}\nat = {}\ncat = \"{}\"\n\n", amount, at, cat)
}

/// Render one `[[income]]` entry.
pub fn income(amount: i64, at: &str, cat: &str) -> String {
    format!("[[income]]\namount = {}\nat = {}\ncat = \"{}\"\n\n", amount, at, cat)
}

/// Assemble a month file, adding empty arrays for missing sections.
pub fn month_file(expenses: &[String], income: &[String]) -> String {
    let mut out = String::new();
    if expenses.is_empty() {
        out.push_str("expenses = []\n");
    }
    if income.is_empty() {
        out.push_str("income = []\n");
    }
    out.push('\n');
    for entry in expenses.iter().chain(income) {
        out.push_str(entry);
    }
    out
}
