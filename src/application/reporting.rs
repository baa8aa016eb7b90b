use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{
    BalanceHistory, CategoryBreakdown, DayRange, MonthLabel, MonthTotals, Transaction, Yen,
};
use crate::io::SkippedMonth;

/// A month left out of a report, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedMonthSummary {
    pub month: MonthLabel,
    pub reason: String,
}

impl From<&SkippedMonth> for SkippedMonthSummary {
    fn from(skipped: &SkippedMonth) -> Self {
        Self {
            month: skipped.label,
            reason: skipped.error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceReport {
    pub history: BalanceHistory,
    /// Months that contributed to the history.
    pub months: Vec<MonthLabel>,
    pub skipped: Vec<SkippedMonthSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryReport {
    pub range: DayRange,
    pub breakdown: CategoryBreakdown,
    pub skipped: Vec<SkippedMonthSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    #[serde(flatten)]
    pub totals: MonthTotals,
    /// Balance at the end of the month's last day.
    pub closing_balance: Yen,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub seed_balance: Yen,
    pub months: Vec<MonthlySummary>,
    pub skipped: Vec<SkippedMonthSummary>,
}

/// One transaction with the month file it came from and its local day.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionEntry {
    pub month: MonthLabel,
    pub day: NaiveDate,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListing {
    pub entries: Vec<TransactionEntry>,
    pub skipped: Vec<SkippedMonthSummary>,
}

/// Validation outcome for one month file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthCheck {
    pub month: MonthLabel,
    pub transaction_count: usize,
    pub error: Option<String>,
}

impl MonthCheck {
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }
}
