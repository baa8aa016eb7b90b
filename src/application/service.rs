use tracing::{debug, info};

use crate::config::DashboardConfig;
use crate::domain::{
    category_breakdown, compute_balance_history, monthly_totals, BalanceHistory, Category,
    DayRange, MonthBatch, MonthLabel, TransactionKind,
};
use crate::io::{load_data_dir, LoadedMonths};

use super::{
    AppError, BalanceReport, CategoryReport, MonthCheck, MonthlyReport, MonthlySummary,
    SkippedMonthSummary, TransactionEntry, TransactionListing,
};

/// Application service for the dashboard.
/// This is the primary interface for any client (CLI, tests).
///
/// Every query reloads the data directory, so edits to month files are
/// picked up without restarting anything.
pub struct DashboardService {
    config: DashboardConfig,
}

/// Filter for listing transactions
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub month: Option<MonthLabel>,
    pub kind: Option<TransactionKind>,
    pub category: Option<Category>,
    pub range: DayRange,
}

impl DashboardService {
    pub fn new(config: DashboardConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Load and validate every month file in the data directory.
    pub async fn load(&self) -> Result<LoadedMonths, AppError> {
        debug!(data_dir = %self.config.data_dir.display(), "Loading months");
        Ok(load_data_dir(&self.config.data_dir).await?)
    }

    /// Balance history over the accepted months.
    pub fn history_of(&self, months: &[MonthBatch]) -> Result<BalanceHistory, AppError> {
        Ok(compute_balance_history(
            months.iter().map(|month| &month.batch),
            self.config.seed_balance,
            &self.config.timezone,
        )?)
    }

    // ========================
    // Balance
    // ========================

    pub async fn get_balance_history(&self) -> Result<BalanceReport, AppError> {
        let loaded = self.load().await?;
        let history = self.history_of(&loaded.accepted)?;

        info!(
            points = history.points.len(),
            current_balance = history.current_balance,
            "Computed balance history"
        );

        Ok(BalanceReport {
            history,
            months: loaded.accepted.iter().map(|month| month.label).collect(),
            skipped: skipped_summaries(&loaded),
        })
    }

    // ========================
    // Reports
    // ========================

    pub async fn get_category_report(
        &self,
        kind: TransactionKind,
        range: DayRange,
    ) -> Result<CategoryReport, AppError> {
        check_range(&range)?;
        let loaded = self.load().await?;

        let transactions: Vec<_> = loaded
            .accepted
            .iter()
            .flat_map(|month| month.batch.transactions())
            .collect();
        let breakdown = category_breakdown(&transactions, kind, range, &self.config.timezone)?;

        Ok(CategoryReport {
            range,
            breakdown,
            skipped: skipped_summaries(&loaded),
        })
    }

    pub async fn get_monthly_report(&self) -> Result<MonthlyReport, AppError> {
        let loaded = self.load().await?;
        let history = self.history_of(&loaded.accepted)?;

        let months = monthly_totals(&loaded.accepted)?
            .into_iter()
            .map(|totals| {
                let closing_balance = totals
                    .month
                    .last_day()
                    .map_or(history.current_balance, |day| history.balance_on(day));
                MonthlySummary {
                    totals,
                    closing_balance,
                }
            })
            .collect();

        Ok(MonthlyReport {
            seed_balance: self.config.seed_balance,
            months,
            skipped: skipped_summaries(&loaded),
        })
    }

    // ========================
    // Transactions
    // ========================

    /// Transactions matching `filter`, ordered by local day then month file order.
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<TransactionListing, AppError> {
        check_range(&filter.range)?;
        let loaded = self.load().await?;

        if let Some(month) = filter.month {
            let known = loaded.accepted.iter().any(|m| m.label == month)
                || loaded.skipped.iter().any(|m| m.label == month);
            if !known {
                return Err(AppError::MonthNotFound(month.to_string()));
            }
        }

        let tz = &self.config.timezone;
        let mut entries: Vec<TransactionEntry> = loaded
            .accepted
            .iter()
            .filter(|month| filter.month.is_none_or(|wanted| month.label == wanted))
            .flat_map(|month| {
                month.batch.transactions().map(move |transaction| TransactionEntry {
                    month: month.label,
                    day: transaction.occurred_at().day_in(tz),
                    transaction,
                })
            })
            .filter(|entry| {
                filter.kind.is_none_or(|kind| entry.transaction.kind() == kind)
                    && filter
                        .category
                        .is_none_or(|category| entry.transaction.category() == category)
                    && filter.range.contains(entry.day)
            })
            .collect();

        // Stable sort keeps file order within a day.
        entries.sort_by_key(|entry| entry.day);

        Ok(TransactionListing {
            entries,
            skipped: skipped_summaries(&loaded),
        })
    }

    // ========================
    // Validation
    // ========================

    /// One entry per month file, valid or not, oldest first.
    pub async fn check_months(&self) -> Result<Vec<MonthCheck>, AppError> {
        let loaded = self.load().await?;

        let mut checks: Vec<MonthCheck> = loaded
            .accepted
            .iter()
            .map(|month| MonthCheck {
                month: month.label,
                transaction_count: month.batch.len(),
                error: None,
            })
            .chain(loaded.skipped.iter().map(|skipped| MonthCheck {
                month: skipped.label,
                transaction_count: 0,
                error: Some(skipped.error.to_string()),
            }))
            .collect();
        checks.sort_by_key(|check| check.month);

        Ok(checks)
    }
}

fn skipped_summaries(loaded: &LoadedMonths) -> Vec<SkippedMonthSummary> {
    loaded.skipped.iter().map(SkippedMonthSummary::from).collect()
}

fn check_range(range: &DayRange) -> Result<(), AppError> {
    match (range.from, range.to) {
        (Some(from), Some(to)) if from > to => Err(AppError::InvalidRange { from, to }),
        _ => Ok(()),
    }
}

/// Inclusive day range covering `month`.
pub fn month_range(month: MonthLabel) -> DayRange {
    DayRange::new(month.first_day(), month.last_day())
}
