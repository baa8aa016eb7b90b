use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;

use super::{checked_sum, AmountOverflow, Category, MonthBatch, MonthLabel, Transaction, TransactionKind, Yen};

/// Inclusive range of calendar days; an open end matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DayRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        Self { from, to }
    }

    pub fn all() -> Self {
        Self::default()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.is_none_or(|from| day >= from) && self.to.is_none_or(|to| day <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: Category,
    pub total: Yen,
    pub count: usize,
    /// Share of the breakdown total, 0.0 to 100.0.
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryBreakdown {
    pub kind: TransactionKind,
    pub total: Yen,
    /// Largest total first.
    pub categories: Vec<CategoryShare>,
}

/// Totals per category for one side of the ledger.
pub fn category_breakdown<'a, I>(
    transactions: I,
    kind: TransactionKind,
    range: DayRange,
    tz: &Tz,
) -> Result<CategoryBreakdown, AmountOverflow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<Category, (Yen, usize)> = HashMap::new();

    for transaction in transactions {
        if transaction.kind() != kind || !range.contains(transaction.occurred_at().day_in(tz)) {
            continue;
        }
        let entry = totals.entry(transaction.category()).or_insert((0, 0));
        entry.0 = entry.0.checked_add(transaction.amount()).ok_or(AmountOverflow)?;
        entry.1 += 1;
    }

    let total = checked_sum(totals.values().map(|(sum, _)| *sum))?;

    let mut categories: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, (sum, count))| CategoryShare {
            category,
            total: sum,
            count,
            percentage: if total > 0 {
                sum as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect();
    categories.sort_by(|a, b| b.total.cmp(&a.total).then(a.category.cmp(&b.category)));

    Ok(CategoryBreakdown {
        kind,
        total,
        categories,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub month: MonthLabel,
    pub income: Yen,
    pub expense: Yen,
    pub net: Yen,
    pub transaction_count: usize,
}

/// Income, expense and net per month, in the order given.
pub fn monthly_totals(months: &[MonthBatch]) -> Result<Vec<MonthTotals>, AmountOverflow> {
    months
        .iter()
        .map(|month| {
            let income = month.batch.total_income()?;
            let expense = month.batch.total_expense()?;
            Ok(MonthTotals {
                month: month.label,
                income,
                expense,
                // Both totals are non-negative, so this cannot overflow.
                net: income - expense,
                transaction_count: month.batch.len(),
            })
        })
        .collect()
}
