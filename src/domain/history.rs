use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;
use std::collections::HashMap;

use super::{AmountOverflow, TransactionBatch, Yen};

/// Net signed amount per calendar day. Days without activity have no entry.
pub type DailyNetDelta = HashMap<NaiveDate, Yen>;

/// Balance at the end of a day that had activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalancePoint {
    pub day: NaiveDate,
    /// Start of `day` in the configured time zone.
    pub at: DateTime<FixedOffset>,
    pub balance: Yen,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceHistory {
    pub seed_balance: Yen,
    pub current_balance: Yen,
    /// Strictly ascending by day.
    pub points: Vec<BalancePoint>,
}

impl BalanceHistory {
    /// Balance in effect at the end of `day`. Between points the previous
    /// balance holds; before the first point it is the seed.
    pub fn balance_on(&self, day: NaiveDate) -> Yen {
        let idx = self.points.partition_point(|p| p.day <= day);
        if idx == 0 {
            self.seed_balance
        } else {
            self.points[idx - 1].balance
        }
    }

    /// Points whose day lies within the inclusive range.
    pub fn range(&self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> &[BalancePoint] {
        let start = from.map_or(0, |from| self.points.partition_point(|p| p.day < from));
        let end = to.map_or(self.points.len(), |to| {
            self.points.partition_point(|p| p.day <= to)
        });
        if start >= end {
            &[]
        } else {
            &self.points[start..end]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Sum signed transaction amounts per calendar day in `tz`.
pub fn aggregate<'a, I>(batches: I, tz: &Tz) -> Result<DailyNetDelta, AmountOverflow>
where
    I: IntoIterator<Item = &'a TransactionBatch>,
{
    let mut deltas = DailyNetDelta::new();

    for batch in batches {
        for transaction in batch.transactions() {
            let day = transaction.occurred_at().day_in(tz);
            let delta = deltas.entry(day).or_insert(0);
            *delta = delta
                .checked_add(transaction.signed_amount())
                .ok_or(AmountOverflow)?;
        }
    }

    Ok(deltas)
}

/// Running sum over the days in chronological order, starting at `seed_balance`.
pub fn fold(
    deltas: &DailyNetDelta,
    seed_balance: Yen,
    tz: &Tz,
) -> Result<BalanceHistory, AmountOverflow> {
    let mut days: Vec<(NaiveDate, Yen)> = deltas.iter().map(|(day, delta)| (*day, *delta)).collect();
    days.sort_unstable_by_key(|(day, _)| *day);

    let mut balance = seed_balance;
    let mut points = Vec::with_capacity(days.len());

    for (day, delta) in days {
        balance = balance.checked_add(delta).ok_or(AmountOverflow)?;
        points.push(BalancePoint {
            day,
            at: start_of_day(day, tz),
            balance,
        });
    }

    Ok(BalanceHistory {
        seed_balance,
        current_balance: balance,
        points,
    })
}

/// Aggregate then fold.
pub fn compute_balance_history<'a, I>(
    batches: I,
    seed_balance: Yen,
    tz: &Tz,
) -> Result<BalanceHistory, AmountOverflow>
where
    I: IntoIterator<Item = &'a TransactionBatch>,
{
    fold(&aggregate(batches, tz)?, seed_balance, tz)
}

/// First instant of `day` in `tz`.
pub fn start_of_day(day: NaiveDate, tz: &Tz) -> DateTime<FixedOffset> {
    let midnight = day.and_time(NaiveTime::MIN);

    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) => dt.fixed_offset(),
        LocalResult::Ambiguous(earliest, _) => earliest.fixed_offset(),
        // Midnight falls in a DST gap; the day starts at the first wall-clock
        // hour that exists.
        LocalResult::None => (1..24)
            .filter_map(|hour| day.and_hms_opt(hour, 0, 0))
            .find_map(|local| tz.from_local_datetime(&local).earliest())
            .map(|dt| dt.fixed_offset())
            .unwrap_or_else(|| tz.from_utc_datetime(&midnight).fixed_offset()),
    }
}
