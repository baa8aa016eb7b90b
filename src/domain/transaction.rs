use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use toml::value::{Datetime, Offset};

use super::{checked_sum, AmountOverflow, Category, Yen};

/// When a transaction happened, as written in the month file.
///
/// TOML has three flavours of date literal and all of them are accepted:
/// a local date, a local date-time (wall clock in the configured zone)
/// and an offset date-time (an absolute instant).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "Datetime")]
pub enum Moment {
    Date(NaiveDate),
    Local(NaiveDateTime),
    Instant(DateTime<FixedOffset>),
}

impl Moment {
    /// Calendar day this moment falls on in `tz`.
    pub fn day_in(&self, tz: &Tz) -> NaiveDate {
        match self {
            Moment::Date(date) => *date,
            Moment::Local(local) => local.date(),
            Moment::Instant(instant) => instant.with_timezone(tz).date_naive(),
        }
    }
}

impl From<NaiveDate> for Moment {
    fn from(date: NaiveDate) -> Self {
        Moment::Date(date)
    }
}

impl TryFrom<Datetime> for Moment {
    type Error = String;

    fn try_from(value: Datetime) -> Result<Self, Self::Error> {
        let date = value
            .date
            .ok_or_else(|| format!("'{}' is a time without a date", value))?;
        let date = NaiveDate::from_ymd_opt(
            i32::from(date.year),
            u32::from(date.month),
            u32::from(date.day),
        )
        .ok_or_else(|| format!("'{}' is not a calendar date", value))?;

        let Some(time) = value.time else {
            return Ok(Moment::Date(date));
        };

        let time = NaiveTime::from_hms_nano_opt(
            u32::from(time.hour),
            u32::from(time.minute),
            u32::from(time.second),
            time.nanosecond,
        )
        .ok_or_else(|| format!("'{}' has an invalid time of day", value))?;
        let local = date.and_time(time);

        match value.offset {
            None => Ok(Moment::Local(local)),
            Some(Offset::Z) => Ok(Moment::Instant(local.and_utc().fixed_offset())),
            Some(Offset::Custom { minutes }) => {
                let offset = FixedOffset::east_opt(i32::from(minutes) * 60)
                    .ok_or_else(|| format!("'{}' has an invalid UTC offset", value))?;
                offset
                    .from_local_datetime(&local)
                    .single()
                    .map(Moment::Instant)
                    .ok_or_else(|| format!("'{}' is not a valid instant", value))
            }
        }
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Moment::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Moment::Local(local) => write!(f, "{}", local.format("%Y-%m-%dT%H:%M:%S")),
            Moment::Instant(instant) => write!(f, "{}", instant.to_rfc3339()),
        }
    }
}

impl Serialize for Moment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Yen, D::Error> {
    let amount = Yen::deserialize(deserializer)?;
    if amount < 0 {
        return Err(serde::de::Error::custom(format!(
            "amount must be non-negative, got {}",
            amount
        )));
    }
    Ok(amount)
}

/// Money leaving the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expense {
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "non_negative")]
    pub amount: Yen,
    #[serde(rename = "at")]
    pub occurred_at: Moment,
    /// Settlement date for deferred payments. Kept as data only; it does not
    /// move the expense in the balance history.
    #[serde(
        rename = "deffered",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub deferred_to: Option<Moment>,
    #[serde(rename = "cat")]
    pub category: Category,
}

impl Expense {
    /// `amount` is a magnitude; month files are rejected when it is negative.
    pub fn new(amount: Yen, occurred_at: impl Into<Moment>, category: Category) -> Self {
        Self {
            description: None,
            amount,
            occurred_at: occurred_at.into(),
            deferred_to: None,
            category,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_deferred_to(mut self, deferred_to: impl Into<Moment>) -> Self {
        self.deferred_to = Some(deferred_to.into());
        self
    }
}

/// Money entering the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Income {
    #[serde(rename = "desc", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(deserialize_with = "non_negative")]
    pub amount: Yen,
    #[serde(rename = "at")]
    pub occurred_at: Moment,
    #[serde(rename = "cat")]
    pub category: Category,
}

impl Income {
    pub fn new(amount: Yen, occurred_at: impl Into<Moment>, category: Category) -> Self {
        Self {
            description: None,
            amount,
            occurred_at: occurred_at.into(),
            category,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" | "expenses" => Ok(TransactionKind::Expense),
            "income" => Ok(TransactionKind::Income),
            other => Err(format!("unknown transaction kind '{}'", other)),
        }
    }
}

/// Either side of a batch, tagged with its kind so the sign is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Transaction {
    Expense(Expense),
    Income(Income),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Expense(_) => TransactionKind::Expense,
            Transaction::Income(_) => TransactionKind::Income,
        }
    }

    pub fn amount(&self) -> Yen {
        match self {
            Transaction::Expense(e) => e.amount,
            Transaction::Income(i) => i.amount,
        }
    }

    /// Effect on the account balance: negative for expenses.
    pub fn signed_amount(&self) -> Yen {
        match self {
            Transaction::Expense(e) => -e.amount,
            Transaction::Income(i) => i.amount,
        }
    }

    pub fn occurred_at(&self) -> &Moment {
        match self {
            Transaction::Expense(e) => &e.occurred_at,
            Transaction::Income(i) => &i.occurred_at,
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Transaction::Expense(e) => e.category,
            Transaction::Income(i) => i.category,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            Transaction::Expense(e) => e.description.as_deref(),
            Transaction::Income(i) => i.description.as_deref(),
        }
    }
}

/// One month's worth of validated transactions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionBatch {
    pub expenses: Vec<Expense>,
    pub income: Vec<Income>,
}

impl TransactionBatch {
    pub fn new(expenses: Vec<Expense>, income: Vec<Income>) -> Self {
        Self { expenses, income }
    }

    /// Expenses first, then income, each in file order.
    pub fn transactions(&self) -> impl Iterator<Item = Transaction> + '_ {
        self.expenses
            .iter()
            .cloned()
            .map(Transaction::Expense)
            .chain(self.income.iter().cloned().map(Transaction::Income))
    }

    pub fn len(&self) -> usize {
        self.expenses.len() + self.income.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn total_expense(&self) -> Result<Yen, AmountOverflow> {
        checked_sum(self.expenses.iter().map(|e| e.amount))
    }

    pub fn total_income(&self) -> Result<Yen, AmountOverflow> {
        checked_sum(self.income.iter().map(|i| i.amount))
    }
}
