use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::AmountOverflow;
use crate::io::LoadError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Month not found: {0}")]
    MonthNotFound(String),

    #[error("Totals across months overflow: {0}")]
    Overflow(#[from] AmountOverflow),

    #[error("Invalid date range: {from} is after {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },
}
