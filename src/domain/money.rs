use std::fmt;

/// Money is represented as whole yen. There is no minor unit to worry about,
/// so amounts are plain signed integers.
pub type Yen = i64;

/// Format an amount with a `,` every three digits.
/// Example: 757532 -> "757,532", -1200 -> "-1,200"
pub fn format_grouped(amount: Yen) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);

    if amount < 0 {
        grouped.push('-');
    }

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

/// Format an amount for display, followed by the currency label.
/// Example: (757532, "円") -> "757,532 円"
pub fn format_amount(amount: Yen, suffix: &str) -> String {
    if suffix.is_empty() {
        format_grouped(amount)
    } else {
        format!("{} {}", format_grouped(amount), suffix)
    }
}

/// Parse a whole-yen amount as typed on the command line.
/// Grouping separators (`,` and `_`) and a trailing `円` are accepted.
/// Example: "757,232" -> 757232, "-500円" -> -500
pub fn parse_amount(input: &str) -> Result<Yen, ParseAmountError> {
    let input = input.trim();
    let input = input.strip_suffix('円').unwrap_or(input).trim_end();

    let (negative, digits) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input),
    };

    let cleaned: String = digits.chars().filter(|c| *c != ',' && *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseAmountError::InvalidFormat);
    }

    let value: Yen = cleaned.parse().map_err(|_| ParseAmountError::OutOfRange)?;
    Ok(if negative { -value } else { value })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseAmountError {
    InvalidFormat,
    OutOfRange,
}

impl fmt::Display for ParseAmountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseAmountError::InvalidFormat => write!(f, "invalid amount format"),
            ParseAmountError::OutOfRange => write!(f, "amount out of range"),
        }
    }
}

impl std::error::Error for ParseAmountError {}

/// A total no longer fits in `Yen`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountOverflow;

impl fmt::Display for AmountOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "amount total exceeds the supported range")
    }
}

impl std::error::Error for AmountOverflow {}

/// Sum amounts, failing instead of wrapping.
pub fn checked_sum<I: IntoIterator<Item = Yen>>(amounts: I) -> Result<Yen, AmountOverflow> {
    amounts
        .into_iter()
        .try_fold(0, |total: Yen, amount| total.checked_add(amount).ok_or(AmountOverflow))
}
