use thiserror::Error;

use crate::domain::TransactionBatch;

/// Why a month's file was rejected. The whole month is dropped either way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{month}: not valid TOML: {message}")]
    Syntax { month: String, message: String },

    #[error("{month}: does not match the transaction schema: {message}")]
    Schema { month: String, message: String },
}

impl ValidationError {
    /// Label of the month that failed.
    pub fn month(&self) -> &str {
        match self {
            ValidationError::Syntax { month, .. } | ValidationError::Schema { month, .. } => month,
        }
    }
}

/// Check already-parsed content against the batch schema.
///
/// The table must hold exactly `expenses` and `income`. Any unknown key,
/// missing field, wrong type or negative amount rejects the whole batch.
pub fn validate(month: &str, raw: toml::Value) -> Result<TransactionBatch, ValidationError> {
    // Datetimes only keep their TOML type on the text path.
    let text = toml::to_string(&raw).map_err(|e| schema_error(month, e.to_string()))?;
    check_schema(month, &text)
}

/// Parse raw month text and validate it.
pub fn parse_month(month: &str, text: &str) -> Result<TransactionBatch, ValidationError> {
    text.parse::<toml::Table>()
        .map_err(|e: toml::de::Error| ValidationError::Syntax {
            month: month.to_string(),
            message: e.message().to_string(),
        })?;

    check_schema(month, text)
}

fn check_schema(month: &str, text: &str) -> Result<TransactionBatch, ValidationError> {
    let batch: TransactionBatch =
        toml::from_str(text).map_err(|e: toml::de::Error| schema_error(month, e.message()))?;

    if let Err(e) = batch.total_expense().and(batch.total_income()) {
        return Err(schema_error(month, e.to_string()));
    }

    Ok(batch)
}

fn schema_error(month: &str, message: impl Into<String>) -> ValidationError {
    ValidationError::Schema {
        month: month.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Category, Moment};

    const VALID: &str = r#"
        [[expenses]]
        desc = "家賃 3月分"
        amount = 80000
        at = 2025-03-01
        cat = "家賃"

        [[expenses]]
        amount = 1200
        at = 2025-03-03T12:30:00+09:00
        deffered = 2025-04-10
        cat = "食費"

        [[income]]
        desc = "3月給与"
        amount = 250000
        at = 2025-03-25
        cat = "給与"
    "#;

    fn schema_message(result: Result<TransactionBatch, ValidationError>) -> String {
        match result {
            Err(ValidationError::Schema { message, .. }) => message,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_batch() {
        let batch = parse_month("2025-03", VALID).unwrap();

        assert_eq!(batch.expenses.len(), 2);
        assert_eq!(batch.income.len(), 1);
        assert_eq!(batch.expenses[0].description.as_deref(), Some("家賃 3月分"));
        assert_eq!(batch.expenses[0].category, Category::Rent);
        assert_eq!(batch.expenses[1].description, None);
        assert_eq!(
            batch.expenses[1].deferred_to,
            Some(Moment::Date(NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()))
        );
        assert_eq!(batch.income[0].amount, 250000);
    }

    #[test]
    fn test_empty_arrays_are_valid() {
        let batch = parse_month("2025-05", "expenses = []\nincome = []").unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_deferred_spelling_is_an_unknown_field() {
        let text = r#"
            income = []
            [[expenses]]
            amount = 100
            at = 2025-03-01
            deferred = 2025-04-01
            cat = "家電"
        "#;
        let message = schema_message(parse_month("2025-03", text));
        assert!(message.contains("unknown field"), "{}", message);
    }

    #[test]
    fn test_unknown_top_level_field_rejects_batch() {
        let text = format!("{}\nnote = \"hello\"", "expenses = []\nincome = []");
        let message = schema_message(parse_month("2025-03", &text));
        assert!(message.contains("unknown field"), "{}", message);
    }

    #[test]
    fn test_unknown_field_in_one_row_rejects_whole_batch() {
        let text = format!(
            "{}\n[[income]]\namount = 1\nat = 2025-03-02\ncat = \"利子\"\nbank = \"x\"\n",
            VALID
        );
        let message = schema_message(parse_month("2025-03", &text));
        assert!(message.contains("unknown field"), "{}", message);
    }

    #[test]
    fn test_income_cannot_be_deferred() {
        let text = r#"
            expenses = []
            [[income]]
            amount = 100
            at = 2025-03-01
            deffered = 2025-04-01
            cat = "給与"
        "#;
        assert!(matches!(
            parse_month("2025-03", text),
            Err(ValidationError::Schema { .. })
        ));
    }

    #[test]
    fn test_missing_section_rejects_batch() {
        let message = schema_message(parse_month("2025-03", "expenses = []"));
        assert!(message.contains("income"), "{}", message);
    }

    #[test]
    fn test_missing_required_field() {
        let text = r#"
            income = []
            [[expenses]]
            amount = 100
            cat = "食費"
        "#;
        let message = schema_message(parse_month("2025-03", text));
        assert!(message.contains("at"), "{}", message);
    }

    #[test]
    fn test_negative_amount_rejects_batch() {
        let text = r#"
            income = []
            [[expenses]]
            amount = -100
            at = 2025-03-01
            cat = "食費"
        "#;
        let message = schema_message(parse_month("2025-03", text));
        assert!(message.contains("non-negative"), "{}", message);
    }

    #[test]
    fn test_wrong_types_reject_batch() {
        for row in [
            "amount = 1.5\nat = 2025-03-01\ncat = \"食費\"",
            "amount = \"100\"\nat = 2025-03-01\ncat = \"食費\"",
            "amount = 100\nat = 2025-03-01\ncat = \"雑費\"",
            "amount = 100\nat = 2025-03-01\ncat = \"食費\"\ndesc = 5",
        ] {
            let text = format!("income = []\n[[expenses]]\n{}\n", row);
            assert!(
                matches!(parse_month("2025-03", &text), Err(ValidationError::Schema { .. })),
                "accepted: {}",
                row
            );
        }
    }

    #[test]
    fn test_syntax_error() {
        let err = parse_month("2025-03", "expenses = [").unwrap_err();
        assert!(matches!(err, ValidationError::Syntax { .. }));
        assert_eq!(err.month(), "2025-03");
        assert!(err.to_string().starts_with("2025-03:"));
    }

    #[test]
    fn test_validate_parsed_table_keeps_dates() {
        let raw = toml::Value::Table(VALID.parse().unwrap());

        let batch = validate("2025-03", raw).unwrap();

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.expenses[0].occurred_at,
            Moment::Date(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap())
        );
    }

    #[test]
    fn test_totals_overflowing_yen_reject_batch() {
        let text = r#"
            expenses = []
            [[income]]
            amount = 9223372036854775807
            at = 2025-03-01
            cat = "給与"

            [[income]]
            amount = 1
            at = 2025-03-02
            cat = "利子"
        "#;
        let message = schema_message(parse_month("2025-03", text));
        assert!(message.contains("exceeds"), "{}", message);
    }

    #[test]
    fn test_max_amount_alone_is_valid() {
        let text = "expenses = []\n[[income]]\namount = 9223372036854775807\nat = 2025-03-01\ncat = \"給与\"\n";
        let batch = parse_month("2025-03", text).unwrap();
        assert_eq!(batch.total_income(), Ok(i64::MAX));
    }

    #[test]
    fn test_validate_rejects_non_table() {
        let raw = toml::Value::Array(vec![]);
        assert!(validate("2025-03", raw).is_err());
    }
}
