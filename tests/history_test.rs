mod common;

use anyhow::Result;
use common::{expense, income, month_file, parse_date, test_service, DataDir, SEED};
use kakeibo::application::AppError;
use kakeibo::io::{load_data_dir, LoadError};
use std::path::Path;

#[tokio::test]
async fn test_two_month_scenario() -> Result<()> {
    let (service, data) = test_service()?;

    data.write_month(
        "2025-03",
        &month_file(
            &[expense(500, "2025-03-01", "食費")],
            &[income(1000, "2025-03-01", "給与")],
        ),
    )?;
    data.write_month(
        "2025-04",
        &month_file(&[expense(200, "2025-04-01", "交通費")], &[]),
    )?;

    let report = service.get_balance_history().await?;
    let history = report.history;

    assert_eq!(history.points.len(), 2);
    assert_eq!(history.points[0].day, parse_date("2025-03-01"));
    assert_eq!(history.points[0].at.to_rfc3339(), "2025-03-01T00:00:00+09:00");
    assert_eq!(history.points[0].balance, 757_732);
    assert_eq!(history.points[1].day, parse_date("2025-04-01"));
    assert_eq!(history.points[1].balance, 757_532);
    assert_eq!(history.current_balance, 757_532);
    assert!(report.skipped.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_month_with_unknown_field_is_skipped() -> Result<()> {
    let (service, data) = test_service()?;

    data.write_month(
        "2025-03",
        &month_file(&[], &[income(1000, "2025-03-01", "給与")]),
    )?;
    data.write_month(
        "2025-04",
        "income = []\n\n[[expenses]]\namount = 1\nat = 2025-04-01\ncat = \"食費\"\nmemo = \"x\"\n",
    )?;

    let report = service.get_balance_history().await?;

    assert_eq!(report.months.len(), 1);
    assert_eq!(report.months[0].to_string(), "2025-03");
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].month.to_string(), "2025-04");
    assert!(report.skipped[0].reason.starts_with("2025-04:"));
    assert!(report.skipped[0].reason.contains("memo"));

    // The rejected month contributes nothing.
    assert_eq!(report.history.points.len(), 1);
    assert_eq!(report.history.current_balance, SEED + 1000);

    Ok(())
}

#[tokio::test]
async fn test_same_day_transactions_collapse_into_one_point() -> Result<()> {
    let (service, data) = test_service()?;

    data.write_month(
        "2025-05",
        &month_file(
            &[expense(100, "2025-05-10T09:00:00+09:00", "食費")],
            &[income(300, "2025-05-10T21:30:00+09:00", "利子")],
        ),
    )?;

    let history = service.get_balance_history().await?.history;

    assert_eq!(history.points.len(), 1);
    assert_eq!(history.points[0].balance - history.seed_balance, 200);

    Ok(())
}

#[tokio::test]
async fn test_empty_data_dir_yields_seed_only() -> Result<()> {
    let (service, _data) = test_service()?;

    let report = service.get_balance_history().await?;

    assert!(report.history.is_empty());
    assert_eq!(report.history.current_balance, SEED);
    assert!(report.months.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_missing_data_dir_is_fatal() -> Result<()> {
    let data = DataDir::new()?;
    let service = kakeibo::DashboardService::new(
        kakeibo::DashboardConfig::default().with_data_dir(data.dir.path().join("missing")),
    );

    let result = service.get_balance_history().await;

    assert!(matches!(
        result,
        Err(AppError::Load(LoadError::DataDirNotFound(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_current_balance_is_seed_plus_net() -> Result<()> {
    let (service, data) = test_service()?;

    data.write_month(
        "2025-01",
        &month_file(
            &[
                expense(82_000, "2025-01-01", "家賃"),
                expense(3_210, "2025-01-14", "食費"),
                expense(990, "2025-01-31T23:59:00+09:00", "娯楽費"),
            ],
            &[
                income(285_000, "2025-01-25", "給与"),
                income(40, "2025-01-31", "利子"),
            ],
        ),
    )?;
    data.write_month(
        "2025-02",
        &month_file(
            &[expense(82_000, "2025-02-01", "家賃")],
            &[income(12_000, "2025-02-14", "売却")],
        ),
    )?;

    let history = service.get_balance_history().await?.history;

    let expected = SEED + 285_000 + 40 + 12_000 - 82_000 - 3_210 - 990 - 82_000;
    assert_eq!(history.current_balance, expected);
    assert_eq!(history.points.last().map(|p| p.balance), Some(expected));

    let days: Vec<_> = history.points.iter().map(|p| p.day).collect();
    let mut sorted = days.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(days, sorted);

    Ok(())
}

#[tokio::test]
async fn test_order_within_day_does_not_matter() -> Result<()> {
    let first = DataDir::new()?;
    first.write_month(
        "2025-03",
        &month_file(
            &[
                expense(100, "2025-03-01", "食費"),
                expense(250, "2025-03-01", "日用品費"),
            ],
            &[income(1_000, "2025-03-01", "給与")],
        ),
    )?;

    let second = DataDir::new()?;
    second.write_month(
        "2025-03",
        &month_file(
            &[
                expense(250, "2025-03-01", "日用品費"),
                expense(100, "2025-03-01", "食費"),
            ],
            &[income(1_000, "2025-03-01", "給与")],
        ),
    )?;

    let a = first.service(SEED).get_balance_history().await?.history;
    let b = second.service(SEED).get_balance_history().await?.history;

    assert_eq!(a.points.len(), 1);
    assert_eq!(a.current_balance, SEED + 650);
    assert_eq!(a, b);

    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_are_identical() -> Result<()> {
    let (service, data) = test_service()?;

    for month in 1..=6 {
        data.write_month(
            &format!("2024-{:02}", month),
            &month_file(
                &[expense(1_000 * month, &format!("2024-{:02}-05", month), "食費")],
                &[income(300_000, &format!("2024-{:02}-25", month), "給与")],
            ),
        )?;
    }

    let first = service.get_balance_history().await?.history;
    let second = service.get_balance_history().await?.history;

    assert_eq!(first.points.len(), 12);
    // 6 * 300_000 income less 21_000 in expenses.
    assert_eq!(first.current_balance, SEED + 1_779_000);
    assert_eq!(first, second);

    Ok(())
}

#[tokio::test]
async fn test_timestamps_bucket_by_tokyo_day() -> Result<()> {
    let (service, data) = test_service()?;

    // 2025-03-31T20:00Z is already April 1st in Tokyo.
    data.write_month(
        "2025-03",
        &month_file(&[expense(500, "2025-03-31T20:00:00Z", "食費")], &[]),
    )?;

    let history = service.get_balance_history().await?.history;

    assert_eq!(history.points.len(), 1);
    assert_eq!(history.points[0].day, parse_date("2025-04-01"));
    assert_eq!(history.balance_on(parse_date("2025-03-31")), SEED);
    assert_eq!(history.balance_on(parse_date("2025-04-01")), SEED - 500);

    Ok(())
}

#[tokio::test]
async fn test_amount_overflow_is_an_error() -> Result<()> {
    let (service, data) = test_service()?;

    data.write_month(
        "2025-03",
        &month_file(&[], &[income(i64::MAX, "2025-03-01", "給与")]),
    )?;

    let result = service.get_balance_history().await;

    assert!(matches!(result, Err(AppError::Overflow(_))));

    Ok(())
}

#[tokio::test]
async fn test_bundled_sample_data() -> Result<()> {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");

    let loaded = load_data_dir(&dir).await?;

    assert_eq!(loaded.accepted.len(), 2);
    assert!(loaded.skipped.is_empty());

    let history = kakeibo::compute_balance_history(
        loaded.accepted.iter().map(|month| &month.batch),
        SEED,
        &chrono_tz::Asia::Tokyo,
    )?;

    assert!(!history.points.is_empty());
    assert_eq!(history.points.len(), 10);
    assert_eq!(history.points[0].day, parse_date("2025-03-01"));
    assert_eq!(history.current_balance, 1_068_394);

    Ok(())
}
