use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::application::{
    month_range, DashboardService, SkippedMonthSummary, TransactionFilter,
};
use crate::config::{load_or_default, DashboardConfig};
use crate::domain::{
    format_amount, format_grouped, parse_amount, BalanceHistory, Category, DayRange, MonthLabel,
    TransactionKind,
};

/// Kakeibo - balance history from monthly transaction files
#[derive(Parser)]
#[command(name = "kakeibo")]
#[command(about = "A local-first dashboard that folds monthly expense and income files into a balance history")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./kakeibo.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding YYYY-MM.toml month files (overrides config)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Balance before the first transaction, e.g. "757232" or "757,232" (overrides config)
    #[arg(long, global = true, allow_hyphen_values = true)]
    pub seed_balance: Option<String>,

    /// IANA time zone used to bucket transactions into days (overrides config)
    #[arg(long, global = true)]
    pub timezone: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the current total balance
    Balance,

    /// Show the balance after each day with activity
    History {
        /// First day to show (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Last day to show (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// List transactions from the accepted months
    Transactions {
        /// Only this month (YYYY-MM)
        #[arg(long)]
        month: Option<String>,

        /// Only expense or income
        #[arg(long)]
        kind: Option<String>,

        /// Only this category (Japanese label or key, e.g. "食費" or "food")
        #[arg(long)]
        category: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// Summary reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Validate every month file and report which ones would be skipped
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: history, transactions
        #[arg(value_parser = ["history", "transactions"])]
        what: String,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, json
        #[arg(short, long, default_value = "csv", value_parser = ["csv", "json"])]
        format: String,
    },
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Totals per category
    Categories {
        /// expense or income
        #[arg(long, default_value = "expense")]
        kind: String,

        /// Restrict to one month (YYYY-MM)
        #[arg(long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Output format: table, json, csv
        #[arg(long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },

    /// Income, expense and closing balance per month
    Monthly {
        /// Output format: table, json, csv
        #[arg(long, default_value = "table", value_parser = ["table", "json", "csv"])]
        format: String,
    },
}

impl Cli {
    /// Config file values with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<DashboardConfig> {
        let mut config =
            load_or_default(self.config.as_deref()).context("Failed to load configuration")?;

        if let Some(data_dir) = &self.data_dir {
            config = config.with_data_dir(data_dir);
        }

        if let Some(seed) = &self.seed_balance {
            let seed = parse_amount(seed).context("Invalid seed balance. Use '757232' or '757,232'")?;
            config = config.with_seed_balance(seed);
        }

        if let Some(name) = &self.timezone {
            let tz: Tz = name
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid time zone '{}': {}", name, e))?;
            config = config.with_timezone(tz);
        }

        Ok(config)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.resolve_config()?;
        let service = DashboardService::new(config);

        match self.command {
            Commands::Balance => run_balance_command(&service).await?,

            Commands::History { from, to, format } => {
                run_history_command(&service, from, to, &format).await?
            }

            Commands::Transactions {
                month,
                kind,
                category,
                format,
            } => run_transactions_command(&service, month, kind, category, &format).await?,

            Commands::Report(report_cmd) => run_report_command(&service, report_cmd).await?,

            Commands::Check => run_check_command(&service).await?,

            Commands::Export {
                what,
                output,
                format,
            } => run_export_command(&service, &what, output, &format).await?,
        }

        Ok(())
    }
}

async fn run_balance_command(service: &DashboardService) -> Result<()> {
    let report = service.get_balance_history().await?;
    warn_skipped(&report.skipped);

    let suffix = &service.config().currency_suffix;
    println!(
        "現在の総資産は {} です",
        format_amount(report.history.current_balance, suffix)
    );

    if let Some(last) = report.history.points.last() {
        println!(
            "Last activity: {} ({} months loaded)",
            last.day,
            report.months.len()
        );
    } else {
        println!("No transactions found.");
    }
    Ok(())
}

async fn run_history_command(
    service: &DashboardService,
    from: Option<String>,
    to: Option<String>,
    format: &str,
) -> Result<()> {
    let range = parse_day_range(from, to)?;
    let report = service.get_balance_history().await?;
    warn_skipped(&report.skipped);

    let history = &report.history;
    let points = history.range(range.from, range.to);

    match format {
        "json" => {
            let selected = BalanceHistory {
                seed_balance: history.seed_balance,
                current_balance: history.current_balance,
                points: points.to_vec(),
            };
            crate::io::export::write_history_json(&selected, std::io::stdout())?;
        }
        "csv" => {
            crate::io::export::write_history_csv(points, std::io::stdout())?;
        }
        _ => {
            let suffix = &service.config().currency_suffix;
            if points.is_empty() {
                println!("No balance points found.");
            } else {
                println!("{:<12} {:>18}", "DATE", "BALANCE");
                println!("{}", "-".repeat(31));
                for point in points {
                    println!(
                        "{:<12} {:>18}",
                        point.day.to_string(),
                        format_amount(point.balance, suffix)
                    );
                }
                println!("{}", "-".repeat(31));
            }
            println!(
                "{:<12} {:>18}",
                "SEED",
                format_amount(history.seed_balance, suffix)
            );
            println!(
                "{:<12} {:>18}",
                "CURRENT",
                format_amount(history.current_balance, suffix)
            );
        }
    }
    Ok(())
}

async fn run_transactions_command(
    service: &DashboardService,
    month: Option<String>,
    kind: Option<String>,
    category: Option<String>,
    format: &str,
) -> Result<()> {
    let filter = TransactionFilter {
        month: month.map(|m| parse_month(&m)).transpose()?,
        kind: kind.map(|k| parse_kind(&k)).transpose()?,
        category: category.map(|c| parse_category(&c)).transpose()?,
        range: DayRange::all(),
    };

    let listing = service.list_transactions(filter).await?;
    warn_skipped(&listing.skipped);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&listing.entries)?);
        }
        "csv" => {
            crate::io::export::write_transactions_csv(&listing.entries, std::io::stdout())?;
        }
        _ => {
            if listing.entries.is_empty() {
                println!("No transactions found.");
                return Ok(());
            }

            let suffix = &service.config().currency_suffix;
            println!(
                "{:<12} {:<8} {:<12} {:>14} DESCRIPTION",
                "DATE", "KIND", "CATEGORY", "AMOUNT"
            );
            println!("{}", "-".repeat(70));

            for entry in &listing.entries {
                let transaction = &entry.transaction;
                println!(
                    "{:<12} {:<8} {:<12} {:>14} {}",
                    entry.day.to_string(),
                    transaction.kind().as_str(),
                    transaction.category().label(),
                    format_amount(transaction.signed_amount(), suffix),
                    truncate(transaction.description().unwrap_or(""), 30)
                );
            }

            println!("{}", "-".repeat(70));
            println!("{} transactions", listing.entries.len());
        }
    }
    Ok(())
}

async fn run_report_command(service: &DashboardService, cmd: ReportCommands) -> Result<()> {
    let suffix = service.config().currency_suffix.clone();

    match cmd {
        ReportCommands::Categories {
            kind,
            month,
            from,
            to,
            format,
        } => {
            let kind = parse_kind(&kind)?;
            let range = match month {
                Some(month) => month_range(parse_month(&month)?),
                None => parse_day_range(from, to)?,
            };
            let report = service.get_category_report(kind, range).await?;
            warn_skipped(&report.skipped);

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("category,total,count,percentage");
                    for share in &report.breakdown.categories {
                        println!(
                            "{},{},{},{:.2}",
                            share.category.key(),
                            share.total,
                            share.count,
                            share.percentage
                        );
                    }
                }
                _ => {
                    let title = match kind {
                        TransactionKind::Expense => "支出内訳",
                        TransactionKind::Income => "収入内訳",
                    };
                    println!("{}", title);
                    println!("Period: {}", describe_range(&report.range));
                    println!();

                    if report.breakdown.categories.is_empty() {
                        println!("No {} found in this period.", kind);
                        return Ok(());
                    }

                    println!(
                        "{:<16} {:>16} {:>8} {:>8}",
                        "CATEGORY", "TOTAL", "COUNT", "PERCENT"
                    );
                    println!("{}", "-".repeat(51));

                    for share in &report.breakdown.categories {
                        println!(
                            "{:<16} {:>16} {:>8} {:>7.1}%",
                            share.category.label(),
                            format_amount(share.total, &suffix),
                            share.count,
                            share.percentage
                        );
                    }

                    println!("{}", "-".repeat(51));
                    println!(
                        "{:<16} {:>16}",
                        "TOTAL",
                        format_amount(report.breakdown.total, &suffix)
                    );
                }
            }
        }

        ReportCommands::Monthly { format } => {
            let report = service.get_monthly_report().await?;
            warn_skipped(&report.skipped);

            match format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                "csv" => {
                    println!("month,income,expense,net,transactions,closing_balance");
                    for row in &report.months {
                        println!(
                            "{},{},{},{},{},{}",
                            row.totals.month,
                            row.totals.income,
                            row.totals.expense,
                            row.totals.net,
                            row.totals.transaction_count,
                            row.closing_balance
                        );
                    }
                }
                _ => {
                    if report.months.is_empty() {
                        println!("No months found.");
                        return Ok(());
                    }

                    println!(
                        "{:<8} {:>14} {:>14} {:>14} {:>16}",
                        "MONTH", "INCOME", "EXPENSE", "NET", "CLOSING"
                    );
                    println!("{}", "-".repeat(70));

                    for row in &report.months {
                        println!(
                            "{:<8} {:>14} {:>14} {:>14} {:>16}",
                            row.totals.month.to_string(),
                            format_grouped(row.totals.income),
                            format_grouped(row.totals.expense),
                            format_grouped(row.totals.net),
                            format_amount(row.closing_balance, &suffix)
                        );
                    }

                    println!("{}", "-".repeat(70));
                    println!(
                        "Seed balance: {}",
                        format_amount(report.seed_balance, &suffix)
                    );
                }
            }
        }
    }

    Ok(())
}

async fn run_check_command(service: &DashboardService) -> Result<()> {
    println!(
        "Checking month files in {}...\n",
        service.config().data_dir.display()
    );

    let checks = service.check_months().await?;

    if checks.is_empty() {
        println!("No month files found.");
        return Ok(());
    }

    for check in &checks {
        match &check.error {
            None => println!(
                "OK    {} ({} transactions)",
                check.month, check.transaction_count
            ),
            Some(error) => println!("FAIL  {}", error),
        }
    }

    let failed = checks.iter().filter(|check| !check.is_valid()).count();
    println!();

    if failed > 0 {
        anyhow::bail!(
            "{} of {} months failed validation and will be skipped",
            failed,
            checks.len()
        );
    }

    println!("All {} months are valid", checks.len());
    Ok(())
}

async fn run_export_command(
    service: &DashboardService,
    what: &str,
    output: Option<PathBuf>,
    format: &str,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // Determine output writer
    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match (what, format) {
        ("history", "json") => exporter.export_history_json(writer).await?,
        ("history", _) => exporter.export_history_csv(writer).await?,
        ("transactions", "json") => exporter.export_transactions_json(writer).await?,
        ("transactions", _) => exporter.export_transactions_csv(writer).await?,
        _ => {
            anyhow::bail!(
                "Invalid export type '{}'. Valid types: history, transactions",
                what
            );
        }
    };

    if output.is_some() {
        match what {
            "history" => eprintln!("Exported {} balance points", count),
            _ => eprintln!("Exported {} transactions", count),
        }
    }

    Ok(())
}

/// Print months left out of the result so the totals are not silently partial.
fn warn_skipped(skipped: &[SkippedMonthSummary]) {
    if skipped.is_empty() {
        return;
    }

    eprintln!(
        "Warning: {} month(s) failed validation and were skipped:",
        skipped.len()
    );
    for month in skipped {
        eprintln!("  {}", month.reason);
    }
}

fn describe_range(range: &DayRange) -> String {
    match (range.from, range.to) {
        (None, None) => "all time".to_string(),
        (Some(from), None) => format!("{} onwards", from),
        (None, Some(to)) => format!("up to {}", to),
        (Some(from), Some(to)) => format!("{} to {}", from, to),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn parse_day_range(from: Option<String>, to: Option<String>) -> Result<DayRange> {
    let from = from
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid from date")?;
    let to = to
        .map(|s| parse_date(&s))
        .transpose()
        .context("Invalid to date")?;
    Ok(DayRange::new(from, to))
}

fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").context("Date must be in YYYY-MM-DD format")
}

fn parse_month(month: &str) -> Result<MonthLabel> {
    month
        .parse()
        .with_context(|| format!("Invalid month '{}'", month))
}

fn parse_kind(kind: &str) -> Result<TransactionKind> {
    kind.parse().map_err(|e: String| anyhow::anyhow!(e))
}

fn parse_category(category: &str) -> Result<Category> {
    Category::lookup(category).ok_or_else(|| {
        let known: Vec<&str> = Category::ALL.iter().map(|c| c.key()).collect();
        anyhow::anyhow!(
            "Unknown category '{}'. Use a Japanese label or one of: {}",
            category,
            known.join(", ")
        )
    })
}
