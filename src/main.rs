//! Timecard - employee time tracking over monthly attendance ledgers.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use timecard as app;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use app::config::{AppConfig, Backend, ConfigLoadResult};
use app::models::attendance::{AttendanceRecord, CLOCK_FORMAT, DATE_FORMAT};
use app::models::employee::{Employee, NewEmployee};
use app::report;
use app::service::AttendanceService;
use app::store::{AttendanceStore, LocalStore, SheetsStore, is_partition_name};

/// Employee time tracking over monthly attendance ledgers.
#[derive(Parser)]
#[command(name = "timecard")]
struct Cli {
    /// Path to config.toml (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a clock-in/clock-out for an employee
    Clock {
        /// Employee code or name
        employee: String,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Clock-in time (HH:MM)
        #[arg(long = "in", value_name = "HH:MM")]
        time_in: String,
        /// Clock-out time (HH:MM)
        #[arg(long = "out", value_name = "HH:MM")]
        time_out: String,
        /// Free-text note
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List records for one month, or everything
    Records {
        /// Month (YYYY-MM)
        month: Option<String>,
    },
    /// Overwrite one record, addressed by month and row number
    Edit {
        /// Month (YYYY-MM)
        month: String,
        /// Row number as shown by `records` (starts at 1)
        row: usize,
        /// Employee code or name
        employee: String,
        #[arg(long)]
        date: String,
        #[arg(long = "in", value_name = "HH:MM")]
        time_in: String,
        #[arg(long = "out", value_name = "HH:MM")]
        time_out: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// Delete one record, addressed by month and row number
    Delete {
        /// Month (YYYY-MM)
        month: String,
        /// Row number as shown by `records` (starts at 1)
        row: usize,
    },
    /// Manage the employee roster
    Employee {
        #[command(subcommand)]
        command: EmployeeCommand,
    },
    /// Per-employee hour totals, optionally for one month
    Report {
        /// Month (YYYY-MM)
        month: Option<String>,
        /// Restrict to one employee name
        #[arg(long)]
        employee: Option<String>,
    },
    /// Headline statistics across all months
    Stats,
    /// List months that have data
    Months,
    /// Export records to an Excel file
    Export {
        /// Month (YYYY-MM); omit to export everything
        month: Option<String>,
        /// Output path, defaults to a timestamped name
        #[arg(long)]
        output: Option<PathBuf>,
        /// Export the per-employee summary instead of raw records
        #[arg(long)]
        summary: bool,
    },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    /// Add a roster entry
    Add {
        name: String,
        /// Employee code (CSV ledger)
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        position: Option<String>,
        /// Daily wage (Sheets ledger)
        #[arg(long)]
        daily_wage: Option<f64>,
    },
    /// List the roster
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(AppConfig::default_path);
    let config = match AppConfig::try_load(&config_path) {
        ConfigLoadResult::Loaded(config) => config,
        ConfigLoadResult::Missing => AppConfig::default(),
        ConfigLoadResult::Invalid(e) => {
            bail!("config {} is invalid: {e}", config_path.display());
        }
    };

    let _guard = init_logging(&config.local.data_dir.join("logs"))?;
    tracing::info!(config = %config_path.display(), "timecard starting");

    let store: Box<dyn AttendanceStore> = match config.storage.backend {
        Backend::Local => Box::new(LocalStore::new(&config.local.data_dir)?),
        Backend::Sheets => Box::new(SheetsStore::new(&config.sheets)?),
    };
    let service = AttendanceService::new(store);

    match cli.command {
        Command::Clock {
            employee,
            date,
            time_in,
            time_out,
            note,
        } => {
            let date = match date {
                Some(value) => parse_date(&value)?,
                None => Local::now().date_naive(),
            };
            let record = service
                .clock(&employee, date, parse_time(&time_in)?, parse_time(&time_out)?, &note)
                .await?;
            println!(
                "Recorded {} on {}: {:.2} hours (1h lunch deducted)",
                record.employee_name, record.date, record.total_hours
            );
        }
        Command::Records { month } => {
            let records = match month {
                Some(month) => service.monthly_records(&parse_month(&month)?).await,
                None => service.all_records().await,
            };
            print_records(&records);
        }
        Command::Edit {
            month,
            row,
            employee,
            date,
            time_in,
            time_out,
            note,
        } => {
            let month = parse_month(&month)?;
            let record = service
                .amend(
                    &month,
                    parse_row(row)?,
                    &employee,
                    parse_date(&date)?,
                    parse_time(&time_in)?,
                    parse_time(&time_out)?,
                    &note,
                )
                .await?;
            println!("Updated row {row} of {month}: {:.2} hours", record.total_hours);
        }
        Command::Delete { month, row } => {
            let month = parse_month(&month)?;
            service.remove(&month, parse_row(row)?).await?;
            println!("Deleted row {row} of {month}");
        }
        Command::Employee { command } => match command {
            EmployeeCommand::Add {
                name,
                id,
                department,
                position,
                daily_wage,
            } => {
                let employee = service
                    .add_employee(NewEmployee {
                        id,
                        name,
                        department,
                        position,
                        daily_wage,
                    })
                    .await?;
                println!("Added {}", employee.name);
            }
            EmployeeCommand::List => print_roster(&service.roster().await),
        },
        Command::Report { month, employee } => {
            let mut records = match month {
                Some(month) => service.monthly_records(&parse_month(&month)?).await,
                None => service.all_records().await,
            };
            if let Some(name) = employee {
                records.retain(|r| r.employee_name == name);
            }
            println!("{} records", records.len());
            print_summary(&report::group_sum_by_employee(&records));
        }
        Command::Stats => {
            let records = service.all_records().await;
            let stats = report::overview(&records);
            println!("Records:        {}", stats.records);
            println!("Employees:      {}", stats.employees);
            println!("Total hours:    {:.2}", stats.total_hours);
            println!("Average hours:  {:.2}", stats.average_hours);

            let top = report::top_n_by_hours(&records, 5);
            if !top.is_empty() {
                println!("\nTop employees by hours:");
                print_summary(&top);
            }

            let daily = report::daily_count(&records);
            if !daily.is_empty() {
                println!("\nRecords per day:");
                for (date, count) in daily {
                    println!("  {date}  {count}");
                }
            }
        }
        Command::Months => {
            for month in service.months().await {
                let count = service.monthly_records(&month).await.len();
                println!("{month}  ({count} records)");
            }
        }
        Command::Export {
            month,
            output,
            summary,
        } => {
            let records = match &month {
                Some(month) => service.monthly_records(&parse_month(month)?).await,
                None => service.all_records().await,
            };
            if summary {
                let path = output
                    .unwrap_or_else(|| PathBuf::from(app::export::generate_export_filename("summary")));
                app::export::export_summary_to_excel(&report::group_sum_by_employee(&records), &path)
                    .map_err(|e| app::AppError::Export(e.to_string()))?;
                println!("Exported summary to {}", path.display());
            } else {
                let path = output
                    .unwrap_or_else(|| PathBuf::from(app::export::generate_export_filename("attendance")));
                app::export::export_records_to_excel(&records, &path)
                    .map_err(|e| app::AppError::Export(e.to_string()))?;
                println!("Exported {} records to {}", records.len(), path.display());
            }
        }
    }

    Ok(())
}

/// Log to stderr and a daily-rolled file under the data directory.
fn init_logging(log_dir: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("cannot create log directory {}", log_dir.display()))?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "timecard.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();
    Ok(guard)
}

fn parse_date(value: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("invalid date {value}, expected YYYY-MM-DD"))
}

fn parse_time(value: &str) -> anyhow::Result<NaiveTime> {
    NaiveTime::parse_from_str(value, CLOCK_FORMAT)
        .with_context(|| format!("invalid time {value}, expected HH:MM"))
}

fn parse_month(value: &str) -> anyhow::Result<String> {
    if !is_partition_name(value) {
        bail!("invalid month {value}, expected YYYY-MM");
    }
    Ok(value.to_string())
}

/// Row numbers are displayed and entered 1-based; storage is 0-based.
fn parse_row(row: usize) -> anyhow::Result<usize> {
    row.checked_sub(1).context("row numbers start at 1")
}

fn print_records(records: &[AttendanceRecord]) {
    if records.is_empty() {
        println!("No records.");
        return;
    }
    println!(
        "{:>4}  {:<8} {:<22} {:<12} {:>5} {:>5} {:>7}  Note",
        "Row", "ID", "Employee", "Date", "In", "Out", "Hours"
    );
    for (idx, record) in records.iter().enumerate() {
        println!(
            "{:>4}  {:<8} {:<22} {:<12} {:>5} {:>5} {:>7.2}  {}",
            idx + 1,
            record.employee_id.as_deref().unwrap_or("-"),
            record.employee_name,
            record.date.to_string(),
            record.time_in.format(CLOCK_FORMAT).to_string(),
            record.time_out.format(CLOCK_FORMAT).to_string(),
            record.total_hours,
            record.note
        );
    }
}

fn print_roster(roster: &[Employee]) {
    if roster.is_empty() {
        println!("No employees.");
        return;
    }
    println!(
        "{:<8} {:<22} {:<15} {:<15} {:>12}",
        "ID", "Name", "Department", "Position", "Daily Wage"
    );
    for employee in roster {
        println!(
            "{:<8} {:<22} {:<15} {:<15} {:>12}",
            employee.id.as_deref().unwrap_or("-"),
            employee.name,
            employee.department.as_deref().unwrap_or("-"),
            employee.position.as_deref().unwrap_or("-"),
            employee
                .daily_wage
                .map(|w| w.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

fn print_summary(summaries: &[report::EmployeeSummary]) {
    if summaries.is_empty() {
        return;
    }
    println!("{:<22} {:>12} {:>6}", "Employee", "Total Hours", "Days");
    for summary in summaries {
        println!(
            "{:<22} {:>12.2} {:>6}",
            summary.employee, summary.total_hours, summary.days
        );
    }
}
