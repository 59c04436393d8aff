use std::io::{Write, stdout};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::application::{DEFAULT_FILTER_DIRECTION, ExpenseService};
use crate::domain::{
    DEFAULT_SORT_FIELD, Expense, ExpenseDraft, FilterCriteria, MonthlySummary, format_cents,
    parse_cents,
};

/// Outlay - personal expense tracker
#[derive(Parser)]
#[command(name = "outlay")]
#[command(about = "Record expenses and slice them by date, category and amount")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "OUTLAY_DATABASE", default_value = "outlay.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Owner management commands
    #[command(subcommand)]
    Owner(OwnerCommands),

    /// Record an expense
    Add {
        /// Amount spent (e.g., "12.50" or "12")
        amount: String,

        /// Owner name
        #[arg(short, long)]
        owner: String,

        /// Category (e.g., "groceries")
        #[arg(short, long)]
        category: String,

        /// Date of the expense (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Replace the amount, category and date of an expense
    Update {
        /// Expense ID
        id: String,

        /// New amount
        amount: String,

        /// Owner name
        #[arg(short, long)]
        owner: String,

        /// New category
        #[arg(short, long)]
        category: String,

        /// New date (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS)
        #[arg(long)]
        date: String,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: String,

        /// Owner name
        #[arg(short, long)]
        owner: String,
    },

    /// Show a single expense
    Show {
        /// Expense ID
        id: String,

        /// Owner name
        #[arg(short, long)]
        owner: String,
    },

    /// List all expenses of an owner
    List {
        /// Owner name
        #[arg(short, long)]
        owner: String,

        /// Sort as "field" or "field,direction" (default: newest first)
        #[arg(short, long)]
        sort: Option<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Filter expenses by date, category and amount
    Filter {
        /// Owner name
        #[arg(short, long)]
        owner: String,

        /// Year to filter by (0-9999)
        #[arg(long, allow_negative_numbers = true)]
        year: Option<i32>,

        /// Month to filter by (1-12, needs --year)
        #[arg(long, allow_negative_numbers = true)]
        month: Option<i32>,

        /// Exact category
        #[arg(short, long)]
        category: Option<String>,

        /// Minimum amount (inclusive)
        #[arg(long)]
        min: Option<String>,

        /// Maximum amount (inclusive)
        #[arg(long)]
        max: Option<String>,

        /// Field to sort by
        #[arg(long, default_value = DEFAULT_SORT_FIELD)]
        sort_by: String,

        /// Sort direction: asc, desc
        #[arg(long, default_value = DEFAULT_FILTER_DIRECTION)]
        direction: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Monthly totals for the current year up to now
    Yearly {
        /// Owner name
        #[arg(short, long)]
        owner: String,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[derive(Subcommand)]
pub enum OwnerCommands {
    /// Register a new owner
    Create {
        /// Owner name (unique, at least 3 characters)
        name: String,
    },

    /// List all owners
    List,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl Cli {
    /// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
    pub fn init_logging(&self) {
        let default_filter = if self.verbose { "outlay=debug" } else { "warn" };
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                ExpenseService::init(&self.database).await?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Owner(owner_cmd) => {
                let service = ExpenseService::connect(&self.database).await?;
                run_owner_command(&service, owner_cmd).await?;
            }

            Commands::Add {
                amount,
                owner,
                category,
                date,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let value_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '12.50' or '12'")?;
                let created_at = match date {
                    Some(date_str) => parse_datetime(&date_str)?,
                    None => Local::now().naive_local(),
                };

                let expense = service
                    .record_expense(
                        owner.id,
                        ExpenseDraft::new(value_cents, category, created_at),
                    )
                    .await?;

                println!(
                    "Recorded expense: {} {} on {} ({})",
                    format_cents(expense.value_cents),
                    expense.category,
                    expense.created_at.format("%Y-%m-%d %H:%M:%S"),
                    expense.id
                );
            }

            Commands::Update {
                id,
                amount,
                owner,
                category,
                date,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let expense_id = parse_expense_id(&id)?;
                let value_cents =
                    parse_cents(&amount).context("Invalid amount format. Use '12.50' or '12'")?;
                let created_at = parse_datetime(&date)?;

                let expense = service
                    .update_expense(
                        owner.id,
                        expense_id,
                        ExpenseDraft::new(value_cents, category, created_at),
                    )
                    .await?;
                println!(
                    "Updated expense {}: {} {} on {}",
                    expense.id,
                    format_cents(expense.value_cents),
                    expense.category,
                    expense.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }

            Commands::Delete { id, owner } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let expense = service
                    .delete_expense(owner.id, parse_expense_id(&id)?)
                    .await?;
                println!(
                    "Deleted expense: {} {} ({})",
                    format_cents(expense.value_cents),
                    expense.category,
                    expense.id
                );
            }

            Commands::Show { id, owner } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let expense = service.get_expense(owner.id, parse_expense_id(&id)?).await?;

                println!("Expense: {}", expense.id);
                println!("  Owner:    {}", owner.name);
                println!("  Amount:   {}", format_cents(expense.value_cents));
                println!("  Category: {}", expense.category);
                println!(
                    "  Date:     {}",
                    expense.created_at.format("%Y-%m-%d %H:%M:%S")
                );
            }

            Commands::List {
                owner,
                sort,
                format,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let expenses = service.list_all(owner.id, sort.as_deref()).await?;
                print_expenses(&expenses, format)?;
            }

            Commands::Filter {
                owner,
                year,
                month,
                category,
                min,
                max,
                sort_by,
                direction,
                format,
            } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;

                let criteria = FilterCriteria {
                    owner: owner.id,
                    year,
                    month,
                    category,
                    min_value: min
                        .as_deref()
                        .map(parse_cents)
                        .transpose()
                        .context("Invalid --min amount")?,
                    max_value: max
                        .as_deref()
                        .map(parse_cents)
                        .transpose()
                        .context("Invalid --max amount")?,
                };

                let expenses = service.filter(criteria, &sort_by, &direction).await?;
                print_expenses(&expenses, format)?;
            }

            Commands::Yearly { owner, format } => {
                let service = ExpenseService::connect(&self.database).await?;
                let owner = service.get_owner(&owner).await?;
                let summary = service
                    .year_to_date(owner.id, Local::now().naive_local())
                    .await?;
                print_summary(&summary, format)?;
            }
        }

        Ok(())
    }
}

async fn run_owner_command(service: &ExpenseService, cmd: OwnerCommands) -> Result<()> {
    match cmd {
        OwnerCommands::Create { name } => {
            let owner = service.create_owner(&name).await?;
            println!("Created owner: {} ({})", owner.name, owner.id);
        }

        OwnerCommands::List => {
            let owners = service.list_owners().await?;
            if owners.is_empty() {
                println!("No owners found.");
            } else {
                println!("{:<20} {:<36} {:<10}", "NAME", "ID", "SINCE");
                println!("{}", "-".repeat(68));
                for owner in owners {
                    println!(
                        "{:<20} {:<36} {:<10}",
                        truncate(&owner.name, 20),
                        owner.id,
                        owner.created_at.format("%Y-%m-%d")
                    );
                }
            }
        }
    }
    Ok(())
}

/// Flat CSV record for an expense.
#[derive(Serialize)]
struct ExpenseRow<'a> {
    id: String,
    date: String,
    category: &'a str,
    amount: String,
}

impl<'a> From<&'a Expense> for ExpenseRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        Self {
            id: expense.id.to_string(),
            date: expense.created_at.format("%Y-%m-%dT%H:%M:%S").to_string(),
            category: &expense.category,
            amount: format_cents(expense.value_cents),
        }
    }
}

fn print_expenses(expenses: &[Expense], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            if expenses.is_empty() {
                println!("No expenses found.");
                return Ok(());
            }
            println!(
                "{:<36} {:<19} {:<20} {:>12}",
                "ID", "DATE", "CATEGORY", "AMOUNT"
            );
            println!("{}", "-".repeat(90));
            for expense in expenses {
                println!(
                    "{:<36} {:<19} {:<20} {:>12}",
                    expense.id,
                    expense.created_at.format("%Y-%m-%d %H:%M:%S"),
                    truncate(&expense.category, 20),
                    format_cents(expense.value_cents)
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(expenses)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(stdout());
            for expense in expenses {
                writer.serialize(ExpenseRow::from(expense))?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn print_summary(summary: &MonthlySummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            println!("{:<12} {:>12}", "MONTH", "TOTAL");
            println!("{}", "-".repeat(25));
            for month in summary.iter() {
                println!("{:<12} {:>12}", month.month, format_cents(month.total));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary.months)?);
        }
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(stdout());
            writer.write_record(["month", "total"])?;
            for month in summary.iter() {
                writer.write_record([month.month, format_cents(month.total).as_str()])?;
            }
            writer.flush()?;
        }
    }
    stdout().flush()?;
    Ok(())
}

fn parse_expense_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).context("Invalid expense ID format (expected UUID)")
}

/// Parse a local date-time. A bare date means midnight.
fn parse_datetime(value: &str) -> Result<NaiveDateTime> {
    const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    let value = value.trim();
    if let Some(parsed) = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Ok(parsed);
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").with_context(|| {
        format!(
            "Invalid date '{}'. Use YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS",
            value
        )
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN))
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
