// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use outlay::application::ExpenseService;
use outlay::domain::{Cents, Expense, ExpenseDraft, Owner};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(ExpenseService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = ExpenseService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse "YYYY-MM-DD" or "YYYY-MM-DD HH:MM:SS" into a timestamp
pub fn parse_datetime(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap_or_else(|_| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    })
}

/// Record an expense for `owner` on `date`
pub async fn spend(
    service: &ExpenseService,
    owner: &Owner,
    value_cents: Cents,
    category: &str,
    date: &str,
) -> Result<Expense> {
    Ok(service
        .record_expense(
            owner.id,
            ExpenseDraft::new(value_cents, category, parse_datetime(date)),
        )
        .await?)
}

/// Test fixture: two owners with a spread of expenses over 2024
pub struct Household {
    pub alice: Owner,
    pub bob: Owner,
}

impl Household {
    pub async fn create(service: &ExpenseService) -> Result<Self> {
        let alice = service.create_owner("alice").await?;
        let bob = service.create_owner("bob").await?;

        spend(service, &alice, 4500, "groceries", "2024-01-05").await?;
        spend(service, &alice, 1200, "dining", "2024-01-18 20:30:00").await?;
        spend(service, &alice, 90000, "rent", "2024-02-01").await?;
        spend(service, &alice, 3000, "groceries", "2024-02-14").await?;
        spend(service, &alice, 2500, "dining", "2024-03-09 13:00:00").await?;
        spend(service, &alice, 15000, "travel", "2023-12-28").await?;

        spend(service, &bob, 9999, "groceries", "2024-01-10").await?;

        Ok(Self { alice, bob })
    }
}

pub fn values(expenses: &[Expense]) -> Vec<Cents> {
    expenses.iter().map(|e| e.value_cents).collect()
}
