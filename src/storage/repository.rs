use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    Expense, ExpenseDraft, ExpenseId, Owner, OwnerId, Predicate, PredicateSet, Sort,
    SortDirection,
};

use super::{ExpenseStore, MIGRATION_001_INITIAL, SortKey};

/// Storage format for expense timestamps. Always nine fractional digits and,
/// for the years the service accepts, four year digits, so comparing the text
/// compares the instants.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.9f";

const EXPENSE_COLUMNS: &str = "id, owner_id, value_cents, category, created_at";

fn encode_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

fn decode_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .with_context(|| format!("Invalid created_at timestamp: {}", value))
}

fn order_by(key: SortKey, direction: SortDirection) -> String {
    let direction = match direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!(" ORDER BY {} {}, id ASC", key.column(), direction)
}

/// SQLite-backed store for owners and expenses.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    // ========================
    // Owner operations
    // ========================

    pub async fn save_owner(&self, owner: &Owner) -> Result<()> {
        sqlx::query("INSERT INTO owners (id, name, created_at) VALUES (?, ?, ?)")
            .bind(owner.id.to_string())
            .bind(&owner.name)
            .bind(owner.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .context("Failed to save owner")?;
        Ok(())
    }

    pub async fn get_owner_by_name(&self, name: &str) -> Result<Option<Owner>> {
        let row = sqlx::query("SELECT id, name, created_at FROM owners WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch owner by name")?;

        row.as_ref().map(Self::row_to_owner).transpose()
    }

    /// List all owners ordered by name.
    pub async fn list_owners(&self) -> Result<Vec<Owner>> {
        let rows = sqlx::query("SELECT id, name, created_at FROM owners ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .context("Failed to list owners")?;

        rows.iter().map(Self::row_to_owner).collect()
    }

    fn row_to_owner(row: &sqlx::sqlite::SqliteRow) -> Result<Owner> {
        let id_str: String = row.get("id");
        let created_at_str: String = row.get("created_at");

        Ok(Owner {
            id: Uuid::parse_str(&id_str).context("Invalid owner ID")?,
            name: row.get("name"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
        })
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let id_str: String = row.get("id");
        let owner_str: String = row.get("owner_id");
        let created_at_str: String = row.get("created_at");

        Ok(Expense {
            id: Uuid::parse_str(&id_str).context("Invalid expense ID")?,
            owner: Uuid::parse_str(&owner_str).context("Invalid owner ID")?,
            value_cents: row.get("value_cents"),
            category: row.get("category"),
            created_at: decode_timestamp(&created_at_str)?,
        })
    }

    /// Append one predicate as an `AND` clause.
    fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
        match predicate {
            Predicate::OwnerEquals(owner) => {
                builder.push(" AND owner_id = ").push_bind(owner.to_string());
            }
            Predicate::CreatedAtBetween(range) => {
                builder
                    .push(" AND created_at BETWEEN ")
                    .push_bind(encode_timestamp(range.start))
                    .push(" AND ")
                    .push_bind(encode_timestamp(range.end));
            }
            Predicate::CategoryEquals(category) => {
                builder.push(" AND category = ").push_bind(category.clone());
            }
            Predicate::ValueAtLeast(min) => {
                builder.push(" AND value_cents >= ").push_bind(*min);
            }
            Predicate::ValueAtMost(max) => {
                builder.push(" AND value_cents <= ").push_bind(*max);
            }
        }
    }
}

#[async_trait]
impl ExpenseStore for Repository {
    async fn insert(&self, owner: OwnerId, draft: &ExpenseDraft) -> Result<Expense> {
        let expense = Expense::from_draft(Uuid::new_v4(), owner, draft.clone());

        sqlx::query(
            r#"
            INSERT INTO expenses (id, owner_id, value_cents, category, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(expense.id.to_string())
        .bind(expense.owner.to_string())
        .bind(expense.value_cents)
        .bind(&expense.category)
        .bind(encode_timestamp(expense.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to save expense")?;

        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>> {
        let row = sqlx::query(&format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ?"))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch expense")?;

        row.as_ref().map(Self::row_to_expense).transpose()
    }

    async fn update(&self, expense: &Expense) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE expenses
            SET value_cents = ?, category = ?, created_at = ?
            WHERE id = ?
            "#,
        )
        .bind(expense.value_cents)
        .bind(&expense.category)
        .bind(encode_timestamp(expense.created_at))
        .bind(expense.id.to_string())
        .execute(&self.pool)
        .await
        .context("Failed to update expense")?;
        Ok(())
    }

    async fn delete(&self, id: ExpenseId) -> Result<()> {
        sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .context("Failed to delete expense")?;
        Ok(())
    }

    async fn list_by_owner(&self, owner: OwnerId, sort: &Sort) -> Result<Vec<Expense>> {
        let key = SortKey::parse(&sort.field)?;
        let query = format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = ?{}",
            order_by(key, sort.direction)
        );
        debug!(%owner, %sort, "listing expenses");

        let rows = sqlx::query(&query)
            .bind(owner.to_string())
            .fetch_all(&self.pool)
            .await
            .context("Failed to list expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    async fn list_by_owner_and_date_range(
        &self,
        owner: OwnerId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        debug!(%owner, %start, %end, "listing expenses in date range");

        let rows = sqlx::query(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE owner_id = ? AND created_at BETWEEN ? AND ?"
        ))
        .bind(owner.to_string())
        .bind(encode_timestamp(start))
        .bind(encode_timestamp(end))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses in date range")?;

        rows.iter().map(Self::row_to_expense).collect()
    }

    async fn query(&self, predicates: &PredicateSet, sort: &Sort) -> Result<Vec<Expense>> {
        let key = SortKey::parse(&sort.field)?;

        let mut builder =
            QueryBuilder::<Sqlite>::new(format!("SELECT {EXPENSE_COLUMNS} FROM expenses WHERE 1=1"));
        for predicate in predicates.iter() {
            Self::push_predicate(&mut builder, predicate);
        }
        builder.push(order_by(key, sort.direction));

        debug!(
            owner = %predicates.owner(),
            clauses = predicates.len(),
            %sort,
            "querying expenses"
        );

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .context("Failed to query expenses")?;

        rows.iter().map(Self::row_to_expense).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = NaiveDate::from_ymd_opt(2024, 1, 9)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap();
        let later = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let (a, b) = (encode_timestamp(earlier), encode_timestamp(later));
        assert_eq!(a, "2024-01-09T23:59:59.999999999");
        assert_eq!(b, "2024-01-10T00:00:00.000000000");
        assert!(a < b);
    }

    #[test]
    fn test_timestamp_round_trip_keeps_nanoseconds() {
        let at = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_nano_opt(8, 15, 0, 1)
            .unwrap();
        assert_eq!(decode_timestamp(&encode_timestamp(at)).unwrap(), at);
    }

    #[test]
    fn test_order_by_breaks_ties_on_id() {
        assert_eq!(
            order_by(SortKey::CreatedAt, SortDirection::Desc),
            " ORDER BY created_at DESC, id ASC"
        );
        assert_eq!(
            order_by(SortKey::Value, SortDirection::Asc),
            " ORDER BY value_cents ASC, id ASC"
        );
    }
}
