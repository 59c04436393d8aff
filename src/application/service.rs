use chrono::{Datelike, NaiveDateTime};
use tracing::info;

use crate::domain::{
    DEFAULT_SORT_FIELD, DateRange, Expense, ExpenseDraft, ExpenseId, FilterCriteria,
    InvalidArgument, MonthlySummary, Owner, OwnerId, SUPPORTED_YEARS, SortDirection,
    bucket_by_month, is_supported_year, is_valid_owner_name, resolve_sort,
};
use crate::storage::{ExpenseStore, Repository};

use super::AppError;

/// Default direction of the filter path when the caller gives none.
pub const DEFAULT_FILTER_DIRECTION: &str = "desc";

/// Application service providing the expense operations.
/// This is the primary interface for any client (CLI, API, etc.).
///
/// Holds nothing but the store handle, so one instance can serve concurrent
/// requests.
pub struct ExpenseService<S = Repository> {
    store: S,
}

impl ExpenseService<Repository> {
    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    // ========================
    // Owner operations
    // ========================

    /// Register a new owner. Names are trimmed and must be unique.
    pub async fn create_owner(&self, name: &str) -> Result<Owner, AppError> {
        let name = name.trim();
        if !is_valid_owner_name(name) {
            return Err(AppError::InvalidOwnerName(name.to_string()));
        }
        if self.store.get_owner_by_name(name).await?.is_some() {
            return Err(AppError::OwnerAlreadyExists(name.to_string()));
        }

        let owner = Owner::new(name);
        self.store.save_owner(&owner).await?;
        info!(owner = %owner.id, name = %owner.name, "created owner");
        Ok(owner)
    }

    /// Get an owner by name.
    pub async fn get_owner(&self, name: &str) -> Result<Owner, AppError> {
        self.store
            .get_owner_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::OwnerNotFound(name.to_string()))
    }

    /// List all owners.
    pub async fn list_owners(&self) -> Result<Vec<Owner>, AppError> {
        Ok(self.store.list_owners().await?)
    }
}

impl<S: ExpenseStore> ExpenseService<S> {
    /// Create a new service on top of the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    // ========================
    // Expense operations
    // ========================

    /// Record a new expense for `owner`.
    pub async fn record_expense(
        &self,
        owner: OwnerId,
        draft: ExpenseDraft,
    ) -> Result<Expense, AppError> {
        validate_draft(&draft)?;

        let expense = self.store.insert(owner, &draft).await?;
        info!(%owner, expense = %expense.id, "recorded expense");
        Ok(expense)
    }

    /// Get one of `owner`'s expenses.
    ///
    /// Someone else's expense is reported as not found.
    pub async fn get_expense(&self, owner: OwnerId, id: ExpenseId) -> Result<Expense, AppError> {
        self.store
            .get(id)
            .await?
            .filter(|expense| expense.owner == owner)
            .ok_or_else(|| AppError::ExpenseNotFound(id.to_string()))
    }

    /// Replace the value, category and date of one of `owner`'s expenses.
    pub async fn update_expense(
        &self,
        owner: OwnerId,
        id: ExpenseId,
        draft: ExpenseDraft,
    ) -> Result<Expense, AppError> {
        validate_draft(&draft)?;

        let mut expense = self.get_expense(owner, id).await?;
        expense.apply(draft);
        self.store.update(&expense).await?;
        info!(%owner, expense = %id, "updated expense");
        Ok(expense)
    }

    /// Delete one of `owner`'s expenses and return what was removed.
    pub async fn delete_expense(&self, owner: OwnerId, id: ExpenseId) -> Result<Expense, AppError> {
        let expense = self.get_expense(owner, id).await?;
        self.store.delete(id).await?;
        info!(%owner, expense = %id, "deleted expense");
        Ok(expense)
    }

    // ========================
    // Queries
    // ========================

    /// All of `owner`'s expenses, newest first unless `sort_spec` says otherwise.
    ///
    /// `sort_spec` is either `"field"` (ascending) or `"field,direction"`.
    pub async fn list_all(
        &self,
        owner: OwnerId,
        sort_spec: Option<&str>,
    ) -> Result<Vec<Expense>, AppError> {
        let sort = resolve_sort(sort_spec, DEFAULT_SORT_FIELD, SortDirection::Desc)?;
        Ok(self.store.list_by_owner(owner, &sort).await?)
    }

    /// Expenses matching every active criterion, ordered by `sort_by` in
    /// `direction` (`"asc"` or `"desc"`, case-insensitive).
    pub async fn filter(
        &self,
        criteria: FilterCriteria,
        sort_by: &str,
        direction: &str,
    ) -> Result<Vec<Expense>, AppError> {
        let predicates = criteria.into_predicates()?;
        let sort = resolve_sort(None, sort_by, direction.parse()?)?;
        Ok(self.store.query(&predicates, &sort).await?)
    }

    /// Monthly totals from January 1st of `now`'s year up to `now`.
    pub async fn year_to_date(
        &self,
        owner: OwnerId,
        now: NaiveDateTime,
    ) -> Result<MonthlySummary, AppError> {
        if !is_supported_year(now.year()) {
            return Err(InvalidArgument::new(format!(
                "year {} is out of range, expected {} to {}",
                now.year(),
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            ))
            .into());
        }

        let range = DateRange::year_to_date(now);
        let expenses = self
            .store
            .list_by_owner_and_date_range(owner, range.start, range.end)
            .await?;
        Ok(bucket_by_month(&expenses)?)
    }
}

fn validate_draft(draft: &ExpenseDraft) -> Result<(), AppError> {
    if draft.value_cents <= 0 {
        return Err(AppError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    if draft.category.trim().is_empty() {
        return Err(AppError::InvalidCategory(
            "Category must not be empty".to_string(),
        ));
    }
    if !is_supported_year(draft.created_at.year()) {
        return Err(AppError::InvalidDate(format!(
            "{} is outside the years {} to {}",
            draft.created_at,
            SUPPORTED_YEARS.start(),
            SUPPORTED_YEARS.end()
        )));
    }
    Ok(())
}
