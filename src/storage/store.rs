use std::cmp::Ordering;

use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::domain::{Expense, ExpenseDraft, ExpenseId, OwnerId, PredicateSet, Sort, SortDirection};

/// Durable storage for expenses.
///
/// Every method reports failures as `anyhow::Error`; callers pass them on
/// without reinterpreting them.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    /// Persist a new expense and assign its id.
    async fn insert(&self, owner: OwnerId, draft: &ExpenseDraft) -> Result<Expense>;

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>>;

    /// Overwrite the stored value, category and date of an existing expense.
    async fn update(&self, expense: &Expense) -> Result<()>;

    async fn delete(&self, id: ExpenseId) -> Result<()>;

    /// All expenses of one owner in the requested order.
    async fn list_by_owner(&self, owner: OwnerId, sort: &Sort) -> Result<Vec<Expense>>;

    /// Expenses of one owner with `start <= created_at <= end`, in no
    /// particular order.
    async fn list_by_owner_and_date_range(
        &self,
        owner: OwnerId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>>;

    /// Expenses matching every predicate in the set, in the requested order.
    async fn query(&self, predicates: &PredicateSet, sort: &Sort) -> Result<Vec<Expense>>;
}

/// Expense attributes a store knows how to order by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    Value,
    Category,
    Id,
}

impl SortKey {
    /// Map a field name from a [`Sort`] onto a sortable attribute.
    pub fn parse(field: &str) -> Result<Self> {
        match field {
            "createdAt" | "created_at" | "date" => Ok(SortKey::CreatedAt),
            "value" | "amount" => Ok(SortKey::Value),
            "category" => Ok(SortKey::Category),
            "id" => Ok(SortKey::Id),
            other => bail!("Unknown sort field: {}", other),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Value => "value_cents",
            SortKey::Category => "category",
            SortKey::Id => "id",
        }
    }

    /// Compare two expenses on this key, breaking ties by id so the order is
    /// total and repeatable.
    pub fn compare(&self, a: &Expense, b: &Expense, direction: SortDirection) -> Ordering {
        let ordering = match self {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Value => a.value_cents.cmp(&b.value_cents),
            SortKey::Category => a.category.cmp(&b.category),
            SortKey::Id => a.id.cmp(&b.id),
        };
        let ordering = match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id.cmp(&b.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_aliases() {
        assert_eq!(SortKey::parse("createdAt").unwrap(), SortKey::CreatedAt);
        assert_eq!(SortKey::parse("created_at").unwrap(), SortKey::CreatedAt);
        assert_eq!(SortKey::parse("amount").unwrap(), SortKey::Value);
        assert_eq!(SortKey::parse("category").unwrap(), SortKey::Category);
    }

    #[test]
    fn test_unknown_sort_field() {
        let err = SortKey::parse("colour").unwrap_err();
        assert_eq!(err.to_string(), "Unknown sort field: colour");
        // field names are case-sensitive
        assert!(SortKey::parse("Value").is_err());
    }
}
