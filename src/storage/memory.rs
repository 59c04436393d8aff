use std::sync::RwLock;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::domain::{DateRange, Expense, ExpenseDraft, ExpenseId, OwnerId, PredicateSet, Sort};

use super::{ExpenseStore, SortKey};

/// Expense store kept entirely in memory. Predicates are evaluated directly
/// against each record.
#[derive(Debug, Default)]
pub struct MemoryStore {
    expenses: RwLock<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self, keep: impl Fn(&Expense) -> bool) -> Result<Vec<Expense>> {
        let expenses = self
            .expenses
            .read()
            .map_err(|_| anyhow!("Expense store lock poisoned"))?;
        Ok(expenses.iter().filter(|&e| keep(e)).cloned().collect())
    }

    fn sorted(mut expenses: Vec<Expense>, sort: &Sort) -> Result<Vec<Expense>> {
        let key = SortKey::parse(&sort.field)?;
        expenses.sort_by(|a, b| key.compare(a, b, sort.direction));
        Ok(expenses)
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn insert(&self, owner: OwnerId, draft: &ExpenseDraft) -> Result<Expense> {
        let expense = Expense::from_draft(Uuid::new_v4(), owner, draft.clone());
        self.expenses
            .write()
            .map_err(|_| anyhow!("Expense store lock poisoned"))?
            .push(expense.clone());
        Ok(expense)
    }

    async fn get(&self, id: ExpenseId) -> Result<Option<Expense>> {
        Ok(self.snapshot(|e| e.id == id)?.into_iter().next())
    }

    async fn update(&self, expense: &Expense) -> Result<()> {
        let mut expenses = self
            .expenses
            .write()
            .map_err(|_| anyhow!("Expense store lock poisoned"))?;
        if let Some(stored) = expenses.iter_mut().find(|e| e.id == expense.id) {
            *stored = expense.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ExpenseId) -> Result<()> {
        self.expenses
            .write()
            .map_err(|_| anyhow!("Expense store lock poisoned"))?
            .retain(|e| e.id != id);
        Ok(())
    }

    async fn list_by_owner(&self, owner: OwnerId, sort: &Sort) -> Result<Vec<Expense>> {
        Self::sorted(self.snapshot(|e| e.owner == owner)?, sort)
    }

    async fn list_by_owner_and_date_range(
        &self,
        owner: OwnerId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Expense>> {
        let range = DateRange::new(start, end);
        self.snapshot(|e| e.owner == owner && range.contains(e.created_at))
    }

    async fn query(&self, predicates: &PredicateSet, sort: &Sort) -> Result<Vec<Expense>> {
        Self::sorted(self.snapshot(|e| predicates.matches(e))?, sort)
    }
}
