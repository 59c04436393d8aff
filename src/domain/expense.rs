use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, OwnerId};

pub type ExpenseId = Uuid;

/// A single recorded expense.
///
/// `created_at` is the moment the expense is attributed to. It is supplied by
/// the caller and carries no timezone; every timestamp in the system is read
/// in the same local frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    /// Set once at creation, never reassigned
    pub owner: OwnerId,
    /// Amount in cents (always positive)
    pub value_cents: Cents,
    /// Free-form label, matched exactly when filtering
    pub category: String,
    pub created_at: NaiveDateTime,
}

/// The caller-editable fields of an expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub value_cents: Cents,
    pub category: String,
    pub created_at: NaiveDateTime,
}

impl ExpenseDraft {
    pub fn new(value_cents: Cents, category: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            value_cents,
            category: category.into(),
            created_at,
        }
    }
}

impl Expense {
    /// Materialize a draft once the store has picked an id.
    pub fn from_draft(id: ExpenseId, owner: OwnerId, draft: ExpenseDraft) -> Self {
        Self {
            id,
            owner,
            value_cents: draft.value_cents,
            category: draft.category,
            created_at: draft.created_at,
        }
    }

    /// Replace the editable fields. Id and owner stay as they are.
    pub fn apply(&mut self, draft: ExpenseDraft) {
        self.value_cents = draft.value_cents;
        self.category = draft.category;
        self.created_at = draft.created_at;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_apply_keeps_identity() {
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let mut expense = Expense::from_draft(id, owner, ExpenseDraft::new(500, "coffee", at(2024, 3, 1)));

        expense.apply(ExpenseDraft::new(1250, "lunch", at(2024, 3, 2)));

        assert_eq!(expense.id, id);
        assert_eq!(expense.owner, owner);
        assert_eq!(expense.value_cents, 1250);
        assert_eq!(expense.category, "lunch");
        assert_eq!(expense.created_at, at(2024, 3, 2));
    }
}
