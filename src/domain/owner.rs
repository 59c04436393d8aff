use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Expense;

pub type OwnerId = Uuid;

/// Shortest accepted owner name, in characters.
pub const MIN_OWNER_NAME_LEN: usize = 3;

/// The identity every expense is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: OwnerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: Utc::now(),
        }
    }

    /// Ownership is decided by stable id, never by which copy of the owner
    /// record happens to be in hand.
    pub fn owns(&self, expense: &Expense) -> bool {
        expense.owner == self.id
    }
}

/// Returns true if `name` (after trimming) is long enough to be an owner name.
pub fn is_valid_owner_name(name: &str) -> bool {
    name.trim().chars().count() >= MIN_OWNER_NAME_LEN
}
