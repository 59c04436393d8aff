use serde::{Deserialize, Serialize};

use super::{Cents, DateRange, Expense, InvalidArgument, OwnerId, resolve_date_range};

/// One atomic condition an expense must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    OwnerEquals(OwnerId),
    /// Inclusive on both ends
    CreatedAtBetween(DateRange),
    /// Exact, case-sensitive match
    CategoryEquals(String),
    ValueAtLeast(Cents),
    ValueAtMost(Cents),
}

impl Predicate {
    pub fn matches(&self, expense: &Expense) -> bool {
        match self {
            Predicate::OwnerEquals(owner) => expense.owner == *owner,
            Predicate::CreatedAtBetween(range) => range.contains(expense.created_at),
            Predicate::CategoryEquals(category) => expense.category == *category,
            Predicate::ValueAtLeast(min) => expense.value_cents >= *min,
            Predicate::ValueAtMost(max) => expense.value_cents <= *max,
        }
    }
}

/// Predicates that are ANDed together. Always scoped to exactly one owner.
///
/// Only [`build_predicates`] creates one, so the owner condition can't be left
/// out. Translating the set into a native query is up to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateSet {
    owner: OwnerId,
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.predicates.iter()
    }

    /// Number of predicates, owner included, so never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.predicates.iter().all(|p| p.matches(expense))
    }
}

/// Assemble the predicate set for one owner plus whichever optional filters
/// are active.
///
/// A blank category is treated as absent. Value bounds are independent and
/// not checked against each other: `min > max` simply matches nothing.
pub fn build_predicates(
    owner: OwnerId,
    date_range: Option<DateRange>,
    category: Option<&str>,
    min_value: Option<Cents>,
    max_value: Option<Cents>,
) -> PredicateSet {
    let mut predicates = vec![Predicate::OwnerEquals(owner)];

    if let Some(range) = date_range {
        predicates.push(Predicate::CreatedAtBetween(range));
    }
    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        predicates.push(Predicate::CategoryEquals(category.to_string()));
    }
    if let Some(min) = min_value {
        predicates.push(Predicate::ValueAtLeast(min));
    }
    if let Some(max) = max_value {
        predicates.push(Predicate::ValueAtMost(max));
    }

    PredicateSet { owner, predicates }
}

/// Raw filter input for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub owner: OwnerId,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub category: Option<String>,
    pub min_value: Option<Cents>,
    pub max_value: Option<Cents>,
}

impl FilterCriteria {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            year: None,
            month: None,
            category: None,
            min_value: None,
            max_value: None,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_month(mut self, month: i32) -> Self {
        self.month = Some(month);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_min_value(mut self, min_value: Cents) -> Self {
        self.min_value = Some(min_value);
        self
    }

    pub fn with_max_value(mut self, max_value: Cents) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Resolve the date range and compose the predicate set.
    pub fn into_predicates(self) -> Result<PredicateSet, InvalidArgument> {
        let date_range = resolve_date_range(self.year, self.month)?;
        Ok(build_predicates(
            self.owner,
            date_range,
            self.category.as_deref(),
            self.min_value,
            self.max_value,
        ))
    }
}
