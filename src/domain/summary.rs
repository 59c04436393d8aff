use chrono::Datelike;
use serde::Serialize;
use thiserror::Error;

use super::{Cents, Expense};

pub const MONTHS_IN_YEAR: usize = 12;

pub const MONTH_LABELS: [&str; MONTHS_IN_YEAR] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotal {
    pub month: &'static str,
    pub total: Cents,
}

/// Spending per calendar month, January first. Every month is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub months: [MonthlyTotal; MONTHS_IN_YEAR],
}

impl MonthlySummary {
    /// Total for a 1-based month number.
    pub fn total_for(&self, month: u32) -> Option<Cents> {
        let index = usize::try_from(month).ok()?.checked_sub(1)?;
        self.months.get(index).map(|m| m.total)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MonthlyTotal> {
        self.months.iter()
    }
}

/// A month's spending no longer fits in [`Cents`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Total for {month} is too large to represent")]
pub struct TotalOverflow {
    pub month: &'static str,
}

/// Sum expense values into one bucket per calendar month.
///
/// Only the month of `created_at` is looked at, so callers pass expenses from
/// a single year. Months without expenses total zero.
pub fn bucket_by_month(expenses: &[Expense]) -> Result<MonthlySummary, TotalOverflow> {
    let mut totals: [Cents; MONTHS_IN_YEAR] = [0; MONTHS_IN_YEAR];
    for expense in expenses {
        let index = expense.created_at.month0() as usize;
        totals[index] = totals[index]
            .checked_add(expense.value_cents)
            .ok_or(TotalOverflow {
                month: MONTH_LABELS[index],
            })?;
    }

    Ok(MonthlySummary {
        months: std::array::from_fn(|i| MonthlyTotal {
            month: MONTH_LABELS[i],
            total: totals[i],
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExpenseDraft;
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn at(m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, m, d)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn expense(value: Cents, created_at: NaiveDateTime) -> Expense {
        Expense::from_draft(
            Uuid::new_v4(),
            Uuid::nil(),
            ExpenseDraft::new(value, "misc", created_at),
        )
    }

    #[test]
    fn test_no_expenses_gives_twelve_zeroes() {
        let summary = bucket_by_month(&[]).unwrap();
        assert_eq!(summary.months.len(), 12);
        assert!(summary.iter().all(|m| m.total == 0));
    }

    #[test]
    fn test_buckets_in_calendar_order() {
        let expenses = vec![
            expense(1000, at(1, 15)),
            expense(500, at(1, 20)),
            expense(700, at(3, 1)),
        ];
        let summary = bucket_by_month(&expenses).unwrap();

        let totals: Vec<Cents> = summary.iter().map(|m| m.total).collect();
        assert_eq!(totals, vec![1500, 0, 700, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let labels: Vec<&str> = summary.iter().map(|m| m.month).collect();
        assert_eq!(labels, MONTH_LABELS.to_vec());
    }

    #[test]
    fn test_month_boundaries() {
        let last_moment_of_january = NaiveDate::from_ymd_opt(2024, 1, 31)
            .unwrap()
            .and_hms_nano_opt(23, 59, 59, 999_999_999)
            .unwrap();
        let expenses = vec![
            expense(100, last_moment_of_january),
            expense(200, at(2, 1).date().and_hms_opt(0, 0, 0).unwrap()),
            expense(300, at(12, 31)),
        ];
        let summary = bucket_by_month(&expenses).unwrap();

        assert_eq!(summary.total_for(1), Some(100));
        assert_eq!(summary.total_for(2), Some(200));
        assert_eq!(summary.total_for(12), Some(300));
    }

    #[test]
    fn test_month_total_overflow_is_an_error() {
        let expenses = vec![expense(i64::MAX, at(5, 1)), expense(i64::MAX, at(5, 2))];
        assert_eq!(
            bucket_by_month(&expenses),
            Err(TotalOverflow { month: "May" })
        );

        let spread = vec![expense(i64::MAX, at(5, 1)), expense(i64::MAX, at(6, 1))];
        let summary = bucket_by_month(&spread).unwrap();
        assert_eq!(summary.total_for(5), Some(i64::MAX));
        assert_eq!(summary.total_for(6), Some(i64::MAX));
    }

    #[test]
    fn test_total_for_out_of_range() {
        let summary = bucket_by_month(&[]).unwrap();
        assert_eq!(summary.total_for(0), None);
        assert_eq!(summary.total_for(13), None);
    }
}
