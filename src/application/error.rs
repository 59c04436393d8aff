use thiserror::Error;

use crate::domain::{InvalidArgument, MIN_OWNER_NAME_LEN, TotalOverflow};

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    InvalidArgument(#[from] InvalidArgument),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error(transparent)]
    TotalOverflow(#[from] TotalOverflow),

    #[error("Expense not found: {0}")]
    ExpenseNotFound(String),

    #[error("Owner not found: {0}")]
    OwnerNotFound(String),

    #[error("Owner already exists: {0}")]
    OwnerAlreadyExists(String),

    #[error(
        "Invalid owner name '{0}': must be at least {min} characters",
        min = MIN_OWNER_NAME_LEN
    )]
    InvalidOwnerName(String),

    /// Store failures, passed through as reported.
    #[error("Database error: {0:#}")]
    Database(#[from] anyhow::Error),
}
