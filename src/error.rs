//! Error types shared by the store and the models it returns.

use thiserror::Error;

/// Errors returned by [`LearningStore`](crate::LearningStore) operations.
///
/// Absence is never an error: lookups return `Option` or a sentinel value.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A profile with this email already exists.
    #[error("an account with email {0} already exists")]
    DuplicateEmail(String),

    /// A stored row could not be turned into a valid record.
    #[error("invalid record in {table}: {reason}")]
    InvalidRecord { table: &'static str, reason: String },

    /// The underlying SQLite engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl StoreError {
    /// Returns true for constraint violations the caller can report to the user.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::DuplicateEmail(_))
    }
}

/// Errors raised when constructing an [`AssessmentQuestion`](crate::AssessmentQuestion).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("correct answer index {index} is out of range for {options} options")]
    CorrectIndexOutOfRange { index: usize, options: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let err = StoreError::DuplicateEmail("a@b.c".to_string());
        assert!(err.is_constraint_violation());
        assert_eq!(err.to_string(), "an account with email a@b.c already exists");
    }

    #[test]
    fn storage_error_wraps_rusqlite() {
        let err: StoreError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(!err.is_constraint_violation());
        assert!(err.to_string().starts_with("storage error"));
    }
}
