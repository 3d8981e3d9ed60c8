//! Ledger Errors
//!
//! All failures of the progression core are local and synchronous.
//! Nothing here is retried: each variant points at the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Negative points, non-positive amounts, malformed deltas or tier tables
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Spending more points than the profile holds
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: i64, available: i64 },

    /// Event kind outside the closed set
    #[error("Invalid event: {0}")]
    InvalidEvent(String),
}

impl LedgerError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        LedgerError::InvalidInput(message.into())
    }

    /// Whether the condition should be shown to the user rather than treated as a defect
    pub fn is_user_facing(&self) -> bool {
        matches!(self, LedgerError::InsufficientBalance { .. })
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
