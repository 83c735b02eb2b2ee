//! Error types for ledger operations.

use thiserror::Error;

/// Result alias used across the ledger
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Kind of record an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Method,
    Bet,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entity::Method => write!(f, "method"),
            Entity::Bet => write!(f, "bet"),
        }
    }
}

/// Failures surfaced by ledger operations. None of them is retried here.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Missing or blank field, malformed timestamp, or unusable monetary input
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("a method named '{name}' already exists")]
    Conflict { name: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },

    #[error("cannot delete method {method_id}: {bet_count} bets still use it")]
    MethodInUse { method_id: i64, bet_count: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl LedgerError {
    pub fn method_not_found(id: i64) -> Self {
        LedgerError::NotFound { entity: Entity::Method, id }
    }

    pub fn bet_not_found(id: i64) -> Self {
        LedgerError::NotFound { entity: Entity::Bet, id }
    }
}
