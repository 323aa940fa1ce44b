//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// stock invariants, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A requested entity was not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// An issue asked for more units than the component currently holds.
    #[error("cannot issue {requested} units, only {available} available in stock")]
    InsufficientStock { requested: u32, available: u32 },

    /// A return was non-positive or exceeded the transaction's pending quantity.
    #[error("return quantity ({requested}) cannot exceed pending quantity ({pending})")]
    InvalidReturnQuantity { requested: u32, pending: u32 },

    /// A return was attempted against a transaction with nothing pending.
    #[error("transaction {0} is already completed, nothing left to return")]
    AlreadyCompleted(String),

    /// A value failed validation (e.g. empty name, zero quantity).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Lost a race for exclusive access; the caller may retry.
    #[error("concurrency conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn insufficient_stock(requested: u32, available: u32) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    pub fn invalid_return(requested: u32, pending: u32) -> Self {
        Self::InvalidReturnQuantity { requested, pending }
    }

    pub fn already_completed(id: impl ToString) -> Self {
        Self::AlreadyCompleted(id.to_string())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}
