//! Domain error model.

use thiserror::Error;

/// Result type used across the warehouse domain.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Business outcomes (a rejected order, a low-stock condition, a removal for an
/// unknown item) are *not* errors; they are ordinary state transitions. This
/// type is reserved for caller mistakes and broken internal state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input, unknown event name).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. empty).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Shared state could not be accessed (e.g. a poisoned lock).
    #[error("conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    /// Error for a component store whose lock was poisoned by a panicking writer.
    pub fn poisoned(store: &str) -> Self {
        Self::conflict(format!("{store} lock poisoned"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        assert_eq!(
            DomainError::validation("quantity must be numeric").to_string(),
            "validation failed: quantity must be numeric"
        );
        assert_eq!(
            DomainError::poisoned("inventory").to_string(),
            "conflict: inventory lock poisoned"
        );
    }
}
