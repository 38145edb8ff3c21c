//! Domain error model.

use thiserror::Error;

use crate::entity::EntityKind;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation, illegal
/// transitions, conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed or blank input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A status change is not allowed by the entity's transition table.
    #[error("invalid {kind} transition: {from} -> {to}")]
    InvalidTransition {
        kind: EntityKind,
        from: String,
        to: String,
    },

    /// The entity is in a state that forbids the requested operation.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Reference generation gave up after exhausting its retry budget.
    #[error("reference generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: u32 },

    /// A concurrent writer got there first (stale version).
    #[error("concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_transition(
        kind: EntityKind,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidTransition {
            kind,
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn generation_exhausted(attempts: u32) -> Self {
        Self::GenerationExhausted { attempts }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::ConcurrencyConflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }
}
