//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Reasons a hierarchy cannot be produced.
///
/// Callers treat all of them as "no tree" and substitute a default organization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("no records to build a hierarchy from")]
    EmptyInput,

    #[error("no root record (every record references a parent)")]
    NoRoot,

    #[error("hierarchy is {depth} levels deep, limit is {limit}")]
    TooDeep { depth: usize, limit: usize },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
