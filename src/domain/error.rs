use thiserror::Error;

/// Domain-level errors raised while validating records
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Record key is empty")]
    EmptyKey,
}
