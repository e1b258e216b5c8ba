// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Malformed HEAD file: expected 'refs/heads/<branch>', got {0:?}")]
    MalformedHead(String),

    #[error("Unknown host fact: {0}")]
    UnknownFact(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
