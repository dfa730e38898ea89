use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid image: {0}")]
    InvalidImage(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<anyhow::Error> for DomainError {
    fn from(e: anyhow::Error) -> Self {
        // {:#} keeps the context chain on one line
        DomainError::OperationFailed(format!("{e:#}"))
    }
}
