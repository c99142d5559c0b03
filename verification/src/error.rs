use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    /// Required fields are missing. Nothing is scored or logged.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The brand/pattern lookup could not be performed. Nothing is logged.
    #[error("pattern repository unavailable: {0}")]
    RepositoryUnavailable(String),
}

impl From<acp_store::StoreError> for VerificationError {
    fn from(e: acp_store::StoreError) -> Self {
        VerificationError::RepositoryUnavailable(e.to_string())
    }
}
