//! Validation errors for domain records.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AcpError {
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),

    #[error("invalid risk level: {0} (expected low, medium or high)")]
    InvalidRiskLevel(String),

    #[error("{0}")]
    Other(String),
}
