//! Request handling error taxonomy.
//!
//! Every failure exit of the ingestion state machine maps to exactly one
//! variant, and each variant to one response status. None of these
//! variants is retried by the server; retry, if any, is the client's
//! responsibility.

use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    /// The body ended before the declared length was received. No commit
    /// happened; `deficit()` reports the missing byte count.
    #[error("short input: expected {expected} bytes, received {actual}")]
    ShortInput { expected: u64, actual: u64 },

    /// Credential check rejected the upload, or the credential service was
    /// unreachable (fail closed).
    #[error("credential check rejected the upload")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(#[from] datatrail_storage::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Missing byte count for a short input, 0 for other variants.
    pub fn deficit(&self) -> u64 {
        match self {
            IngestError::ShortInput { expected, actual } => expected.saturating_sub(*actual),
            _ => 0,
        }
    }

    /// Response status for this failure.
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::ShortInput { .. } => StatusCode::BAD_REQUEST,
            IngestError::Unauthorized => StatusCode::FORBIDDEN,
            IngestError::Storage(datatrail_storage::Error::InvalidIdentity(_)) => {
                StatusCode::BAD_REQUEST
            }
            IngestError::Storage(_) | IngestError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}
