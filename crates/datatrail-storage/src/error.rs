//! Storage Error Types
//!
//! All storage operations return `Result<T>` which is aliased to
//! `Result<T, Error>`, allowing clean propagation with `?`.
//!
//! ## Error Categories
//!
//! - `Io`: filesystem failures (open, write, sync, lock acquisition)
//! - `InvalidIdentity`: an identity component unsafe to use as a file name
//! - `MalformedIndexLine`: an index line that fails the line grammar —
//!   fatal for the scan in progress, never silently skipped
//! - `Metadata`: a metadata value that cannot be serialized to JSON

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid log identity: {0}")]
    InvalidIdentity(String),

    #[error("malformed index line {line}: {content:?}")]
    MalformedIndexLine { line: u64, content: String },

    #[error("metadata is not serializable: {0}")]
    Metadata(#[from] serde_json::Error),
}
