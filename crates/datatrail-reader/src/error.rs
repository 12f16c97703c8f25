//! Reader error types.
//!
//! Only failures that end a whole read live here. Per-segment decode
//! failures stay inside [`crate::decode::DecodeError`]; they are logged
//! and skipped, never propagated.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Index replay failed: I/O trouble or a malformed index line.
    #[error(transparent)]
    Storage(#[from] datatrail_storage::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CLI argument that is neither an `.idx` nor a `.dat` file.
    #[error("unrecognized file extension for {0}")]
    UnrecognizedPath(PathBuf),
}
