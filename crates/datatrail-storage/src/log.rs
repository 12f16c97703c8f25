//! Core IndexedLog implementation: identity-keyed append and scan.
//!
//! [`IndexedLog`] owns the root data directory and maps each
//! [`LogIdentity`] to its file pair. All synchronization lives in
//! [`FilePair`]; the log itself is a cheap, shareable handle with no
//! in-memory state to coordinate.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::identity::LogIdentity;
use crate::index::IndexRecord;
use crate::pair::{FilePair, ScanIter};

/// The append-only storage engine.
///
/// Appends to the *same* identity are linearized by that pair's file lock;
/// appends to *different* identities are fully independent.
///
/// # Example
///
/// ```ignore
/// let log = IndexedLog::new("/var/lib/datatrail");
/// let id = LogIdentity::new("alice", None)?;
/// let rec = log.append(&id, b"payload")?;
/// assert_eq!(rec.length, 7);
///
/// for entry in log.scan(&id)? {
///     let (record, bytes) = entry?;
///     process(record, bytes);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct IndexedLog {
    data_dir: PathBuf,
}

impl IndexedLog {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// The file pair backing an identity. Exposed for offline tooling that
    /// operates on mirrored pairs directly.
    pub fn pair(&self, identity: &LogIdentity) -> FilePair {
        identity.file_pair(&self.data_dir)
    }

    /// Durably append a fully materialized payload to an identity's log.
    pub fn append(&self, identity: &LogIdentity, payload: &[u8]) -> Result<IndexRecord> {
        self.pair(identity).append(payload)
    }

    /// Append with a producer-defined metadata annotation.
    pub fn append_with_metadata(
        &self,
        identity: &LogIdentity,
        payload: &[u8],
        metadata: Option<&serde_json::Value>,
    ) -> Result<IndexRecord> {
        self.pair(identity).append_with_metadata(payload, metadata)
    }

    /// Lazily replay an identity's committed records.
    pub fn scan(&self, identity: &LogIdentity) -> Result<ScanIter> {
        self.pair(identity).scan()
    }
}
