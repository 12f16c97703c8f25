//! DataTrail Offline Reader
//!
//! Scans index + data file pairs written by the ingestion server,
//! decompresses and parses each stored segment, and folds the contained
//! event records into an aggregate report.
//!
//! ## Decode Path
//!
//! ```text
//! FilePair::scan → (IndexRecord, bytes)
//!     ↓
//! gzip decompress
//!     ↓
//! parse UTF-8 JSON → array of event records
//!     ↓
//! yield each record to the aggregator
//! ```
//!
//! A segment that fails to decompress or parse is skipped with a warning
//! so one corrupt upload cannot block reading the rest of the log.
//! Malformed index lines stay fatal; that asymmetry comes from the
//! storage scanner and is preserved here.
//!
//! The reader runs against a local mirror; fetching that mirror is the
//! job of a [`sync::RemoteSync`] collaborator.

pub mod aggregate;
pub mod decode;
pub mod error;
pub mod sync;

pub use aggregate::{human_bytes, Report};
pub use decode::{decode_segment, read_pair, DecodeError};
pub use error::{Error, Result};
pub use sync::{mirror_pairs, RemoteSync};
