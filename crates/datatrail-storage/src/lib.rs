//! DataTrail Storage Engine
//!
//! An indexed append-only log keyed by upload identity. Each identity owns
//! exactly one file pair on the local filesystem:
//!
//! - a **data file** (`<user>.dat`): raw payload bytes, appended verbatim
//! - an **index file** (`<user>.idx`): one text line per payload describing
//!   the byte range it occupies in the data file
//!
//! ## Write Path
//!
//! ```text
//! append(identity, bytes)
//!     ↓
//! lock index file (exclusive, cross-process flock)
//!     ↓
//! offset = current data file length
//!     ↓
//! write bytes → fdatasync data file
//!     ↓
//! write "<offset> <length>\n" → fdatasync index file
//!     ↓
//! unlock
//! ```
//!
//! The lock is held for the whole sequence so that "offset equals current
//! data length" stays true across concurrent writers, including writers in
//! unrelated server processes. A crash after the data write but before the
//! index write leaves orphaned bytes in the data file; they are never
//! referenced by any index line and are harmless.
//!
//! ## Read Path
//!
//! `scan` replays the index under a shared lock, then fetches the byte
//! ranges it references. An index entry that promises more bytes than the
//! data file holds is skipped with a warning (a concurrent append may not
//! have finished flushing); an index line that fails the line grammar
//! aborts the whole scan.

pub mod error;
pub mod identity;
pub mod index;
pub mod log;
pub mod pair;

pub use error::{Error, Result};
pub use identity::LogIdentity;
pub use index::IndexRecord;
pub use log::IndexedLog;
pub use pair::{FilePair, ScanIter};
