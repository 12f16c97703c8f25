//! File pair: one index file + one data file, and the locking discipline
//! that makes concurrent appends from unrelated processes safe.
//!
//! ## Locking
//!
//! Coordination happens entirely through the filesystem because concurrent
//! writers are expected to be separate server processes, not threads. The
//! index file doubles as the lock target: `append` takes an exclusive
//! `flock` on it for the full open → seek-to-end → write-data → write-index
//! sequence, so "offset equals current data length" holds atomically per
//! pair. Appends to different pairs share no lock and never block each
//! other.
//!
//! `scan` takes only a shared lock, and only while replaying index lines —
//! not for the subsequent data reads. A reader may therefore observe an
//! index line slightly ahead of fully flushed data; that shows up as a
//! short read and is skipped with a warning, not treated as corruption.
//!
//! ## Durability
//!
//! Data bytes are `fdatasync`'d before the index line is written, and the
//! index line is `fdatasync`'d before the lock is released. On a crash
//! mid-append the index line is simply absent; the dangling data bytes are
//! never referenced.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use regex::Regex;
use tracing::warn;

use crate::error::Result;
use crate::index::{IndexRecord, INDEX_LINE_PATTERN};

/// One identity's index + data file pair.
///
/// Created lazily on first append; mutated only by [`append`]; read any
/// number of times, concurrently with appends, by [`scan`].
///
/// [`append`]: FilePair::append
/// [`scan`]: FilePair::scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair {
    index_path: PathBuf,
    data_path: PathBuf,
}

/// Holds the exclusive lock on the index file; unlocks on every exit path.
struct IndexLock {
    file: File,
}

impl IndexLock {
    fn exclusive(file: File) -> std::io::Result<Self> {
        file.lock_exclusive()?;
        Ok(Self { file })
    }
}

impl Drop for IndexLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl FilePair {
    pub fn new(index_path: impl Into<PathBuf>, data_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            data_path: data_path.into(),
        }
    }

    /// Resolve a pair from either of its file paths, by extension.
    ///
    /// Offline tooling is handed `.idx` or `.dat` files interchangeably;
    /// anything else is not a pair member.
    pub fn from_either(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("idx") => Some(Self::new(path.to_path_buf(), path.with_extension("dat"))),
            Some("dat") => Some(Self::new(path.with_extension("idx"), path.to_path_buf())),
            _ => None,
        }
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Append a payload, returning the committed index record.
    pub fn append(&self, payload: &[u8]) -> Result<IndexRecord> {
        self.append_with_metadata(payload, None)
    }

    /// Append a payload with an optional producer-defined annotation.
    ///
    /// Preconditions: `payload` is fully materialized — the caller has
    /// already resolved the exact length to write. Blocks until the pair's
    /// exclusive lock is acquired.
    pub fn append_with_metadata(
        &self,
        payload: &[u8],
        metadata: Option<&serde_json::Value>,
    ) -> Result<IndexRecord> {
        if let Some(parent) = self.index_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let index_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.index_path)?;
        let mut lock = IndexLock::exclusive(index_file)?;

        // Everything below runs inside the critical section; the lock is
        // released by IndexLock::drop on success and on every error path.
        let mut data_file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.data_path)?;

        let offset = data_file.metadata()?.len();
        data_file.write_all(payload)?;
        data_file.sync_data()?;

        let record = IndexRecord {
            offset,
            length: payload.len() as u64,
            metadata: metadata.cloned(),
        };
        lock.file.write_all(record.to_line()?.as_bytes())?;
        lock.file.sync_data()?;

        Ok(record)
    }

    /// Replay the index and fetch each referenced byte range.
    ///
    /// The shared lock covers only the line-by-line index read; data reads
    /// happen afterwards, lock-free. Entries whose bytes are not (yet) all
    /// present are skipped with a warning; a line failing the grammar ends
    /// the scan with `Error::MalformedIndexLine`.
    pub fn scan(&self) -> Result<ScanIter> {
        let index_file = File::open(&self.index_path)?;
        index_file.lock_shared()?;
        let mut raw = String::new();
        let read_result = (&index_file).read_to_string(&mut raw);
        let _ = index_file.unlock();
        read_result?;

        // The data file may not exist yet if the pair is mid-creation;
        // every entry then reads short and is skipped.
        let data_file = match File::open(&self.data_path) {
            Ok(f) => Some(f),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        Ok(ScanIter {
            pattern: Regex::new(INDEX_LINE_PATTERN).expect("index line pattern is valid"),
            lines: raw.lines().map(str::to_string).collect(),
            next: 0,
            data_file,
            data_path: self.data_path.clone(),
            failed: false,
        })
    }
}

/// Lazy iterator over `(IndexRecord, payload bytes)` produced by
/// [`FilePair::scan`]. Fuses after yielding a fatal error.
pub struct ScanIter {
    pattern: Regex,
    lines: Vec<String>,
    next: usize,
    data_file: Option<File>,
    data_path: PathBuf,
    failed: bool,
}

impl Iterator for ScanIter {
    type Item = Result<(IndexRecord, Vec<u8>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        while self.next < self.lines.len() {
            let line_no = (self.next + 1) as u64;
            let line = &self.lines[self.next];
            self.next += 1;

            let record = match IndexRecord::parse_line(&self.pattern, line_no, line) {
                Ok(record) => record,
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            };

            match self.read_segment(&record) {
                Ok(Some(bytes)) => return Some(Ok((record, bytes))),
                Ok(None) => {
                    warn!(
                        path = %self.data_path.display(),
                        line = line_no,
                        offset = record.offset,
                        length = record.length,
                        "index entry promises more bytes than the data file holds, skipping"
                    );
                    continue;
                }
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e));
                }
            }
        }

        None
    }
}

impl ScanIter {
    /// Read exactly `record.length` bytes at `record.offset`.
    ///
    /// `Ok(None)` means a short read: fewer bytes were available than the
    /// index promised.
    fn read_segment(&mut self, record: &IndexRecord) -> Result<Option<Vec<u8>>> {
        let Some(file) = self.data_file.as_mut() else {
            return Ok(None);
        };

        file.seek(SeekFrom::Start(record.offset))?;
        let mut buf = Vec::with_capacity(record.length as usize);
        std::io::Read::by_ref(file).take(record.length).read_to_end(&mut buf)?;

        if (buf.len() as u64) < record.length {
            return Ok(None);
        }
        Ok(Some(buf))
    }
}
