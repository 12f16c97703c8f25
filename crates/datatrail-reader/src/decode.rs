//! Per-segment decode: gzip → UTF-8 JSON → array of event records.

use std::io::Read;

use datatrail_storage::FilePair;
use flate2::read::GzDecoder;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::error::Result;

/// Why one segment could not be decoded. Recoverable: the segment is
/// skipped and scanning continues.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("gzip decompression failed: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("JSON parse failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("decoded document is not an array")]
    NotAnArray,
}

/// Decode one stored segment into its event records.
///
/// Segments are gzip-compressed UTF-8 JSON documents, each an ordered
/// array of independent records.
pub fn decode_segment(bytes: &[u8]) -> std::result::Result<Vec<Value>, DecodeError> {
    let mut text = String::new();
    GzDecoder::new(bytes)
        .read_to_string(&mut text)
        .map_err(DecodeError::Decompress)?;

    match serde_json::from_str(&text)? {
        Value::Array(records) => Ok(records),
        _ => Err(DecodeError::NotAnArray),
    }
}

/// Replay a file pair and yield every decodable event record to `f`.
///
/// Short data reads and undecodable segments are skipped with a warning;
/// a malformed index line aborts with an error, matching the storage
/// scan contract.
pub fn read_pair(pair: &FilePair, mut f: impl FnMut(&Value)) -> Result<()> {
    for entry in pair.scan()? {
        let (record, bytes) = entry?;
        match decode_segment(&bytes) {
            Ok(records) => {
                for event in &records {
                    f(event);
                }
            }
            Err(e) => {
                warn!(
                    index = %pair.index_path().display(),
                    offset = record.offset,
                    length = record.length,
                    error = %e,
                    "skipping undecodable segment"
                );
            }
        }
    }
    Ok(())
}
