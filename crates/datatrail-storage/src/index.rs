//! Index records and the index line grammar.
//!
//! The index file is UTF-8 text, one record per line:
//!
//! ```text
//! <offset> <length>[ <metadata-json>]\n
//! ```
//!
//! matched by `^(\d+) (\d+)(?: (.*))?$`. The metadata field is an optional,
//! producer-defined side channel: the storage engine stores and returns it
//! but never validates its shape. When the third field is present but is
//! not valid JSON, it is retained as a raw JSON string so older index files
//! remain readable.

use regex::Regex;

use crate::error::{Error, Result};

/// Line grammar for one index record.
pub(crate) const INDEX_LINE_PATTERN: &str = r"^(\d+) (\d+)(?: (.*))?$";

/// Describes one committed byte range in the data file.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    /// Data file length immediately before the corresponding append.
    pub offset: u64,

    /// Exact byte count written by the append.
    pub length: u64,

    /// Optional producer-defined annotation for the byte range.
    pub metadata: Option<serde_json::Value>,
}

impl IndexRecord {
    /// Render this record as one index line, newline included.
    pub fn to_line(&self) -> Result<String> {
        Ok(match self.metadata {
            Some(ref meta) => {
                format!("{} {} {}\n", self.offset, self.length, serde_json::to_string(meta)?)
            }
            None => format!("{} {}\n", self.offset, self.length),
        })
    }

    /// Parse one index line (newline already stripped).
    ///
    /// A grammar mismatch is fatal for the whole scan, which is why this
    /// returns `Error::MalformedIndexLine` rather than skipping.
    pub(crate) fn parse_line(pattern: &Regex, line_no: u64, line: &str) -> Result<Self> {
        let malformed = || Error::MalformedIndexLine {
            line: line_no,
            content: line.to_string(),
        };

        let caps = pattern.captures(line).ok_or_else(malformed)?;
        let offset: u64 = caps[1].parse().map_err(|_| malformed())?;
        let length: u64 = caps[2].parse().map_err(|_| malformed())?;
        let metadata = caps.get(3).map(|m| {
            serde_json::from_str(m.as_str())
                .unwrap_or_else(|_| serde_json::Value::String(m.as_str().to_string()))
        });

        Ok(Self {
            offset,
            length,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pattern() -> Regex {
        Regex::new(INDEX_LINE_PATTERN).unwrap()
    }

    #[test]
    fn renders_plain_lines() {
        let rec = IndexRecord {
            offset: 7,
            length: 150000,
            metadata: None,
        };
        assert_eq!(rec.to_line().unwrap(), "7 150000\n");
    }

    #[test]
    fn round_trips_metadata() {
        let rec = IndexRecord {
            offset: 0,
            length: 3,
            metadata: Some(json!({"session": 9})),
        };
        let line = rec.to_line().unwrap();
        let parsed = IndexRecord::parse_line(&pattern(), 1, line.trim_end()).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn keeps_non_json_metadata_as_raw_string() {
        let parsed = IndexRecord::parse_line(&pattern(), 1, "0 5 not-json").unwrap();
        assert_eq!(
            parsed.metadata,
            Some(serde_json::Value::String("not-json".to_string()))
        );
    }

    #[test]
    fn rejects_bad_grammar() {
        for line in ["", "12", "a b", "-1 5", "3 4x", " 3 4"] {
            assert!(
                IndexRecord::parse_line(&pattern(), 1, line).is_err(),
                "line {line:?} should be malformed"
            );
        }
    }
}
