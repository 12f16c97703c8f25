//! Aggregation: a pure fold over decoded event records.
//!
//! Records are grouped by their `eventType` attribute; byte totals come
//! from the length of each record's `data` field. The rendered report
//! lists total counts, per-type counts, and human-readable size totals
//! with per-type averages.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub total_records: u64,
    pub records_by_type: BTreeMap<String, u64>,
    pub data_size_by_type: BTreeMap<String, u64>,
}

impl Report {
    /// Fold one event record into the report.
    pub fn observe(&mut self, record: &Value) {
        self.total_records += 1;

        let Some(event_type) = record.get("eventType").and_then(Value::as_str) else {
            return;
        };
        *self
            .records_by_type
            .entry(event_type.to_string())
            .or_default() += 1;

        if let Some(data) = record.get("data").and_then(Value::as_str) {
            *self
                .data_size_by_type
                .entry(event_type.to_string())
                .or_default() += data.len() as u64;
        }
    }

    pub fn total_data_size(&self) -> u64 {
        self.data_size_by_type.values().sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total records: {}", self.total_records)?;
        for (ty, count) in &self.records_by_type {
            writeln!(f, "  {ty}: {count}")?;
        }

        writeln!(
            f,
            "Total 'data' field size: {}",
            human_bytes(self.total_data_size())
        )?;
        for (ty, size) in &self.data_size_by_type {
            let count = self.records_by_type.get(ty).copied().unwrap_or(0).max(1);
            writeln!(
                f,
                "  {ty}: {}  (average size of record: {})",
                human_bytes(*size),
                human_bytes(size / count)
            )?;
        }
        Ok(())
    }
}

/// 1024-based size formatting, two decimals: `1.50 kB`, `3.00 MB`.
pub fn human_bytes(amt: u64) -> String {
    let mut amt = amt as f64;
    let mut suffix = "B";
    for next in ["kB", "MB", "GB", "TB"] {
        if amt <= 1024.0 {
            break;
        }
        amt /= 1024.0;
        suffix = next;
    }
    format!("{amt:.2} {suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_and_sizes_group_by_event_type() {
        let mut report = Report::default();
        report.observe(&json!({"eventType": "run", "data": "abcd"}));
        report.observe(&json!({"eventType": "run", "data": "ab"}));
        report.observe(&json!({"eventType": "edit"}));
        report.observe(&json!({"unrelated": true}));

        assert_eq!(report.total_records, 4);
        assert_eq!(report.records_by_type["run"], 2);
        assert_eq!(report.records_by_type["edit"], 1);
        assert_eq!(report.data_size_by_type["run"], 6);
        assert!(!report.data_size_by_type.contains_key("edit"));
        assert_eq!(report.total_data_size(), 6);
    }

    #[test]
    fn human_bytes_scales_by_1024() {
        assert_eq!(human_bytes(0), "0.00 B");
        assert_eq!(human_bytes(512), "512.00 B");
        assert_eq!(human_bytes(2048), "2.00 kB");
        assert_eq!(human_bytes(3 * 1024 * 1024), "3.00 MB");
    }

    #[test]
    fn display_renders_the_report_shape() {
        let mut report = Report::default();
        report.observe(&json!({"eventType": "run", "data": "abcd"}));

        let rendered = report.to_string();
        assert!(rendered.starts_with("Total records: 1\n"));
        assert!(rendered.contains("  run: 1\n"));
        assert!(rendered.contains("Total 'data' field size: 4.00 B\n"));
        assert!(rendered.contains("average size of record: 4.00 B"));
    }
}
