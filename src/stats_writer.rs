//! Stats JSON writer
//!
//! Writes a [`BoardSnapshot`] as `stats.json` so other tools can consume the derived
//! metrics without re-implementing them.

use std::fs;
use std::path::Path;

use crate::io::{IoError, IoResult, ReportWriter};
use crate::snapshot::BoardSnapshot;

/// File name written inside the output directory
pub const STATS_FILE: &str = "stats.json";

/// Writer for derived statistics as JSON
pub struct StatsWriter;

impl StatsWriter {
    /// Create a new stats writer
    pub fn new() -> Self {
        Self
    }

    /// Serialize a snapshot to pretty JSON
    pub fn to_json(snapshot: &BoardSnapshot) -> IoResult<String> {
        serde_json::to_string_pretty(snapshot)
            .map_err(|e| IoError::Write(format!("JSON serialization failed: {}", e)))
    }
}

impl Default for StatsWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportWriter for StatsWriter {
    fn write(&self, snapshot: &BoardSnapshot, output: &Path) -> IoResult<()> {
        fs::create_dir_all(output).map_err(IoError::Io)?;
        let json = Self::to_json(snapshot)?;
        fs::write(output.join(STATS_FILE), json).map_err(IoError::Io)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "stats-json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Board;
    use chrono::NaiveDate;

    #[test]
    fn writes_stats_json_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("report");
        let today = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let snapshot = BoardSnapshot::compute(&Board::new("Empty"), today);

        StatsWriter::new().write(&snapshot, &output).unwrap();

        let text = fs::read_to_string(output.join(STATS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["title"], "Empty");
        assert_eq!(value["today"], "2024-01-07");
        assert_eq!(value["nodeCount"], 0);
        assert!(value.get("bounds").is_none());
    }
}
