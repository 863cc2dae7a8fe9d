//! Board writers
//!
//! Serialize a board back to JSON or YAML, used when a command mutates a board file.

use crate::io::{IoError, IoResult, Writer};
use crate::model::Board;

/// Writer for pretty-printed JSON board documents
pub struct JsonWriter;

impl JsonWriter {
    /// Create a new JSON writer
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for JsonWriter {
    fn render(&self, board: &Board) -> IoResult<String> {
        let mut json = serde_json::to_string_pretty(board)
            .map_err(|e| IoError::Write(format!("JSON serialization failed: {}", e)))?;
        json.push('\n');
        Ok(json)
    }

    fn format_id(&self) -> &str {
        "json"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Writer for YAML board documents
pub struct YamlWriter;

impl YamlWriter {
    /// Create a new YAML writer
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer for YamlWriter {
    fn render(&self, board: &Board) -> IoResult<String> {
        serde_yaml::to_string(board)
            .map_err(|e| IoError::Write(format!("YAML serialization failed: {}", e)))
    }

    fn format_id(&self) -> &str {
        "yaml"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
