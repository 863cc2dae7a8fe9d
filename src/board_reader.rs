//! Board readers
//!
//! JSON and YAML documents share one serde model, so both readers differ only in the
//! deserializer they hand the text to.

use tracing::debug;

use crate::io::{IoError, IoResult, Reader};
use crate::model::Board;

fn loaded(board: Board, format: &str) -> Board {
    debug!(
        format,
        nodes = board.nodes.len(),
        connectors = board.connectors.len(),
        "parsed board"
    );
    board
}

/// Reader for JSON board documents
pub struct JsonReader;

impl JsonReader {
    /// Create a new JSON reader
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for JsonReader {
    fn parse(&self, content: &str) -> IoResult<Board> {
        let board: Board =
            serde_json::from_str(content).map_err(|e| IoError::Parse(e.to_string()))?;
        Ok(loaded(board, "json"))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }
}

/// Reader for YAML board documents
pub struct YamlReader;

impl YamlReader {
    /// Create a new YAML reader
    pub fn new() -> Self {
        Self
    }
}

impl Default for YamlReader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader for YamlReader {
    fn parse(&self, content: &str) -> IoResult<Board> {
        let board: Board =
            serde_yaml::from_str(content).map_err(|e| IoError::Parse(e.to_string()))?;
        Ok(loaded(board, "yaml"))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }
}
