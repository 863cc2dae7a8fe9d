//! Reader/Writer traits and format dispatch
//!
//! Boards are read from and written back to JSON or YAML documents; derived statistics
//! are written as reports (HTML dashboard, stats JSON). Format selection goes through
//! [`FormatRegistry`], keyed on file extension for boards and on a format id for reports.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::board_reader::{JsonReader, YamlReader};
use crate::board_writer::{JsonWriter, YamlWriter};
use crate::html_writer::HtmlWriter;
use crate::model::Board;
use crate::snapshot::BoardSnapshot;
use crate::stats_writer::StatsWriter;

/// Errors that can occur during reading or writing
#[derive(Error, Debug)]
pub enum IoError {
    /// The file format is not supported
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file extension could not be determined
    #[error("could not determine file format from path: {0}")]
    UnknownExtension(String),

    /// An I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A parsing error occurred
    #[error("parse error: {0}")]
    Parse(String),

    /// A rendering/writing error occurred
    #[error("write error: {0}")]
    Write(String),
}

/// Result type for reader/writer operations
pub type IoResult<T> = Result<T, IoError>;

/// A reader parses a board document
pub trait Reader {
    /// Parse board text
    fn parse(&self, content: &str) -> IoResult<Board>;

    /// File extensions this reader can handle (e.g., ["yaml", "yml"])
    fn supported_extensions(&self) -> &[&str];

    /// Read and parse a board file
    fn read(&self, input: &Path) -> IoResult<Board> {
        let content = fs::read_to_string(input)?;
        self.parse(&content)
    }

    /// Check if this reader can handle the given file extension
    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A writer serializes a board document
pub trait Writer {
    /// Serialize the board to text
    fn render(&self, board: &Board) -> IoResult<String>;

    /// Identifier for this output format (e.g., "json", "yaml")
    fn format_id(&self) -> &str;

    /// File extensions this writer produces
    fn supported_extensions(&self) -> &[&str];

    /// Write the board to the output path
    fn write(&self, board: &Board, output: &Path) -> IoResult<()> {
        let text = self.render(board)?;
        fs::write(output, text)?;
        Ok(())
    }

    fn supports_extension(&self, ext: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// A report writer outputs derived board statistics
pub trait ReportWriter {
    /// Write the report to the output directory
    fn write(&self, snapshot: &BoardSnapshot, output: &Path) -> IoResult<()>;

    /// Identifier for this report format (e.g., "html", "stats-json")
    fn format_id(&self) -> &str;
}

/// Registry of available readers and writers
pub struct FormatRegistry {
    readers: Vec<Box<dyn Reader>>,
    writers: Vec<Box<dyn Writer>>,
    report_writers: Vec<Box<dyn ReportWriter>>,
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            readers: Vec::new(),
            writers: Vec::new(),
            report_writers: Vec::new(),
        }
    }

    /// Create a registry with all default readers and writers registered
    ///
    /// Currently registers:
    /// - Readers: `JsonReader` (json), `YamlReader` (yaml, yml)
    /// - Writers: `JsonWriter` (json), `YamlWriter` (yaml, yml)
    /// - Report writers: `HtmlWriter` (html), `StatsWriter` (stats-json)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader(Box::new(JsonReader::new()));
        registry.register_reader(Box::new(YamlReader::new()));
        registry.register_writer(Box::new(JsonWriter::new()));
        registry.register_writer(Box::new(YamlWriter::new()));
        registry.register_report_writer(Box::new(HtmlWriter::new()));
        registry.register_report_writer(Box::new(StatsWriter::new()));
        registry
    }

    /// Register a reader
    pub fn register_reader(&mut self, reader: Box<dyn Reader>) {
        self.readers.push(reader);
    }

    /// Register a writer
    pub fn register_writer(&mut self, writer: Box<dyn Writer>) {
        self.writers.push(writer);
    }

    /// Register a report writer
    pub fn register_report_writer(&mut self, writer: Box<dyn ReportWriter>) {
        self.report_writers.push(writer);
    }

    /// Find a reader for the given file extension
    pub fn reader_for_extension(&self, ext: &str) -> Option<&dyn Reader> {
        self.readers
            .iter()
            .find(|r| r.supports_extension(ext))
            .map(|r| r.as_ref())
    }

    /// Find a board writer by format ID
    pub fn writer_for_format(&self, format_id: &str) -> Option<&dyn Writer> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Find a report writer by format ID
    pub fn report_writer_for_format(&self, format_id: &str) -> Option<&dyn ReportWriter> {
        self.report_writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
    }

    /// Get file extension from a path
    pub fn extension_from_path(path: &Path) -> Option<&str> {
        path.extension().and_then(|e| e.to_str())
    }

    /// Find a reader for the given path based on its extension
    pub fn reader_for_path(&self, path: &Path) -> IoResult<&dyn Reader> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.reader_for_extension(ext)
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Find a board writer for the given path, so a board is saved in the format it was read
    pub fn writer_for_path(&self, path: &Path) -> IoResult<&dyn Writer> {
        let ext = Self::extension_from_path(path)
            .ok_or_else(|| IoError::UnknownExtension(path.display().to_string()))?;

        self.writers
            .iter()
            .find(|w| w.supports_extension(ext))
            .map(|w| w.as_ref())
            .ok_or_else(|| IoError::UnsupportedFormat(ext.to_string()))
    }

    /// Read a board, picking the reader from the file extension
    pub fn load_board(&self, path: &Path) -> IoResult<Board> {
        self.reader_for_path(path)?.read(path)
    }

    /// Write a board back in the format its extension names
    pub fn save_board(&self, board: &Board, path: &Path) -> IoResult<()> {
        self.writer_for_path(path)?.write(board, path)
    }
}
