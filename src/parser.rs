//! Export file parser.
//!
//! [`ExportParser`] turns the text of a chat export into [`Message`]s. Parsing
//! is best-effort: every line that fails to parse is skipped, logged, and
//! recorded in [`ParsedExport::skipped`]; the run never aborts on a bad line.
//! Continuation lines of multi-line messages and system notices in unexpected
//! formats are dropped this way.
//!
//! # Example
//!
//! ```rust
//! use chatrace::parser::ExportParser;
//!
//! let export = "header line\n\
//!               12/01/23, 10:00 - Alice: hi\n\
//!               12/01/23, 10:05 - Bob: hey\n\
//!               and this continues Bob's message\n";
//!
//! let parsed = ExportParser::new().parse_str(export);
//! assert_eq!(parsed.messages.len(), 2);
//! assert_eq!(parsed.skipped.len(), 1);
//! assert_eq!(parsed.skipped[0].line_number, 4);
//! ```

use std::fs;
use std::path::Path;
use std::str::Lines;

use tracing::{debug, error, info};

use crate::Message;
use crate::error::{ChatraceError, LineError};
use crate::parsing::line::{DEFAULT_TIMESTAMP_FORMAT, decode_permissive, parse_line};

/// A line that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the export file (the header is line 1).
    pub line_number: usize,
    /// The raw line text.
    pub content: String,
    /// Why the line was rejected.
    pub reason: LineError,
}

/// Result of parsing a whole export.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    /// Successfully parsed messages, in file order.
    pub messages: Vec<Message>,
    /// Lines that were dropped.
    pub skipped: Vec<SkippedLine>,
}

impl ParsedExport {
    /// Total number of data lines seen (header excluded).
    pub fn total_lines(&self) -> usize {
        self.messages.len() + self.skipped.len()
    }
}

/// Parser for exported chat-log text.
///
/// The first line of an export is a header and is always discarded.
#[derive(Debug, Clone)]
pub struct ExportParser {
    timestamp_format: String,
}

impl ExportParser {
    /// Creates a parser for the default `%m/%d/%y, %H:%M` timestamp format.
    pub fn new() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// Creates a parser for a custom chrono timestamp format.
    pub fn with_timestamp_format(format: impl Into<String>) -> Self {
        Self {
            timestamp_format: format.into(),
        }
    }

    /// Returns the timestamp format in use.
    pub fn timestamp_format(&self) -> &str {
        &self.timestamp_format
    }

    /// Lazily parses the lines of `content`, header skipped.
    ///
    /// Yields one result per data line, in order.
    pub fn lines<'a>(&'a self, content: &'a str) -> LineResults<'a> {
        let mut lines = content.lines();
        lines.next();
        LineResults {
            lines,
            line_number: 1,
            format: &self.timestamp_format,
        }
    }

    /// Parses export text, collecting messages and skipped lines.
    ///
    /// Each skipped line is logged at error level.
    pub fn parse_str(&self, content: &str) -> ParsedExport {
        let mut parsed = ParsedExport::default();

        for (line_number, line, result) in self.lines(content) {
            match result {
                Ok(msg) => parsed.messages.push(msg),
                Err(reason) => {
                    error!(line = line_number, error = %reason, "skipping line: {}", line.trim());
                    parsed.skipped.push(SkippedLine {
                        line_number,
                        content: line.to_string(),
                        reason,
                    });
                }
            }
        }

        debug!(
            messages = parsed.messages.len(),
            skipped = parsed.skipped.len(),
            "parsed export text"
        );
        parsed
    }

    /// Reads and parses an export file.
    ///
    /// Undecodable bytes are escaped rather than rejected, so only I/O
    /// failures are errors.
    pub fn parse(&self, path: &Path) -> Result<ParsedExport, ChatraceError> {
        let bytes = fs::read(path)?;
        let content = decode_permissive(&bytes);
        let parsed = self.parse_str(&content);
        info!(
            path = %path.display(),
            messages = parsed.messages.len(),
            skipped = parsed.skipped.len(),
            "parsed export"
        );
        Ok(parsed)
    }
}

impl Default for ExportParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over per-line parse results.
///
/// Items are `(line_number, raw_line, result)`.
pub struct LineResults<'a> {
    lines: Lines<'a>,
    line_number: usize,
    format: &'a str,
}

impl<'a> Iterator for LineResults<'a> {
    type Item = (usize, &'a str, Result<Message, LineError>);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some((self.line_number, line, parse_line(line, self.format)))
    }
}
