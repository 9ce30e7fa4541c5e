//! Unified error types for chatrace.
//!
//! Every fallible operation in the library returns [`ChatraceError`] through
//! the [`Result`] alias. Per-line parse failures are deliberately *not* part
//! of this enum: a bad export line is skipped and reported through
//! [`LineError`], it never aborts a run.
//!
//! # Error Handling Philosophy
//!
//! - **Library users** get typed errors they can match on
//! - **Application users** get clear, actionable error messages
//! - **Developers** get source error chains for debugging

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A specialized [`Result`] type for chatrace operations.
///
/// # Example
///
/// ```rust
/// use chatrace::error::Result;
/// use chatrace::Message;
///
/// fn my_function() -> Result<Vec<Message>> {
///     Ok(vec![])
/// }
/// ```
pub type Result<T> = std::result::Result<T, ChatraceError>;

/// The error type for all chatrace operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChatraceError {
    /// An I/O error occurred.
    ///
    /// This typically happens when:
    /// - The export or a config file doesn't exist
    /// - An output directory cannot be created
    /// - Disk is full (when writing output)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A YAML document could not be parsed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// A configuration or mapping file is structurally valid YAML but its
    /// contents are unusable.
    #[error("Invalid configuration{}: {message}", path.as_ref().map(|p| format!(" (file: {})", p.display())).unwrap_or_default())]
    Config {
        /// The offending file, if known
        path: Option<PathBuf>,
        /// Description of what's wrong
        message: String,
    },

    /// Invalid absolute start date.
    ///
    /// Start dates expect YYYY-MM-DD format.
    #[error("Invalid date '{input}'. Expected format: {expected}")]
    InvalidDate {
        /// The invalid date string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// Invalid relative lookback period.
    #[error("Invalid period '{input}'. Expected format: {expected}")]
    InvalidPeriod {
        /// The invalid period string that was provided
        input: String,
        /// Expected format description
        expected: &'static str,
    },

    /// CSV writing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet writing error.
    #[cfg(feature = "xlsx-output")]
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Columnar snapshot writing error.
    #[cfg(feature = "parquet-output")]
    #[error("Parquet error: {0}")]
    Parquet(#[from] polars::prelude::PolarsError),

    /// The requested output format was not compiled in.
    #[error("Output format '{format}' is not available (enable the `{feature}` feature)")]
    UnsupportedFormat {
        /// The format that was requested
        format: &'static str,
        /// The cargo feature that provides it
        feature: &'static str,
    },

    /// The bar-chart-race renderer failed or is not configured.
    #[error("Render error: {0}")]
    Render(String),
}

/// Why a single export line was skipped.
///
/// Produced by the line parser for every line that does not match
/// `<timestamp> - <sender>: <message>`. These never abort a run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LineError {
    /// The line has no `" - "` separator (blank lines, continuation lines of
    /// multi-line messages).
    #[error("missing ' - ' separator")]
    MissingSeparator,

    /// The timestamp segment does not match the export's date format.
    #[error("invalid timestamp '{text}': {source}")]
    InvalidTimestamp {
        /// The timestamp segment as found in the line
        text: String,
        /// The underlying chrono error
        #[source]
        source: chrono::format::ParseError,
    },
}

// ============================================================================
// Convenience constructors
// ============================================================================

impl ChatraceError {
    /// Creates a configuration error.
    pub fn config(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        ChatraceError::Config {
            path,
            message: message.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(input: impl Into<String>) -> Self {
        ChatraceError::InvalidDate {
            input: input.into(),
            expected: "YYYY-MM-DD",
        }
    }

    /// Creates an invalid period error.
    pub fn invalid_period(input: impl Into<String>) -> Self {
        ChatraceError::InvalidPeriod {
            input: input.into(),
            expected: "<integer><y|m|d>, e.g. 6m, 1y, 30d",
        }
    }

    /// Creates an unsupported format error.
    pub fn unsupported_format(format: &'static str, feature: &'static str) -> Self {
        ChatraceError::UnsupportedFormat { format, feature }
    }

    /// Creates a render error.
    pub fn render(message: impl Into<String>) -> Self {
        ChatraceError::Render(message.into())
    }

    /// Returns `true` if this is an IO error.
    pub fn is_io(&self) -> bool {
        matches!(self, ChatraceError::Io(_))
    }

    /// Returns `true` if this error came from loading a config or mapping
    /// file.
    pub fn is_config(&self) -> bool {
        matches!(self, ChatraceError::Config { .. } | ChatraceError::Yaml(_))
    }

    /// Returns `true` if this is a date-related error.
    pub fn is_invalid_date(&self) -> bool {
        matches!(self, ChatraceError::InvalidDate { .. })
    }

    /// Returns `true` if this is a period-related error.
    pub fn is_invalid_period(&self) -> bool {
        matches!(self, ChatraceError::InvalidPeriod { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = ChatraceError::from(io_err);
        let display = err.to_string();
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_config_error_with_path() {
        let err = ChatraceError::config(
            Some(PathBuf::from("/etc/chatrace.yaml")),
            "truncate_names_chars must be positive",
        );
        let display = err.to_string();
        assert!(display.contains("/etc/chatrace.yaml"));
        assert!(display.contains("truncate_names_chars"));
    }

    #[test]
    fn test_config_error_without_path() {
        let err = ChatraceError::config(None, "bad");
        assert!(!err.to_string().contains("file:"));
    }

    #[test]
    fn test_invalid_date_display() {
        let err = ChatraceError::invalid_date("not-a-date");
        let display = err.to_string();
        assert!(display.contains("not-a-date"));
        assert!(display.contains("YYYY-MM-DD"));
    }

    #[test]
    fn test_invalid_period_display() {
        let err = ChatraceError::invalid_period("3w");
        let display = err.to_string();
        assert!(display.contains("3w"));
        assert!(display.contains("30d"));
    }

    #[test]
    fn test_unsupported_format_display() {
        let err = ChatraceError::unsupported_format("xlsx", "xlsx-output");
        assert!(err.to_string().contains("xlsx-output"));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_err = serde_yml::from_str::<Vec<u32>>("{ not: [a list").unwrap_err();
        let err: ChatraceError = yaml_err.into();
        assert!(err.is_config());
        assert!(err.to_string().contains("YAML error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid").unwrap_err();
        let err: ChatraceError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = ChatraceError::from(io_err);
        assert!(err.source().is_some());
    }

    #[test]
    fn test_is_methods() {
        let io_err = ChatraceError::Io(io::Error::new(io::ErrorKind::NotFound, ""));
        assert!(io_err.is_io());
        assert!(!io_err.is_config());
        assert!(!io_err.is_invalid_date());

        let date_err = ChatraceError::invalid_date("bad");
        assert!(date_err.is_invalid_date());
        assert!(!date_err.is_invalid_period());

        let period_err = ChatraceError::invalid_period("bad");
        assert!(period_err.is_invalid_period());
    }

    #[test]
    fn test_line_error_display() {
        let source = chrono::NaiveDateTime::parse_from_str("garbage", "%m/%d/%y, %H:%M")
            .unwrap_err();
        let err = LineError::InvalidTimestamp {
            text: "garbage".into(),
            source,
        };
        assert!(err.to_string().contains("garbage"));
        assert_eq!(
            LineError::MissingSeparator.to_string(),
            "missing ' - ' separator"
        );
    }
}
