//! Output format selection.
//!
//! # Example
//!
//! ```rust
//! use chatrace::format::OutputFormat;
//!
//! let format: OutputFormat = "xlsx".parse().unwrap();
//! assert_eq!(format.extension(), "xlsx");
//! assert_eq!(OutputFormat::from_path("records.parquet").unwrap(), OutputFormat::Parquet);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::table::Table;
use crate::error::ChatraceError;

/// Output format for persisted tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum OutputFormat {
    /// Columnar Parquet file
    Parquet,

    /// Excel workbook
    Xlsx,

    /// CSV with semicolon delimiter
    Csv,
}

impl OutputFormat {
    /// Returns the file extension for this format (without dot).
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Parquet => "parquet",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }

    /// Returns all supported format names.
    pub fn all_names() -> &'static [&'static str] {
        &["parquet", "xlsx", "csv"]
    }

    /// Formats written when the configuration names none.
    pub fn defaults() -> Vec<OutputFormat> {
        vec![OutputFormat::Parquet, OutputFormat::Xlsx]
    }

    /// The cargo feature that provides this format, if any.
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Parquet => Some("parquet-output"),
            OutputFormat::Xlsx => Some("xlsx-output"),
            OutputFormat::Csv => None,
        }
    }

    /// Returns `true` if the writer for this format was compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            OutputFormat::Parquet => cfg!(feature = "parquet-output"),
            OutputFormat::Xlsx => cfg!(feature = "xlsx-output"),
            OutputFormat::Csv => true,
        }
    }

    /// Detects format from a file path based on extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, String> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        ext.parse()
    }

    /// `<dir>/<stem>.<ext>`.
    pub fn path_for(&self, dir: &Path, stem: &str) -> PathBuf {
        dir.join(format!("{stem}.{}", self.extension()))
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Parquet => write!(f, "Parquet"),
            OutputFormat::Xlsx => write!(f, "XLSX"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "parquet" => Ok(OutputFormat::Parquet),
            "xlsx" => Ok(OutputFormat::Xlsx),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!(
                "Unknown format: '{}'. Expected one of: {}",
                s,
                OutputFormat::all_names().join(", ")
            )),
        }
    }
}

/// Writes a table to `path` in the specified format.
///
/// # Errors
///
/// Returns an error if:
/// - The required feature for the format is not enabled
/// - The file cannot be written
pub fn write_table(table: &Table, path: &Path, format: OutputFormat) -> Result<(), ChatraceError> {
    match format {
        #[cfg(feature = "parquet-output")]
        OutputFormat::Parquet => crate::core::output::write_parquet(table, path),
        #[cfg(feature = "xlsx-output")]
        OutputFormat::Xlsx => crate::core::output::write_xlsx(table, path),
        OutputFormat::Csv => crate::core::output::write_csv(table, path),
        #[allow(unreachable_patterns)]
        other => Err(ChatraceError::unsupported_format(
            other.extension(),
            other.feature().unwrap_or("full"),
        )),
    }
}

/// Writes several tables into one XLSX workbook, one sheet each.
///
/// # Errors
///
/// Returns [`ChatraceError::UnsupportedFormat`] without the `xlsx-output`
/// feature.
#[allow(unused_variables)]
pub fn write_workbook(tables: &[Table], path: &Path) -> Result<(), ChatraceError> {
    #[cfg(feature = "xlsx-output")]
    {
        crate::core::output::write_xlsx_sheets(tables, path)
    }
    #[cfg(not(feature = "xlsx-output"))]
    {
        Err(ChatraceError::unsupported_format("xlsx", "xlsx-output"))
    }
}
