//! # Chatrace
//!
//! A Rust library for turning WhatsApp "export chat" text files into
//! per-author message tables and a bar-chart race of message counts.
//!
//! ## Overview
//!
//! A run is a single forward pass:
//!
//! 1. **Parse** - each export line becomes a [`Message`]; bad lines are
//!    skipped and logged
//! 2. **Normalize** - name mapping, truncation, skip words, anonymization,
//!    period and start-date filters
//! 3. **Aggregate** - author totals with percentage share, and a cumulative
//!    per-day pivot
//! 4. **Persist** - Parquet, XLSX and CSV tables
//! 5. **Visualize** - optionally hand the pivot to an external bar-chart-race
//!    renderer
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatrace::prelude::*;
//! use chrono::Local;
//!
//! fn main() -> Result<()> {
//!     let config = Config::load("configs/default_config.yaml")?;
//!     let options = RunOptions::new().with_period(Some("6m".parse()?));
//!
//!     let report = Pipeline::new(config).run(
//!         "family",
//!         "exports/family.txt".as_ref(),
//!         &options,
//!         Local::now().naive_local(),
//!     )?;
//!     println!("{} records written as {}", report.records, report.stem);
//!     Ok(())
//! }
//! ```
//!
//! ## Using the stages directly
//!
//! ```rust
//! use chatrace::prelude::*;
//!
//! let export = "header\n12/01/23, 10:00 - Alice: hi\n12/01/23, 10:05 - Bob: hey\n";
//! let parsed = ExportParser::new().parse_str(export);
//! let now = parsed.messages[0].timestamp;
//!
//! let normalized = normalize(parsed.messages, &NormalizeOptions::new(), "demo", now)?;
//! let table = pivot(&normalized.records);
//! assert_eq!(table.senders(), ["Alice", "Bob"]);
//! # Ok::<(), chatrace::ChatraceError>(())
//! ```
//!
//! ## Module Structure
//!
//! - [`parser`] - [`ExportParser`](parser::ExportParser), whole-file parsing
//! - [`parsing`] - single-line parsing and permissive decoding
//! - [`core`] - normalization, aggregation, tables and writers
//! - [`format`] - [`OutputFormat`](format::OutputFormat) and write dispatch
//! - [`race`] - race configuration, frames and the renderer seam
//! - [`config`] - YAML configuration and name maps
//! - [`pipeline`] - the end-to-end run
//! - [`error`] - [`ChatraceError`], [`Result`]
//! - [`prelude`] - Convenient re-exports

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod format;
pub mod message;
pub mod parser;
pub mod parsing;
pub mod pipeline;
pub mod prompt;
pub mod race;

// Re-export the main types at the crate root for convenience
pub use error::{ChatraceError, Result};
pub use message::{Message, Record};

/// Convenient re-exports for common usage.
///
/// ```rust
/// use chatrace::prelude::*;
/// ```
pub mod prelude {
    // Core message types
    pub use crate::{Message, Record};

    // Error types
    pub use crate::error::{ChatraceError, Result};

    // Parsing
    pub use crate::parser::{ExportParser, ParsedExport};

    // Configuration
    pub use crate::config::{Config, NameMap};

    // Processing
    pub use crate::core::{
        AuthorSummary, NormalizeOptions, Period, PivotTable, Table, normalize, pivot, summarize,
        window_summaries,
    };

    // Output
    pub use crate::format::{OutputFormat, write_table};

    // Visualization
    pub use crate::race::{CommandRenderer, RaceConfig, RaceRenderer, race_frames};

    // Pipeline
    pub use crate::pipeline::{Pipeline, RunOptions, RunReport};
}
