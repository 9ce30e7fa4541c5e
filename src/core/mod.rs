//! Core processing logic for chatrace.
//!
//! This module contains:
//! - [`period`] - Lookback periods and start dates
//! - [`normalize`] - Name substitution, filtering and anonymization
//! - [`aggregate`] - Author summaries and the cumulative daily pivot
//! - [`table`] - Columnar tables handed to the writers
//! - [`output`] - Format writers (Parquet, XLSX, CSV)
//!
//! # Quick Start
//!
//! ```rust
//! use chatrace::core::{NormalizeOptions, normalize, pivot, summarize};
//! use chatrace::Message;
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let messages = vec![Message::new(ts, "Alice", "hi")];
//!
//! let normalized = normalize(messages, &NormalizeOptions::new(), "family", ts)?;
//! assert_eq!(summarize(&normalized.records)[0].percentage, 100.0);
//! assert_eq!(pivot(&normalized.records).senders(), ["Alice"]);
//! # Ok::<(), chatrace::ChatraceError>(())
//! ```

pub mod aggregate;
pub mod normalize;
pub mod output;
pub mod period;
pub mod table;

// Re-export main types for convenience
pub use aggregate::{
    AuthorSummary, DailyCount, PivotTable, WindowSummary, daily_counts, pivot, summarize,
    summarize_with_precision, window_summaries,
};
pub use normalize::{NormalizeOptions, Normalized, normalize};
pub use period::{Period, parse_start_date};
pub use table::{Column, ColumnValues, Table};

// Re-export Message from the crate root
pub use crate::Message;
