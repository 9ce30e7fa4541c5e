//! Shared parsing utilities.
//!
//! Line splitting, timestamp parsing and permissive decoding used by
//! [`ExportParser`](crate::parser::ExportParser).

pub mod line;

pub use line::{
    DEFAULT_TIMESTAMP_FORMAT, decode_permissive, parse_line, parse_timestamp, split_line,
};
