//! Output format writers.
//!
//! Every writer takes a [`Table`](crate::core::table::Table):
//! - [`write_parquet`] - columnar snapshot - requires `parquet-output` feature
//! - [`write_xlsx`] / [`write_xlsx_sheets`] - spreadsheet, one sheet per table - requires `xlsx-output` feature
//! - [`write_csv`] / [`to_csv`] - CSV with semicolon delimiter, always available
//!
//! # Example
//!
//! ```rust,no_run
//! # fn main() -> chatrace::Result<()> {
//! use chatrace::core::aggregate::summarize;
//! use chatrace::core::output::write_csv;
//! use chatrace::core::table::Table;
//!
//! let table = Table::from_summary("all", &summarize(&[]));
//! write_csv(&table, "summary.csv".as_ref())?;
//! # Ok(())
//! # }
//! ```

mod csv_writer;
#[cfg(feature = "parquet-output")]
mod parquet_writer;
#[cfg(feature = "xlsx-output")]
mod xlsx_writer;

pub use csv_writer::{to_csv, write_csv};
#[cfg(feature = "parquet-output")]
pub use parquet_writer::{to_dataframe, write_parquet};
#[cfg(feature = "xlsx-output")]
pub use xlsx_writer::{write_xlsx, write_xlsx_sheets};
