//! Columnar tables handed to the output writers.
//!
//! Every persisted artifact (normalized records, the pivot, each summary) is
//! converted into a [`Table`] first, so the writers only deal with one
//! shape: an ordered list of named, typed, equal-length columns.

use chrono::{NaiveDate, NaiveDateTime};

use crate::core::aggregate::{AuthorSummary, PivotTable};
use crate::message::{Message, Record};

/// Date column leading every pivot table.
pub const PIVOT_INDEX: &str = "dt_date";

/// Typed values of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Free text.
    Text(Vec<String>),
    /// Non-negative counts.
    Count(Vec<u64>),
    /// Floating point values.
    Float(Vec<f64>),
    /// Calendar dates.
    Date(Vec<NaiveDate>),
    /// Timestamps without zone.
    DateTime(Vec<NaiveDateTime>),
}

impl ColumnValues {
    /// Number of values.
    pub fn len(&self) -> usize {
        match self {
            ColumnValues::Text(v) => v.len(),
            ColumnValues::Count(v) => v.len(),
            ColumnValues::Float(v) => v.len(),
            ColumnValues::Date(v) => v.len(),
            ColumnValues::DateTime(v) => v.len(),
        }
    }

    /// Returns `true` if the column has no values.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Renders one value as text (used by the CSV writer).
    pub fn display(&self, row: usize) -> Option<String> {
        match self {
            ColumnValues::Text(v) => v.get(row).cloned(),
            ColumnValues::Count(v) => v.get(row).map(u64::to_string),
            ColumnValues::Float(v) => v.get(row).map(f64::to_string),
            ColumnValues::Date(v) => v.get(row).map(|d| d.format("%Y-%m-%d").to_string()),
            ColumnValues::DateTime(v) => {
                v.get(row).map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            }
        }
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Header.
    pub name: String,
    /// Values.
    pub values: ColumnValues,
}

impl Column {
    /// Creates a column.
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// An ordered list of equal-length columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Sheet/table name.
    pub name: String,
    columns: Vec<Column>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    ///
    /// # Panics
    ///
    /// Panics if the column length differs from the existing columns.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        if let Some(first) = self.columns.first() {
            assert_eq!(
                first.values.len(),
                column.values.len(),
                "column '{}' length mismatch",
                column.name
            );
        }
        self.columns.push(column);
        self
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column headers in order.
    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Looks up a column by header.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Normalized (or raw parsed) records: `dt`, `dt_date`, `name`, `msg`.
    pub fn from_records(name: impl Into<String>, records: &[Record]) -> Self {
        Table::new(name)
            .with_column(Column::new(
                "dt",
                ColumnValues::DateTime(records.iter().map(|r| r.timestamp).collect()),
            ))
            .with_column(Column::new(
                "dt_date",
                ColumnValues::Date(records.iter().map(|r| r.date).collect()),
            ))
            .with_column(Column::new(
                "name",
                ColumnValues::Text(records.iter().map(|r| r.sender.clone()).collect()),
            ))
            .with_column(Column::new(
                "msg",
                ColumnValues::Text(records.iter().map(|r| r.content.clone()).collect()),
            ))
    }

    /// Parsed messages: `dt`, `name`, `msg`.
    pub fn from_messages(name: impl Into<String>, messages: &[Message]) -> Self {
        Table::new(name)
            .with_column(Column::new(
                "dt",
                ColumnValues::DateTime(messages.iter().map(|m| m.timestamp).collect()),
            ))
            .with_column(Column::new(
                "name",
                ColumnValues::Text(messages.iter().map(|m| m.sender.clone()).collect()),
            ))
            .with_column(Column::new(
                "msg",
                ColumnValues::Text(messages.iter().map(|m| m.content.clone()).collect()),
            ))
    }

    /// Cumulative pivot: `dt_date` followed by one count column per author.
    ///
    /// An author whose name clashes with an earlier column gets `_`
    /// appended until the header is unique.
    pub fn from_pivot(name: impl Into<String>, pivot: &PivotTable) -> Self {
        let mut table = Table::new(name).with_column(Column::new(
            PIVOT_INDEX,
            ColumnValues::Date(pivot.dates().to_vec()),
        ));
        for (col, sender) in pivot.senders().iter().enumerate() {
            let mut header = sender.clone();
            while table.column(&header).is_some() {
                header.push('_');
            }
            let values = pivot.rows().map(|(_, row)| row[col]).collect();
            table = table.with_column(Column::new(header, ColumnValues::Count(values)));
        }
        table
    }

    /// Author summary: `name`, `qtde_msgs`, `perc`.
    pub fn from_summary(name: impl Into<String>, rows: &[AuthorSummary]) -> Self {
        Table::new(name)
            .with_column(Column::new(
                "name",
                ColumnValues::Text(rows.iter().map(|r| r.sender.clone()).collect()),
            ))
            .with_column(Column::new(
                "qtde_msgs",
                ColumnValues::Count(rows.iter().map(|r| r.total_count).collect()),
            ))
            .with_column(Column::new(
                "perc",
                ColumnValues::Float(rows.iter().map(|r| r.percentage).collect()),
            ))
    }
}
