//! Per-author totals and the cumulative daily pivot.
//!
//! Two independent summaries over the same normalized records:
//!
//! - [`summarize`] - total messages per author with percentage share
//! - [`pivot`] - dates × authors table of cumulative message counts, the
//!   input of the bar-chart race
//!
//! Both return empty results for empty input.
//!
//! # Example
//!
//! ```
//! use chatrace::core::aggregate::{pivot, summarize};
//! use chatrace::message::Record;
//! use chrono::NaiveDate;
//!
//! let day = |d| NaiveDate::from_ymd_opt(2023, 12, d).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let records = vec![
//!     Record::new(day(1), "Alice", "hi"),
//!     Record::new(day(1), "Bob", "hey"),
//!     Record::new(day(2), "Alice", "yo"),
//! ];
//!
//! let summary = summarize(&records);
//! assert_eq!(summary[0].sender, "Alice");
//! assert_eq!(summary[0].percentage, 66.7);
//!
//! let table = pivot(&records);
//! assert_eq!(table.column("Bob"), Some(vec![1, 1]));
//! ```

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::core::period::Period;
use crate::message::Record;

/// Messages per (date, author) with the author's running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    /// Calendar date.
    pub date: NaiveDate,
    /// Author.
    pub sender: String,
    /// Messages sent by `sender` on `date`.
    pub daily_count: u64,
    /// Messages sent by `sender` up to and including `date`.
    pub cumulative_count: u64,
}

/// One row of the total summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorSummary {
    /// Author.
    pub sender: String,
    /// Total messages.
    pub total_count: u64,
    /// Share of all messages, 0–100.
    pub percentage: f64,
}

/// A summary restricted to one lookback window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowSummary {
    /// `all`, or the window's period notation (e.g. `30d`).
    pub label: String,
    /// Summary rows for the window.
    pub rows: Vec<AuthorSummary>,
}

/// Wide table of cumulative counts: one row per date, one column per author.
///
/// Dates are unique and ascending. Every cell is filled; see [`pivot`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PivotTable {
    dates: Vec<NaiveDate>,
    senders: Vec<String>,
    /// Row-major: `values[row][col]`.
    values: Vec<Vec<u64>>,
}

impl PivotTable {
    /// Row index (dates), ascending.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column names (authors), in column order.
    pub fn senders(&self) -> &[String] {
        &self.senders
    }

    /// Cells of one row.
    pub fn row(&self, index: usize) -> Option<&[u64]> {
        self.values.get(index).map(Vec::as_slice)
    }

    /// Iterates `(date, row)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[u64])> {
        self.dates
            .iter()
            .copied()
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// All values of one author's column, top to bottom.
    pub fn column(&self, sender: &str) -> Option<Vec<u64>> {
        let col = self.senders.iter().position(|s| s == sender)?;
        Some(self.values.iter().map(|row| row[col]).collect())
    }

    /// Returns `true` if there are no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Groups records by (date, author), sorted by date then author, with
/// per-author running totals.
pub fn daily_counts(records: &[Record]) -> Vec<DailyCount> {
    let mut per_day: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for record in records {
        *per_day.entry((record.date, record.sender.as_str())).or_insert(0) += 1;
    }

    let mut running: HashMap<&str, u64> = HashMap::new();
    per_day
        .into_iter()
        .map(|((date, sender), daily_count)| {
            let total = running.entry(sender).or_insert(0);
            *total += daily_count;
            DailyCount {
                date,
                sender: sender.to_string(),
                daily_count,
                cumulative_count: *total,
            }
        })
        .collect()
}

/// Builds the cumulative pivot table.
///
/// Authors appear as columns in order of first activity (ties by name).
/// Cells without a daily entry are filled backward from the nearest later
/// value, then forward from the nearest earlier value: before an author's
/// first active date the column holds their first cumulative count, gaps
/// between active dates take the next count, and after their last active
/// date the column holds their final count.
pub fn pivot(records: &[Record]) -> PivotTable {
    let counts = daily_counts(records);
    if counts.is_empty() {
        return PivotTable::default();
    }

    let mut dates: Vec<NaiveDate> = counts.iter().map(|c| c.date).collect();
    dates.dedup();

    let mut senders: Vec<String> = Vec::new();
    let mut sender_index: HashMap<&str, usize> = HashMap::new();
    for count in &counts {
        if !sender_index.contains_key(count.sender.as_str()) {
            sender_index.insert(count.sender.as_str(), senders.len());
            senders.push(count.sender.clone());
        }
    }

    let date_index: HashMap<NaiveDate, usize> =
        dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

    let mut columns: Vec<Vec<Option<u64>>> = vec![vec![None; dates.len()]; senders.len()];
    for count in &counts {
        let col = sender_index[count.sender.as_str()];
        let row = date_index[&count.date];
        columns[col][row] = Some(count.cumulative_count);
    }

    for column in &mut columns {
        fill_backward(column);
        fill_forward(column);
    }

    let values = (0..dates.len())
        .map(|row| {
            columns
                .iter()
                .map(|column| column[row].unwrap_or(0))
                .collect()
        })
        .collect();

    PivotTable {
        dates,
        senders,
        values,
    }
}

/// Replaces each `None` with the nearest later `Some`.
pub fn fill_backward<T: Copy>(values: &mut [Option<T>]) {
    let mut next = None;
    for value in values.iter_mut().rev() {
        match value {
            Some(v) => next = Some(*v),
            None => *value = next,
        }
    }
}

/// Replaces each `None` with the nearest earlier `Some`.
pub fn fill_forward<T: Copy>(values: &mut [Option<T>]) {
    let mut prev = None;
    for value in values.iter_mut() {
        match value {
            Some(v) => prev = Some(*v),
            None => *value = prev,
        }
    }
}

/// Total messages per author, percentage rounded to one decimal.
pub fn summarize(records: &[Record]) -> Vec<AuthorSummary> {
    summarize_with_precision(records, 1)
}

/// Total messages per author, percentage rounded to `decimals` places.
///
/// Sorted by count descending, ties by name ascending.
pub fn summarize_with_precision(records: &[Record], decimals: u32) -> Vec<AuthorSummary> {
    let mut totals: HashMap<&str, u64> = HashMap::new();
    for record in records {
        *totals.entry(record.sender.as_str()).or_insert(0) += 1;
    }

    let grand_total: u64 = totals.values().sum();
    let mut rows: Vec<AuthorSummary> = totals
        .into_iter()
        .map(|(sender, total_count)| AuthorSummary {
            sender: sender.to_string(),
            total_count,
            percentage: round_to(total_count as f64 / grand_total as f64 * 100.0, decimals),
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| a.sender.cmp(&b.sender))
    });
    rows
}

/// Summaries for the whole record set plus each lookback window.
///
/// The first entry is always labelled `all`.
pub fn window_summaries(
    records: &[Record],
    windows: &[Period],
    now: NaiveDateTime,
) -> Vec<WindowSummary> {
    let mut summaries = vec![WindowSummary {
        label: "all".to_string(),
        rows: summarize(records),
    }];

    for window in windows {
        let cutoff = window.cutoff(now);
        let recent: Vec<Record> = records
            .iter()
            .filter(|r| r.timestamp > cutoff)
            .cloned()
            .collect();
        summaries.push(WindowSummary {
            label: window.to_string(),
            rows: summarize(&recent),
        });
    }

    summaries
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, d).unwrap()
    }

    fn rec(sender: &str, ts: NaiveDateTime) -> Record {
        Record::new(ts, sender, "")
    }

    fn scenario() -> Vec<Record> {
        vec![
            rec("Alice", at(12, 1, 10)),
            rec("Bob", at(12, 1, 10)),
            rec("Alice", at(12, 2, 9)),
        ]
    }

    #[test]
    fn test_summary_scenario() {
        let summary = summarize(&scenario());
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].sender, "Alice");
        assert_eq!(summary[0].total_count, 2);
        assert_eq!(summary[0].percentage, 66.7);
        assert_eq!(summary[1].sender, "Bob");
        assert_eq!(summary[1].total_count, 1);
        assert_eq!(summary[1].percentage, 33.3);
    }

    #[test]
    fn test_summary_precision() {
        let summary = summarize_with_precision(&scenario(), 2);
        assert_eq!(summary[0].percentage, 66.67);
        assert_eq!(summary[1].percentage, 33.33);
    }

    #[test]
    fn test_summary_ties_sorted_by_name() {
        let records = vec![rec("Zed", at(1, 1, 1)), rec("Amy", at(1, 1, 2))];
        let summary = summarize(&records);
        assert_eq!(summary[0].sender, "Amy");
        assert_eq!(summary[1].sender, "Zed");
    }

    #[test]
    fn test_daily_counts_cumulative() {
        let records = vec![
            rec("Alice", at(12, 1, 10)),
            rec("Alice", at(12, 1, 11)),
            rec("Bob", at(12, 2, 10)),
            rec("Alice", at(12, 3, 10)),
        ];
        let counts = daily_counts(&records);
        assert_eq!(
            counts,
            vec![
                DailyCount {
                    date: date(12, 1),
                    sender: "Alice".into(),
                    daily_count: 2,
                    cumulative_count: 2
                },
                DailyCount {
                    date: date(12, 2),
                    sender: "Bob".into(),
                    daily_count: 1,
                    cumulative_count: 1
                },
                DailyCount {
                    date: date(12, 3),
                    sender: "Alice".into(),
                    daily_count: 1,
                    cumulative_count: 3
                },
            ]
        );
    }

    #[test]
    fn test_pivot_scenario() {
        let table = pivot(&scenario());
        assert_eq!(table.dates(), [date(12, 1), date(12, 2)]);
        assert_eq!(table.senders(), ["Alice", "Bob"]);
        assert_eq!(table.row(0), Some([1, 1].as_slice()));
        assert_eq!(table.row(1), Some([2, 1].as_slice()));
    }

    #[test]
    fn test_pivot_backward_and_forward_fill() {
        let records = vec![
            rec("Alice", at(12, 1, 10)),
            rec("Alice", at(12, 2, 10)),
            rec("Bob", at(12, 3, 10)),
            rec("Bob", at(12, 3, 11)),
            rec("Alice", at(12, 4, 10)),
        ];
        let table = pivot(&records);
        assert_eq!(table.senders(), ["Alice", "Bob"]);
        // Interior gaps take the next known value, backward fill runs first.
        assert_eq!(table.column("Alice"), Some(vec![1, 2, 3, 3]));
        assert_eq!(table.column("Bob"), Some(vec![2, 2, 2, 2]));
    }

    #[test]
    fn test_pivot_column_order_is_first_activity() {
        let records = vec![
            rec("Zed", at(12, 1, 10)),
            rec("Amy", at(12, 2, 10)),
            rec("Bea", at(12, 1, 11)),
        ];
        let table = pivot(&records);
        assert_eq!(table.senders(), ["Bea", "Zed", "Amy"]);
    }

    #[test]
    fn test_pivot_columns_non_decreasing() {
        let records: Vec<Record> = (1..=20)
            .map(|i| {
                let sender = ["A", "B", "C"][i as usize % 3];
                rec(sender, at(11, 1 + (i * 7) % 28, 10))
            })
            .collect();
        let table = pivot(&records);
        for sender in table.senders() {
            let column = table.column(sender).unwrap();
            assert!(column.windows(2).all(|w| w[0] <= w[1]), "{sender}: {column:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(pivot(&[]).is_empty());
        assert!(pivot(&[]).senders().is_empty());
        assert!(summarize(&[]).is_empty());
        assert!(daily_counts(&[]).is_empty());
    }

    #[test]
    fn test_fill_helpers() {
        let mut values = vec![None, Some(3), None, None, Some(5), None];
        fill_backward(&mut values);
        assert_eq!(values, [Some(3), Some(3), Some(5), Some(5), Some(5), None]);
        fill_forward(&mut values);
        assert_eq!(values, [Some(3), Some(3), Some(5), Some(5), Some(5), Some(5)]);
    }

    #[test]
    fn test_window_summaries() {
        let now = at(12, 31, 12);
        let records = vec![
            rec("Alice", at(6, 1, 10)),
            rec("Alice", at(12, 20, 10)),
            rec("Bob", at(12, 21, 10)),
            rec("Bob", at(12, 22, 10)),
        ];
        let summaries = window_summaries(&records, &[Period::days(30)], now);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].label, "all");
        assert_eq!(summaries[0].rows[0].total_count, 2);
        assert_eq!(summaries[1].label, "30d");
        assert_eq!(summaries[1].rows[0].sender, "Bob");
        assert_eq!(summaries[1].rows[0].total_count, 2);
        assert_eq!(summaries[1].rows[1].total_count, 1);
    }
}
