//! Turn parsed messages into normalized records.
//!
//! Normalization runs a fixed sequence of steps, each over the whole record
//! set before the next begins:
//!
//! | Step | Option | Effect |
//! |------|--------|--------|
//! | 1 | - | derive the calendar date |
//! | 2 | [`name_map`](NormalizeOptions::name_map) | replace exact raw senders with canonical names |
//! | 3 | [`truncate_chars`](NormalizeOptions::truncate_chars) | cut sender names to N characters |
//! | 4 | [`skip_words`](NormalizeOptions::skip_words) | drop records whose sender contains a skip word |
//! | 5 | [`anonymize`](NormalizeOptions::anonymize) | replace senders with `user1`, `user2`, … |
//! | 6 | [`period`](NormalizeOptions::period) | keep records newer than `now - period` |
//! | 7 | [`start_date`](NormalizeOptions::start_date) | keep records strictly after the start date |
//!
//! # Example
//!
//! ```
//! use chatrace::core::normalize::{NormalizeOptions, normalize};
//! use chatrace::Message;
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap().and_hms_opt(10, 0, 0).unwrap();
//! let messages = vec![
//!     Message::new(ts, "+1 555 0100", "hi"),
//!     Message::new(ts, "Security notice", "codes changed"),
//! ];
//!
//! let options = NormalizeOptions::new()
//!     .with_mapping([("+1 555 0100", "Alice")])
//!     .with_skip_words(["notice"]);
//!
//! let normalized = normalize(messages, &options, "family", ts)?;
//! assert_eq!(normalized.records.len(), 1);
//! assert_eq!(normalized.records[0].sender, "Alice");
//! assert_eq!(normalized.stem, "family");
//! # Ok::<(), chatrace::ChatraceError>(())
//! ```

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use tracing::debug;

use crate::Message;
use crate::core::period::Period;
use crate::error::ChatraceError;
use crate::message::Record;

/// Default maximum sender-name length.
pub const DEFAULT_TRUNCATE_CHARS: usize = 20;

/// Options controlling normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Raw sender → canonical name. Senders without an entry are kept.
    pub name_map: HashMap<String, String>,

    /// Maximum sender length in characters.
    pub truncate_chars: usize,

    /// Case-sensitive substrings; a sender containing any of them is dropped.
    pub skip_words: Vec<String>,

    /// Replace sender names with `user<k>` pseudonyms.
    pub anonymize: bool,

    /// Keep only records newer than `now - period`.
    pub period: Option<Period>,

    /// Keep only records strictly after midnight of this date.
    pub start_date: Option<NaiveDate>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            name_map: HashMap::new(),
            truncate_chars: DEFAULT_TRUNCATE_CHARS,
            skip_words: Vec::new(),
            anonymize: false,
            period: None,
            start_date: None,
        }
    }
}

impl NormalizeOptions {
    /// Creates options that only derive dates and truncate names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the name substitution table.
    #[must_use]
    pub fn with_name_map(mut self, name_map: HashMap<String, String>) -> Self {
        self.name_map = name_map;
        self
    }

    /// Adds name substitutions from `(raw, canonical)` pairs.
    #[must_use]
    pub fn with_mapping<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.name_map
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Sets the truncation length.
    #[must_use]
    pub fn with_truncate_chars(mut self, n: usize) -> Self {
        self.truncate_chars = n;
        self
    }

    /// Sets the skip words.
    #[must_use]
    pub fn with_skip_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_words = words.into_iter().map(Into::into).collect();
        self
    }

    /// Enables or disables anonymization.
    #[must_use]
    pub fn with_anonymize(mut self, anonymize: bool) -> Self {
        self.anonymize = anonymize;
        self
    }

    /// Sets the relative lookback period.
    #[must_use]
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Sets the absolute start date.
    #[must_use]
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Sets the absolute start date from a `YYYY-MM-DD` string.
    pub fn with_start_date_str(self, date: &str) -> Result<Self, ChatraceError> {
        Ok(self.with_start_date(crate::core::period::parse_start_date(date)?))
    }

    /// Returns `true` if any time filter is set.
    pub fn has_time_filter(&self) -> bool {
        self.period.is_some() || self.start_date.is_some()
    }

    fn skip_pattern(&self) -> Result<Option<Regex>, ChatraceError> {
        let words: Vec<String> = self
            .skip_words
            .iter()
            .filter(|w| !w.is_empty())
            .map(|w| regex::escape(w))
            .collect();
        if words.is_empty() {
            return Ok(None);
        }
        Regex::new(&words.join("|"))
            .map(Some)
            .map_err(|e| ChatraceError::config(None, format!("invalid skip words: {e}")))
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Retained records, in input order.
    pub records: Vec<Record>,

    /// Output file stem: the project name, suffixed with the applied time
    /// filters (`_period_<Y>y<M>m<D>d`, then `_<YYYYMMDD>`).
    pub stem: String,
}

/// Normalizes `messages` with the fixed step order described in the module
/// docs.
///
/// `now` anchors the relative period filter. An empty result is not an
/// error, even when it comes from contradictory time filters.
pub fn normalize(
    messages: Vec<Message>,
    options: &NormalizeOptions,
    project: &str,
    now: NaiveDateTime,
) -> Result<Normalized, ChatraceError> {
    let skip = options.skip_pattern()?;
    let mut stem = project.to_string();

    // Steps 1-3: date, substitution, truncation.
    let mut records: Vec<Record> = messages
        .into_iter()
        .map(|msg| {
            let mut record = Record::from(msg);
            if let Some(canonical) = options.name_map.get(&record.sender) {
                record.sender.clone_from(canonical);
            }
            truncate_chars(&mut record.sender, options.truncate_chars);
            record
        })
        .collect();

    // Step 4: skip words.
    if let Some(pattern) = &skip {
        let before = records.len();
        records.retain(|r| !pattern.is_match(&r.sender));
        debug!(dropped = before - records.len(), "applied skip words");
    }

    // Step 5: anonymization.
    if options.anonymize {
        let pseudonyms = anonymize(&mut records);
        debug!(senders = pseudonyms.len(), "anonymized senders");
    }

    // Step 6: relative period.
    if let Some(period) = options.period {
        let cutoff = period.cutoff(now);
        records.retain(|r| r.timestamp > cutoff);
        stem = format!("{stem}_{}", period.describe());
        debug!(%cutoff, kept = records.len(), "applied period filter");
    }

    // Step 7: absolute start date.
    if let Some(start) = options.start_date {
        let start_dt = start.and_time(chrono::NaiveTime::MIN);
        records.retain(|r| r.timestamp > start_dt);
        stem = format!("{stem}_{}", start.format("%Y%m%d"));
        debug!(%start, kept = records.len(), "applied start date filter");
    }

    Ok(Normalized { records, stem })
}

/// Truncates `name` in place to at most `max` characters.
pub fn truncate_chars(name: &mut String, max: usize) {
    if let Some((idx, _)) = name.char_indices().nth(max) {
        name.truncate(idx);
    }
}

/// Replaces every sender with a `user<k>` pseudonym.
///
/// Pseudonyms are assigned 1-based in first-seen order over `records`, so
/// the same record sequence always yields the same mapping. Returns the
/// mapping from original name to pseudonym.
pub fn anonymize(records: &mut [Record]) -> HashMap<String, String> {
    let mut pseudonyms: HashMap<String, String> = HashMap::new();
    for record in records.iter_mut() {
        let next = pseudonyms.len() + 1;
        let pseudonym = pseudonyms
            .entry(std::mem::take(&mut record.sender))
            .or_insert_with(|| format!("user{next}"));
        record.sender.clone_from(pseudonym);
    }
    pseudonyms
}
