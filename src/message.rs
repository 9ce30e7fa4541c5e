//! Parsed and normalized chat records.
//!
//! [`Message`] is what the line parser produces: one per successfully parsed
//! export line. [`Record`] is what the normalizer produces: the same message
//! after name substitution, truncation, filtering and (optionally)
//! anonymization, carrying the derived calendar date used for grouping.
//!
//! # Examples
//!
//! ```
//! use chatrace::Message;
//! use chrono::NaiveDate;
//!
//! let ts = NaiveDate::from_ymd_opt(2023, 12, 1)
//!     .unwrap()
//!     .and_hms_opt(10, 0, 0)
//!     .unwrap();
//! let msg = Message::new(ts, "Alice", "hi");
//! assert_eq!(msg.sender(), "Alice");
//! assert_eq!(msg.date().to_string(), "2023-12-01");
//! ```

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single message parsed from an export line.
///
/// The timestamp is always a successfully parsed value: lines whose
/// timestamp does not parse never become a `Message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// When the message was sent (export-local time, no zone).
    pub timestamp: NaiveDateTime,

    /// Sender as it appears in the export (display name or phone number).
    pub sender: String,

    /// Message text, trimmed. Empty when the line had no `": "`.
    pub content: String,
}

impl Message {
    /// Creates a new message.
    pub fn new(
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            sender: sender.into(),
            content: content.into(),
        }
    }

    /// Returns the sender name.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the message content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the timestamp.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Returns the calendar date the message was sent on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    /// Returns `true` if this message's content is empty or whitespace-only.
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// A message after normalization.
///
/// `sender` holds the canonical (possibly substituted, truncated or
/// anonymized) name; `date` is `timestamp.date()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// When the message was sent.
    pub timestamp: NaiveDateTime,

    /// Calendar date of `timestamp`, the grouping key for daily counts.
    pub date: NaiveDate,

    /// Canonical sender name.
    pub sender: String,

    /// Message text.
    pub content: String,
}

impl Record {
    /// Creates a record, deriving the date from the timestamp.
    pub fn new(
        timestamp: NaiveDateTime,
        sender: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            date: timestamp.date(),
            sender: sender.into(),
            content: content.into(),
        }
    }
}

impl From<Message> for Record {
    fn from(msg: Message) -> Self {
        Self {
            date: msg.timestamp.date(),
            timestamp: msg.timestamp,
            sender: msg.sender,
            content: msg.content,
        }
    }
}
