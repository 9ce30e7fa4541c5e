//! Export line splitting and timestamp parsing.
//!
//! An export line looks like:
//!
//! ```text
//! 12/01/23, 10:00 - Alice: hi
//! ```
//!
//! The line is split on the first `" - "` into a timestamp segment and a
//! remainder, and the remainder on the first `": "` into sender and content.

use chrono::NaiveDateTime;

use crate::Message;
use crate::error::LineError;

/// Default timestamp format of the export: `month/day/2-digit-year, hour:minute`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%m/%d/%y, %H:%M";

/// Separates the timestamp from the rest of the line.
pub const TIMESTAMP_SEPARATOR: &str = " - ";

/// Separates the sender from the message text.
pub const SENDER_SEPARATOR: &str = ": ";

/// Splits a line into `(timestamp, sender, content)` segments.
///
/// Returns `None` when the line has no timestamp separator. A remainder
/// without `": "` yields the whole remainder as sender and empty content.
///
/// ```
/// use chatrace::parsing::line::split_line;
///
/// assert_eq!(
///     split_line("12/01/23, 10:00 - Alice: hi - there: you"),
///     Some(("12/01/23, 10:00", "Alice", "hi - there: you"))
/// );
/// assert_eq!(
///     split_line("12/01/23, 10:00 - Alice joined"),
///     Some(("12/01/23, 10:00", "Alice joined", ""))
/// );
/// assert_eq!(split_line("continuation of a message"), None);
/// ```
pub fn split_line(line: &str) -> Option<(&str, &str, &str)> {
    let (stamp, rest) = line.split_once(TIMESTAMP_SEPARATOR)?;
    let (sender, content) = rest.split_once(SENDER_SEPARATOR).unwrap_or((rest, ""));
    Some((stamp, sender, content))
}

/// Parses the timestamp segment with the given chrono format.
pub fn parse_timestamp(text: &str, format: &str) -> Result<NaiveDateTime, LineError> {
    NaiveDateTime::parse_from_str(text, format).map_err(|source| LineError::InvalidTimestamp {
        text: text.to_string(),
        source,
    })
}

/// Parses one export line into a [`Message`].
///
/// Trailing line terminators are removed and the message text is trimmed.
pub fn parse_line(line: &str, format: &str) -> Result<Message, LineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (stamp, sender, content) = split_line(line).ok_or(LineError::MissingSeparator)?;
    let timestamp = parse_timestamp(stamp, format)?;
    Ok(Message::new(timestamp, sender, content.trim()))
}

/// Decodes export bytes, escaping invalid UTF-8 instead of rejecting it.
///
/// Each byte of an invalid sequence becomes a `\xNN` escape, so the
/// surrounding text survives intact.
///
/// ```
/// use chatrace::parsing::line::decode_permissive;
///
/// assert_eq!(decode_permissive(b"caf\xe9 ok"), "caf\\xe9 ok");
/// assert_eq!(decode_permissive("привет".as_bytes()), "привет");
/// ```
pub fn decode_permissive(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
        for byte in chunk.invalid() {
            out.push_str(&format!("\\x{byte:02x}"));
        }
    }
    out
}
