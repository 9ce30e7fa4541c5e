//! Relative lookback periods and absolute start dates.
//!
//! A [`Period`] is a calendar duration such as `6m`, `1y` or `30d`, used to
//! keep only messages newer than `now - period`.
//!
//! ```
//! use chatrace::core::period::Period;
//! use chrono::NaiveDate;
//!
//! let period: Period = "1y6m".parse()?;
//! assert_eq!(period.describe(), "period_1y6m0d");
//!
//! let now = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap().and_hms_opt(12, 0, 0).unwrap();
//! let cutoff = period.cutoff(now);
//! assert_eq!(cutoff.date(), NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());
//! # Ok::<(), chatrace::ChatraceError>(())
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{Days, Months, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ChatraceError;

static PERIOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(\d+)y)?(?:(\d+)m)?(?:(\d+)d)?$").expect("period pattern is valid")
});

/// A calendar lookback duration in years, months and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Period {
    /// Whole years.
    pub years: u32,
    /// Whole months.
    pub months: u32,
    /// Whole days.
    pub days: u32,
}

impl Period {
    /// Creates a period from its components.
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    /// Shorthand for a period of `n` days.
    pub fn days(n: u32) -> Self {
        Self::new(0, 0, n)
    }

    /// Shorthand for a period of `n` months.
    pub fn months(n: u32) -> Self {
        Self::new(0, n, 0)
    }

    /// Returns `true` if every component is zero.
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }

    /// Returns `now - self`.
    ///
    /// Years and months are subtracted first, clamping the day to the end of
    /// the target month, then days. Saturates at the earliest representable
    /// date.
    pub fn cutoff(&self, now: NaiveDateTime) -> NaiveDateTime {
        let total_months = self.years.saturating_mul(12).saturating_add(self.months);
        now.checked_sub_months(Months::new(total_months))
            .and_then(|dt| dt.checked_sub_days(Days::new(u64::from(self.days))))
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Canonical description used in output file names, e.g.
    /// `period_0y0m30d`.
    pub fn describe(&self) -> String {
        format!("period_{}y{}m{}d", self.years, self.months, self.days)
    }
}

impl fmt::Display for Period {
    /// Formats in the same compact notation [`FromStr`] accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.years > 0 {
            write!(f, "{}y", self.years)?;
        }
        if self.months > 0 {
            write!(f, "{}m", self.months)?;
        }
        if self.days > 0 || self.is_zero() {
            write!(f, "{}d", self.days)?;
        }
        Ok(())
    }
}

impl FromStr for Period {
    type Err = ChatraceError;

    /// Parses `<integer><y|m|d>` (e.g. `6m`, `1y`, `30d`), or several such
    /// components in year-month-day order (`1y6m`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        let caps = PERIOD_PATTERN
            .captures(input)
            .ok_or_else(|| ChatraceError::invalid_period(s))?;

        let component = |i: usize| -> Result<u32, ChatraceError> {
            caps.get(i).map_or(Ok(0), |m| {
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| ChatraceError::invalid_period(s))
            })
        };

        let period = Period::new(component(1)?, component(2)?, component(3)?);
        if period.is_zero() {
            return Err(ChatraceError::invalid_period(s));
        }
        Ok(period)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Parses an absolute start date in `YYYY-MM-DD` format.
pub fn parse_start_date(input: &str) -> Result<NaiveDate, ChatraceError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| ChatraceError::invalid_date(input))
}
