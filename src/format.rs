//! Display formatting policy for temporal columns.
//!
//! Grid consumers receive date, time and timestamp columns as preformatted
//! text. The policy holds the three pattern strings plus a signed millisecond
//! offset used to compensate for a source/display time-zone mismatch without
//! touching the connection's own time zone setting.

use std::fmt::Write as _;

use chrono::format::{DelayedFormat, StrftimeItems};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{GridfeedError, Result};

/// Default pattern for date columns.
pub const DEFAULT_DATE_FORMAT: &str = "%Y/%m/%d";

/// Default pattern for time columns.
pub const DEFAULT_TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Default pattern for timestamp columns.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// Session-scoped formatting configuration for temporal columns.
///
/// Patterns use chrono's strftime syntax. The offset is added to the raw
/// temporal value before formatting; the default of 0 means no shift.
/// Swappable between fetches, not meant to change mid-fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatPolicy {
    date_format: String,
    time_format: String,
    datetime_format: String,
    time_offset_ms: i64,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            time_offset_ms: 0,
        }
    }
}

impl FormatPolicy {
    /// Creates a policy with the default patterns and no offset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the date pattern.
    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Returns the time pattern.
    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    /// Returns the timestamp pattern.
    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    /// Returns the signed millisecond offset.
    pub fn time_offset_ms(&self) -> i64 {
        self.time_offset_ms
    }

    /// Sets the date pattern.
    pub fn set_date_format(&mut self, pattern: impl Into<String>) {
        self.date_format = pattern.into();
    }

    /// Sets the time pattern.
    pub fn set_time_format(&mut self, pattern: impl Into<String>) {
        self.time_format = pattern.into();
    }

    /// Sets the timestamp pattern.
    pub fn set_datetime_format(&mut self, pattern: impl Into<String>) {
        self.datetime_format = pattern.into();
    }

    /// Sets the signed millisecond offset applied before formatting.
    pub fn set_time_offset_ms(&mut self, offset_ms: i64) {
        self.time_offset_ms = offset_ms;
    }

    /// Formats a date column value, shifting by the offset first.
    ///
    /// A shift can cross midnight, so the date is widened to a midnight
    /// timestamp before the offset is applied.
    pub fn format_date(&self, date: NaiveDate) -> Result<String> {
        let shifted = self.shift(date.and_time(NaiveTime::MIN))?;
        render(shifted.format(&self.date_format))
    }

    /// Formats a time-of-day column value, shifting by the offset first.
    ///
    /// The shift wraps around midnight; only the time of day is rendered.
    pub fn format_time(&self, time: NaiveTime) -> Result<String> {
        let (shifted, _) = time.overflowing_add_signed(Duration::milliseconds(self.time_offset_ms));
        render(shifted.format(&self.time_format))
    }

    /// Formats a timestamp column value, shifting by the offset first.
    pub fn format_datetime(&self, timestamp: NaiveDateTime) -> Result<String> {
        let shifted = self.shift(timestamp)?;
        render(shifted.format(&self.datetime_format))
    }

    fn shift(&self, value: NaiveDateTime) -> Result<NaiveDateTime> {
        if self.time_offset_ms == 0 {
            return Ok(value);
        }
        value
            .checked_add_signed(Duration::milliseconds(self.time_offset_ms))
            .ok_or_else(|| GridfeedError::decode("temporal value out of range after offset shift"))
    }
}

/// Renders a chrono delayed format, surfacing invalid patterns as errors
/// instead of the panic `to_string` would produce.
fn render(formatted: DelayedFormat<StrftimeItems<'_>>) -> Result<String> {
    let mut out = String::new();
    write!(out, "{formatted}")
        .map_err(|_| GridfeedError::decode("invalid date/time format pattern"))?;
    Ok(out)
}
