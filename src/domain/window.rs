//! Export time window
//!
//! The export API addresses data by hour. A window is an inclusive
//! `(start, end)` pair of hours rendered as `YYYYMMDDTHH`.

use crate::domain::{AmpsyncError, Result};
use chrono::{DateTime, Duration, DurationRound, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::fmt;

/// chrono pattern for window bounds, e.g. `20240101T23`
pub const WINDOW_FORMAT: &str = "%Y%m%dT%H";

/// File name suffix of the downloaded archive
const ARCHIVE_SUFFIX: &str = "_data.zip";

/// Inclusive hour range requested from the export API
///
/// Both bounds are truncated to the hour. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a window from two timestamps, truncating both to the hour
    ///
    /// # Errors
    ///
    /// Returns a validation error if `start` is after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let start = truncate_to_hour(start)?;
        let end = truncate_to_hour(end)?;

        if start > end {
            return Err(AmpsyncError::Validation(format!(
                "window start {} is after end {}",
                start.format(WINDOW_FORMAT),
                end.format(WINDOW_FORMAT)
            )));
        }

        Ok(Self { start, end })
    }

    /// Parse a window from two `YYYYMMDDTHH` strings
    ///
    /// # Example
    ///
    /// ```
    /// use ampsync::domain::TimeWindow;
    ///
    /// let window = TimeWindow::parse("20240101T00", "20240101T23").unwrap();
    /// assert_eq!(window.end_label(), "20240101T23");
    /// ```
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    /// The previous full UTC day relative to `now`: hours 00 through 23
    pub fn previous_day(now: DateTime<Utc>) -> Self {
        let day = now.date_naive() - Duration::days(1);
        Self::for_day(day)
    }

    /// Hours 00 through 23 of a calendar day
    pub fn for_day(day: NaiveDate) -> Self {
        let start = day.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc();
        let end = day.and_hms_opt(23, 0, 0).unwrap_or_default().and_utc();
        Self { start, end }
    }

    /// Start of the window
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// End of the window (inclusive hour)
    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// `start` rendered for the API
    pub fn start_label(&self) -> String {
        self.start.format(WINDOW_FORMAT).to_string()
    }

    /// `end` rendered for the API
    pub fn end_label(&self) -> String {
        self.end.format(WINDOW_FORMAT).to_string()
    }

    /// Name of the archive file for this window, derived from the end bound only
    pub fn archive_file_name(&self) -> String {
        format!("{}{ARCHIVE_SUFFIX}", self.end_label())
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_label(), self.end_label())
    }
}

impl Serialize for TimeWindow {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TimeWindow", 2)?;
        state.serialize_field("start", &self.start_label())?;
        state.serialize_field("end", &self.end_label())?;
        state.end()
    }
}

fn truncate_to_hour(ts: DateTime<Utc>) -> Result<DateTime<Utc>> {
    ts.duration_trunc(Duration::hours(1))
        .map_err(|e| AmpsyncError::Validation(format!("cannot truncate {ts} to the hour: {e}")))
}

/// `%Y%m%dT%H` has no minute field, which chrono's datetime parser insists on,
/// so the date and hour are parsed separately.
fn parse_bound(value: &str) -> Result<DateTime<Utc>> {
    let invalid = || {
        AmpsyncError::Validation(format!(
            "invalid window bound '{value}', expected YYYYMMDDTHH"
        ))
    };

    if value.len() != 11 || !value.is_ascii() || value.as_bytes()[8] != b'T' {
        return Err(invalid());
    }

    // chrono and `u32::from_str` both tolerate signs and padding
    let digits_only = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !digits_only(&value[..8]) || !digits_only(&value[9..]) {
        return Err(invalid());
    }

    let date = NaiveDate::parse_from_str(&value[..8], "%Y%m%d").map_err(|_| invalid())?;
    let hour: u32 = value[9..].parse().map_err(|_| invalid())?;

    date.and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(invalid)
}
