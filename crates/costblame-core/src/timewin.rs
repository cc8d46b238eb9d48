//! Relative time windows for period-over-period comparison.
//!
//! A window expression such as `7d` or `48h` yields two equal-length,
//! adjacent periods. The current period ends at "now" truncated to the
//! start of the hour (for `h`) or the start of the UTC day (for `d`), so
//! repeated queries within the same bucket see identical boundaries.

use crate::error::{Error, Result};
use crate::grouping::Granularity;
use chrono::{DateTime, Duration, DurationRound, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static WINDOW_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)([hd])$").expect("window regex should be valid"));

/// Unit of a window expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    /// `h` suffix.
    Hours,
    /// `d` suffix.
    Days,
}

impl WindowUnit {
    fn bucket(self) -> Duration {
        match self {
            WindowUnit::Hours => Duration::hours(1),
            WindowUnit::Days => Duration::days(1),
        }
    }
}

/// Two adjacent, equal-length periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    /// Start of the current period (inclusive).
    pub current_start: DateTime<Utc>,
    /// End of the current period (exclusive).
    pub current_end: DateTime<Utc>,
    /// Start of the prior period (inclusive).
    pub prior_start: DateTime<Utc>,
    /// End of the prior period (exclusive); equal to `current_start`.
    pub prior_end: DateTime<Utc>,
    /// Length of each period.
    #[serde(serialize_with = "serialize_duration_secs")]
    pub duration: Duration,
    /// Unit the window was expressed in.
    pub unit: WindowUnit,
}

fn serialize_duration_secs<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_seconds())
}

impl TimeWindow {
    /// Parse a window expression relative to the current wall-clock time.
    pub fn parse(expr: &str) -> Result<Self> {
        Self::parse_at(expr, Utc::now())
    }

    /// Parse a window expression relative to `now`.
    pub fn parse_at(expr: &str, now: DateTime<Utc>) -> Result<Self> {
        let invalid = || Error::InvalidWindow(expr.to_string());

        let caps = WINDOW_REGEX.captures(expr).ok_or_else(invalid)?;
        let value: i64 = caps[1].parse().map_err(|_| invalid())?;
        let unit = match &caps[2] {
            "h" => WindowUnit::Hours,
            _ => WindowUnit::Days,
        };

        let hours = match unit {
            WindowUnit::Hours => Some(value),
            WindowUnit::Days => value.checked_mul(24),
        }
        .ok_or_else(invalid)?;
        let duration = Duration::try_hours(hours).ok_or_else(invalid)?;

        let current_end = now.duration_trunc(unit.bucket()).map_err(|_| invalid())?;
        let current_start = current_end.checked_sub_signed(duration).ok_or_else(invalid)?;
        let prior_end = current_start;
        let prior_start = prior_end.checked_sub_signed(duration).ok_or_else(invalid)?;

        debug!(
            window = expr,
            current_start = %current_start,
            current_end = %current_end,
            prior_start = %prior_start,
            "Parsed time window"
        );

        Ok(Self {
            current_start,
            current_end,
            prior_start,
            prior_end,
            duration,
            unit,
        })
    }

    /// Whether the current period reaches into today, whose data is still incomplete.
    pub fn includes_today(&self) -> bool {
        self.includes_today_at(Utc::now())
    }

    /// Same as [`TimeWindow::includes_today`] with an explicit clock.
    pub fn includes_today_at(&self, now: DateTime<Utc>) -> bool {
        match start_of_day(now) {
            Some(today) => self.current_end > today,
            None => false,
        }
    }
}

/// Truncate an instant to midnight UTC.
pub fn start_of_day(t: DateTime<Utc>) -> Option<DateTime<Utc>> {
    t.duration_trunc(Duration::days(1)).ok()
}

/// Render a period boundary for the billing API.
pub fn format_billing_date(t: DateTime<Utc>, granularity: Granularity) -> String {
    match granularity {
        Granularity::Daily => t.format("%Y-%m-%d").to_string(),
        Granularity::Hourly => t.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
    }
}
