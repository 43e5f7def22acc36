//! Date range for fetching events.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WINDOW_DAYS;
use crate::error::{CalSyncError, CalSyncResult};

/// A contiguous window of time: `from` is inclusive, `to` is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Default for DateRange {
    /// Default range: now until DEFAULT_WINDOW_DAYS from now
    fn default() -> Self {
        DateRange::days_from(Utc::now(), DEFAULT_WINDOW_DAYS)
    }
}

impl DateRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> CalSyncResult<Self> {
        if to <= from {
            return Err(CalSyncError::Config(format!(
                "Empty date range: {} is not before {}",
                from.to_rfc3339(),
                to.to_rfc3339()
            )));
        }
        Ok(DateRange { from, to })
    }

    /// Window of `days` days starting at `from`.
    pub fn days_from(from: DateTime<Utc>, days: u32) -> Self {
        DateRange {
            from,
            to: from + Duration::days(i64::from(days)),
        }
    }

    /// Parse CLI arguments into a DateRange.
    /// - `from`: YYYY-MM-DD, defaults to now
    /// - `to`: YYYY-MM-DD (exclusive), defaults to `from` + `days`
    pub fn from_args(from: Option<&str>, to: Option<&str>, days: u32) -> CalSyncResult<Self> {
        let from_dt = match from {
            Some(s) => parse_date(s)?,
            None => Utc::now(),
        };

        match to {
            Some(s) => DateRange::new(from_dt, parse_date(s)?),
            None => Ok(DateRange::days_from(from_dt, days)),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.from && instant < self.to
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

/// Parse YYYY-MM-DD as start of day in UTC
fn parse_date(s: &str) -> CalSyncResult<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CalSyncError::Config(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })?;
    Ok(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_contains_is_half_open() {
        let from = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let range = DateRange::days_from(from, 1);

        assert!(range.contains(from));
        assert!(range.contains(from + Duration::hours(23)));
        assert!(!range.contains(from + Duration::days(1)));
        assert!(!range.contains(from - Duration::seconds(1)));
    }

    #[test]
    fn test_from_args_parses_dates() {
        let range = DateRange::from_args(Some("2025-03-01"), Some("2025-03-08"), 30).unwrap();
        assert_eq!(range.from, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap());

        let range = DateRange::from_args(Some("2025-03-01"), None, 7).unwrap();
        assert_eq!(range.to, Utc.with_ymd_and_hms(2025, 3, 8, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_from_args_rejects_bad_input() {
        assert!(DateRange::from_args(Some("03/01/2025"), None, 7).is_err());
        assert!(DateRange::from_args(Some("2025-03-08"), Some("2025-03-01"), 7).is_err());
    }
}
