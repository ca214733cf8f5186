//! Core Data timestamp conversion and timezone helpers

use chrono::{
    DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
};
use chrono_tz::Tz;

use crate::error::{Error, Result};
use crate::CORE_DATA_EPOCH;

/// Convert a Core Data timestamp (seconds since 2001-01-01 UTC) to a UTC instant.
///
/// Returns `None` for non-finite or unrepresentable values.
pub fn core_data_to_utc(timestamp: f64) -> Option<DateTime<Utc>> {
    if !timestamp.is_finite() {
        return None;
    }
    let millis = ((timestamp + CORE_DATA_EPOCH as f64) * 1000.0).round();
    DateTime::from_timestamp_millis(millis as i64)
}

/// Convert a UTC instant to a Core Data timestamp
pub fn utc_to_core_data(instant: DateTime<Utc>) -> f64 {
    instant.timestamp_millis() as f64 / 1000.0 - CORE_DATA_EPOCH as f64
}

/// Render an instant as ISO 8601 with millisecond precision (`2024-01-15T09:30:00.000Z`)
pub fn to_iso_string(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timezone used to resolve local dates and naive date-times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Zone {
    /// The system timezone
    #[default]
    Local,
    /// An IANA timezone
    Named(Tz),
}

impl Zone {
    /// Local calendar date of `now`
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        match self {
            Zone::Local => now.with_timezone(&Local).date_naive(),
            Zone::Named(tz) => now.with_timezone(tz).date_naive(),
        }
    }

    /// Interpret a wall-clock time in this zone. Ambiguous times resolve to the
    /// earlier instant; times inside a DST gap return `None`.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Local => Local
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => tz
                .from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// First instant of `date` in this zone.
    ///
    /// Some zones skip midnight on DST transitions; the first wall-clock
    /// quarter hour that exists is used instead.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<Utc> {
        let start = date.and_time(NaiveTime::MIN);
        (0..=96)
            .map(|step| start + Duration::minutes(15 * step))
            .find_map(|naive| self.localize(naive))
            .unwrap_or_else(|| Utc.from_utc_datetime(&start))
    }
}

/// Parse an ISO 8601 date or date-time into a UTC instant.
///
/// - RFC 3339 with an offset is taken as-is.
/// - A bare date (`2024-01-31`) is midnight UTC.
/// - A date-time without an offset is wall-clock time in `zone`.
pub fn parse_instant(input: &str, zone: &Zone) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, fmt) {
            return zone.localize(naive).ok_or_else(|| {
                Error::InvalidDate(format!("'{}' does not exist in the local timezone", input))
            });
        }
    }

    Err(Error::InvalidDate(format!(
        "'{}' is not an ISO 8601 date or date-time",
        input
    )))
}
