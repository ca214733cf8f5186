//! Calendar event data structures

use serde::{Deserialize, Serialize};

/// Title used when an event has no summary
pub const UNTITLED_EVENT: &str = "Untitled Event";

/// A `CalendarItem` row as stored by Calendar.app.
///
/// Timestamps are Core Data seconds (since 2001-01-01 UTC).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CalendarItemRow {
    /// SQLite ROWID
    pub rowid: i64,
    pub summary: Option<String>,
    pub start_date: Option<f64>,
    pub end_date: Option<f64>,
    /// 1 for all-day events
    pub all_day: i64,
    /// Raw status code
    pub status: Option<i64>,
    /// 1 for rows Calendar.app hides
    pub hidden: i64,
    /// ROWID of the item this row replaced, when > 0
    pub orig_item_id: Option<i64>,
}

/// A `CalendarItem` row joined with its calendar, for detail lookups
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetailedCalendarItemRow {
    pub item: CalendarItemRow,
    pub description: Option<String>,
    pub url: Option<String>,
    pub location: Option<String>,
    /// iCalendar RRULE text
    pub recurrence_rule: Option<String>,
    /// `Calendar.title` of the owning calendar
    pub calendar_name: Option<String>,
}

/// Event status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Confirmed,
    Tentative,
    Cancelled,
}

impl Default for EventStatus {
    fn default() -> Self {
        Self::Confirmed
    }
}

impl EventStatus {
    /// Map a raw status code. Only 1 and 3 are distinguished; every other
    /// code, including 2, reads as confirmed.
    pub fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(3) => Self::Cancelled,
            Some(1) => Self::Tentative,
            _ => Self::Confirmed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Tentative => "tentative",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar event as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedEvent {
    /// ROWID of the underlying row
    pub id: i64,

    /// Summary, or "Untitled Event"
    pub title: String,

    /// Start time (ISO 8601, UTC, milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    /// End time (ISO 8601, UTC, milliseconds)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,

    pub all_day: bool,

    pub status: EventStatus,

    /// Whether this row replaces a rescheduled original
    pub is_rescheduled: bool,
}

/// A calendar event with its descriptive fields and calendar name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedDetailedEvent {
    #[serde(flatten)]
    pub event: FormattedEvent,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence_rule: Option<String>,

    /// Name of the calendar this event belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar: Option<String>,
}

/// Events overlapping the current local day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodaysEvents {
    /// Local date (YYYY-MM-DD)
    pub date: String,
    pub events: Vec<FormattedEvent>,
}
