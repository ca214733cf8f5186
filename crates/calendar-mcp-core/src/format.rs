//! Row formatting
//!
//! Pure mapping from raw `CalendarItem` rows to the event shapes returned by
//! every query.

use crate::models::{
    CalendarItemRow, DetailedCalendarItemRow, EventStatus, FormattedDetailedEvent, FormattedEvent,
    UNTITLED_EVENT,
};
use crate::time::{core_data_to_utc, to_iso_string};

/// Convert an optional Core Data timestamp to an ISO 8601 string
fn convert_timestamp(timestamp: Option<f64>) -> Option<String> {
    timestamp.and_then(core_data_to_utc).map(to_iso_string)
}

/// Format a raw row
pub fn format_event(row: &CalendarItemRow) -> FormattedEvent {
    let title = match row.summary.as_deref() {
        Some(summary) if !summary.is_empty() => summary.to_string(),
        _ => UNTITLED_EVENT.to_string(),
    };

    FormattedEvent {
        id: row.rowid,
        title,
        start_time: convert_timestamp(row.start_date),
        end_time: convert_timestamp(row.end_date),
        all_day: row.all_day == 1,
        status: EventStatus::from_code(row.status),
        is_rescheduled: row.orig_item_id.is_some_and(|id| id > 0),
    }
}

/// Format a detailed row, passing descriptive fields through unchanged
pub fn format_detailed_event(row: DetailedCalendarItemRow) -> FormattedDetailedEvent {
    FormattedDetailedEvent {
        event: format_event(&row.item),
        description: row.description,
        url: row.url,
        location: row.location,
        recurrence_rule: row.recurrence_rule,
        calendar: row.calendar_name,
    }
}
