//! Calendar queries
//!
//! Every query reads `CalendarItem` only, binds all caller input as
//! parameters, and formats rows before returning them.

use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Params, Row};
use tracing::debug;

use super::{CalendarStore, CALENDAR_ITEM_TABLE, CALENDAR_TABLE};
use crate::error::{Error, Result};
use crate::format::{format_detailed_event, format_event};
use crate::models::{
    CalendarItemRow, DateRangeOptions, DetailedCalendarItemRow, EventsOptions,
    FormattedDetailedEvent, FormattedEvent, SearchOptions, TimeRange, TodaysEvents,
};
use crate::time::{parse_instant, utc_to_core_data, Zone};

const EVENT_COLUMNS: &str =
    "ROWID AS rowid, summary, start_date, end_date, all_day, status, hidden, orig_item_id";

/// Predicate hiding originals that a rescheduled copy has replaced
fn exclude_rescheduled_clause(include_rescheduled: bool) -> String {
    if include_rescheduled {
        String::new()
    } else {
        format!(
            "AND ROWID NOT IN (SELECT orig_item_id FROM {} WHERE orig_item_id > 0)",
            CALENDAR_ITEM_TABLE
        )
    }
}

/// LIKE pattern matching `query` as a literal substring (escape char `\`)
fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn map_item_row(row: &Row) -> rusqlite::Result<CalendarItemRow> {
    Ok(CalendarItemRow {
        rowid: row.get("rowid")?,
        summary: row.get("summary")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        all_day: row.get::<_, Option<i64>>("all_day")?.unwrap_or(0),
        status: row.get("status")?,
        hidden: row.get::<_, Option<i64>>("hidden")?.unwrap_or(0),
        orig_item_id: row.get("orig_item_id")?,
    })
}

fn map_detailed_row(row: &Row) -> rusqlite::Result<DetailedCalendarItemRow> {
    Ok(DetailedCalendarItemRow {
        item: map_item_row(row)?,
        description: row.get("description")?,
        url: row.get("url")?,
        location: row.get("location")?,
        recurrence_rule: row.get("recurrence_rule")?,
        calendar_name: row.get("calendar_name")?,
    })
}

impl CalendarStore {
    fn query_events<P: Params>(&self, sql: &str, params: P) -> Result<Vec<FormattedEvent>> {
        debug!("Executing query: {}", sql);

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map_item_row)?;

        let mut events = Vec::new();
        for row in rows {
            events.push(format_event(&row?));
        }

        debug!("Query returned {} events", events.len());
        Ok(events)
    }

    /// Events that have already started, most recent first
    pub fn recent_events(&self, options: &EventsOptions) -> Result<Vec<FormattedEvent>> {
        self.recent_events_at(options, Utc::now())
    }

    pub fn recent_events_at(
        &self,
        options: &EventsOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<FormattedEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM {CALENDAR_ITEM_TABLE}
             WHERE start_date IS NOT NULL
               AND hidden = 0
               AND start_date <= ?1
               {}
             ORDER BY start_date DESC
             LIMIT ?2",
            exclude_rescheduled_clause(options.include_rescheduled)
        );

        self.query_events(&sql, params![utc_to_core_data(now), options.limit])
    }

    /// Events that start after now, soonest first
    pub fn upcoming_events(&self, options: &EventsOptions) -> Result<Vec<FormattedEvent>> {
        self.upcoming_events_at(options, Utc::now())
    }

    pub fn upcoming_events_at(
        &self,
        options: &EventsOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<FormattedEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM {CALENDAR_ITEM_TABLE}
             WHERE start_date IS NOT NULL
               AND hidden = 0
               AND start_date > ?1
               {}
             ORDER BY start_date ASC
             LIMIT ?2",
            exclude_rescheduled_clause(options.include_rescheduled)
        );

        self.query_events(&sql, params![utc_to_core_data(now), options.limit])
    }

    /// All events starting inside `[start_date, end_date]`, soonest first.
    ///
    /// Both bounds are validated before any SQL runs.
    pub fn events_by_date_range(
        &self,
        options: &DateRangeOptions,
        zone: &Zone,
    ) -> Result<Vec<FormattedEvent>> {
        let start = parse_instant(&options.start_date, zone)
            .map_err(|e| Error::InvalidDate(format!("startDate: {}", inner_message(e))))?;
        let end = parse_instant(&options.end_date, zone)
            .map_err(|e| Error::InvalidDate(format!("endDate: {}", inner_message(e))))?;

        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM {CALENDAR_ITEM_TABLE}
             WHERE start_date IS NOT NULL
               AND hidden = 0
               AND start_date >= ?1
               AND start_date <= ?2
               {}
             ORDER BY start_date ASC",
            exclude_rescheduled_clause(options.include_rescheduled)
        );

        self.query_events(&sql, params![utc_to_core_data(start), utc_to_core_data(end)])
    }

    /// Events whose title contains `query`, newest first
    pub fn search_events(&self, options: &SearchOptions) -> Result<Vec<FormattedEvent>> {
        self.search_events_at(options, Utc::now())
    }

    pub fn search_events_at(
        &self,
        options: &SearchOptions,
        now: DateTime<Utc>,
    ) -> Result<Vec<FormattedEvent>> {
        let mut values = vec![Value::Text(like_pattern(&options.query))];

        let time_clause = match options.time_range {
            TimeRange::All => "",
            TimeRange::Past => "AND start_date <= ?",
            TimeRange::Future => "AND start_date > ?",
        };
        if options.time_range != TimeRange::All {
            values.push(Value::Real(utc_to_core_data(now)));
        }
        values.push(Value::Integer(i64::from(options.limit)));

        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM {CALENDAR_ITEM_TABLE}
             WHERE summary LIKE ? ESCAPE '\\'
               AND hidden = 0
               {time_clause}
               {}
             ORDER BY start_date DESC
             LIMIT ?",
            exclude_rescheduled_clause(options.include_rescheduled)
        );

        self.query_events(&sql, params_from_iter(values))
    }

    /// Events overlapping the current local day in `zone`
    pub fn todays_events(&self, include_rescheduled: bool, zone: &Zone) -> Result<TodaysEvents> {
        self.todays_events_at(include_rescheduled, zone, Utc::now())
    }

    pub fn todays_events_at(
        &self,
        include_rescheduled: bool,
        zone: &Zone,
        now: DateTime<Utc>,
    ) -> Result<TodaysEvents> {
        let today = zone.today(now);
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| Error::Other(format!("No day after {}", today)))?;

        let window_start = utc_to_core_data(zone.midnight(today));
        let window_end = utc_to_core_data(zone.midnight(tomorrow));

        let sql = format!(
            "SELECT {EVENT_COLUMNS}
             FROM {CALENDAR_ITEM_TABLE}
             WHERE start_date IS NOT NULL
               AND hidden = 0
               AND (
                 (start_date >= ?1 AND start_date < ?2)
                 OR (end_date >= ?1 AND end_date < ?2)
                 OR (start_date < ?1 AND end_date >= ?2)
               )
               {}
             ORDER BY start_date ASC",
            exclude_rescheduled_clause(include_rescheduled)
        );

        let events = self.query_events(&sql, params![window_start, window_end])?;

        Ok(TodaysEvents {
            date: today.format("%Y-%m-%d").to_string(),
            events,
        })
    }

    /// A single event with its descriptive fields, or `None` if no row has `event_id`
    pub fn event_details(&self, event_id: i64) -> Result<Option<FormattedDetailedEvent>> {
        let sql = format!(
            "SELECT ci.ROWID AS rowid,
                    ci.summary AS summary,
                    ci.start_date AS start_date,
                    ci.end_date AS end_date,
                    ci.all_day AS all_day,
                    ci.status AS status,
                    ci.hidden AS hidden,
                    ci.orig_item_id AS orig_item_id,
                    ci.description AS description,
                    ci.url AS url,
                    ci.location AS location,
                    ci.recurrence_rule AS recurrence_rule,
                    c.title AS calendar_name
             FROM {CALENDAR_ITEM_TABLE} ci
             LEFT JOIN {CALENDAR_TABLE} c ON ci.calendar_id = c.ROWID
             WHERE ci.ROWID = ?1"
        );
        debug!("Executing query: {}", sql);

        let row = self
            .conn
            .query_row(&sql, params![event_id], map_detailed_row)
            .optional()?;

        Ok(row.map(format_detailed_event))
    }
}

fn inner_message(error: Error) -> String {
    match error {
        Error::InvalidDate(message) => message,
        other => other.to_string(),
    }
}
