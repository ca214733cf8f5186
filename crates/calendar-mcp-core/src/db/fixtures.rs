//! Throwaway Calendar databases for tests

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use super::CalendarStore;
use crate::time::utc_to_core_data;

const SCHEMA: &str = "
    CREATE TABLE Calendar (
        title TEXT
    );
    CREATE TABLE CalendarItem (
        summary TEXT,
        start_date REAL,
        end_date REAL,
        all_day INTEGER DEFAULT 0,
        status INTEGER,
        hidden INTEGER DEFAULT 0,
        orig_item_id INTEGER,
        calendar_id INTEGER,
        description TEXT,
        url TEXT,
        location TEXT,
        recurrence_rule TEXT
    );
";

/// Core Data timestamp for an RFC 3339 string
pub(crate) fn core(rfc3339: &str) -> f64 {
    let instant = DateTime::parse_from_rfc3339(rfc3339)
        .expect("fixture timestamp")
        .with_timezone(&Utc);
    utc_to_core_data(instant)
}

/// One `CalendarItem` row
#[derive(Debug, Clone, Default)]
pub(crate) struct Item {
    pub rowid: i64,
    pub summary: Option<&'static str>,
    pub start: Option<&'static str>,
    pub end: Option<&'static str>,
    pub all_day: i64,
    pub status: Option<i64>,
    pub hidden: i64,
    pub orig_item_id: Option<i64>,
    pub calendar_id: Option<i64>,
    pub description: Option<&'static str>,
    pub url: Option<&'static str>,
    pub location: Option<&'static str>,
    pub recurrence_rule: Option<&'static str>,
}

impl Item {
    pub fn new(
        rowid: i64,
        summary: &'static str,
        start: &'static str,
        end: &'static str,
    ) -> Self {
        Self {
            rowid,
            summary: Some(summary),
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }
}

/// A Calendar database in a temp dir, removed on drop
pub(crate) struct Fixture {
    _dir: TempDir,
    pub path: PathBuf,
}

impl Fixture {
    pub fn new(calendars: &[(i64, &str)], items: &[Item]) -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("Calendar.sqlitedb");

        let conn = Connection::open(&path).expect("create fixture db");
        conn.execute_batch(SCHEMA).expect("create schema");

        for (rowid, title) in calendars {
            conn.execute(
                "INSERT INTO Calendar (ROWID, title) VALUES (?1, ?2)",
                params![rowid, title],
            )
            .expect("insert calendar");
        }

        for item in items {
            conn.execute(
                "INSERT INTO CalendarItem (
                    ROWID, summary, start_date, end_date, all_day, status, hidden,
                    orig_item_id, calendar_id, description, url, location, recurrence_rule
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    item.rowid,
                    item.summary,
                    item.start.map(core),
                    item.end.map(core),
                    item.all_day,
                    item.status,
                    item.hidden,
                    item.orig_item_id,
                    item.calendar_id,
                    item.description,
                    item.url,
                    item.location,
                    item.recurrence_rule,
                ],
            )
            .expect("insert item");
        }

        conn.close().expect("close fixture db");

        Self { _dir: dir, path }
    }

    /// The shared data set most query tests run against.
    ///
    /// "Now" for these rows is 2024-01-15T12:00:00Z.
    pub fn standard() -> Self {
        Self::new(
            &[(1, "Work"), (2, "Home")],
            &[
                Item::new(1, "Past standup", "2024-01-10T09:00:00Z", "2024-01-10T09:30:00Z"),
                Item {
                    status: Some(1),
                    calendar_id: Some(1),
                    ..Item::new(2, "Sprint review", "2024-01-05T14:00:00Z", "2024-01-05T15:00:00Z")
                },
                Item {
                    hidden: 1,
                    ..Item::new(3, "Hidden review", "2024-01-12T10:00:00Z", "2024-01-12T11:00:00Z")
                },
                Item::new(4, "Future review", "2024-01-20T10:00:00Z", "2024-01-20T11:00:00Z"),
                Item {
                    rowid: 5,
                    summary: Some("Undated"),
                    ..Default::default()
                },
                Item::new(6, "Original meeting", "2024-01-18T10:00:00Z", "2024-01-18T11:00:00Z"),
                Item {
                    orig_item_id: Some(6),
                    calendar_id: Some(1),
                    description: Some("Moved to Friday"),
                    url: Some("https://meet.example.com/abc"),
                    location: Some("Room 4"),
                    ..Item::new(7, "Moved meeting", "2024-01-19T10:00:00Z", "2024-01-19T11:00:00Z")
                },
                Item {
                    all_day: 1,
                    calendar_id: Some(2),
                    ..Item::new(8, "Team offsite", "2024-01-14T00:00:00Z", "2024-01-17T00:00:00Z")
                },
                Item::new(9, "Late dinner", "2024-01-15T19:00:00Z", "2024-01-15T21:00:00Z"),
                Item {
                    summary: None,
                    status: Some(3),
                    ..Item::new(10, "", "2024-01-25T09:00:00Z", "2024-01-25T10:00:00Z")
                },
                Item::new(11, "Budget 100% review", "2024-01-31T00:00:00Z", "2024-01-31T01:00:00Z"),
                Item {
                    recurrence_rule: Some("FREQ=WEEKLY;BYDAY=FR"),
                    calendar_id: Some(99),
                    ..Item::new(12, "Quarterly_sync", "2024-02-02T10:00:00Z", "2024-02-02T11:00:00Z")
                },
                Item::new(13, "QuarterlyXsync", "2024-02-03T10:00:00Z", "2024-02-03T11:00:00Z"),
                Item::new(14, "Overnight deploy", "2024-01-14T22:00:00Z", "2024-01-15T02:00:00Z"),
                Item::new(16, "Tomorrow breakfast", "2024-01-16T08:00:00Z", "2024-01-16T09:00:00Z"),
            ],
        )
    }

    /// Open the fixture through the read-only store accessor
    pub fn open(&self) -> CalendarStore {
        CalendarStore::open_at(&self.path).expect("open fixture store")
    }
}

/// "Now" for [`Fixture::standard`]
pub(crate) fn fixture_now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-01-15T12:00:00Z")
        .expect("fixture now")
        .with_timezone(&Utc)
}
