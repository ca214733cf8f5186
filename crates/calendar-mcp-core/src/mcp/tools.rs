//! MCP tool implementations

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::protocol::{ToolDefinition, ToolResult};
use crate::config::Config;
use crate::db::{with_store, CalendarStore};
use crate::error::{Error, Result};
use crate::models::{
    DateRangeOptions, EventsOptions, SearchOptions, TimeRange, DEFAULT_EVENTS_LIMIT,
    DEFAULT_SEARCH_LIMIT, MAX_LIMIT,
};

/// Text returned by `get-event-details` for an unknown id
pub const EVENT_NOT_FOUND: &str = "Event not found";

const INCLUDE_RESCHEDULED_DESCRIPTION: &str = "Include original rescheduled events";

fn include_rescheduled_schema() -> Value {
    serde_json::json!({
        "type": "boolean",
        "default": false,
        "description": INCLUDE_RESCHEDULED_DESCRIPTION
    })
}

fn limit_schema(default: u32, description: &str) -> Value {
    serde_json::json!({
        "type": "integer",
        "minimum": 1,
        "maximum": MAX_LIMIT,
        "default": default,
        "description": description
    })
}

/// Get all tool definitions
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get-recent-events".to_string(),
            title: Some("Get Recent Calendar Events".to_string()),
            description: "Retrieve recent past calendar events from macOS Calendar".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": limit_schema(DEFAULT_EVENTS_LIMIT, "Number of events to retrieve"),
                    "includeRescheduled": include_rescheduled_schema()
                }
            }),
        },
        ToolDefinition {
            name: "get-upcoming-events".to_string(),
            title: Some("Get Upcoming Calendar Events".to_string()),
            description: "Retrieve upcoming calendar events from macOS Calendar".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "limit": limit_schema(DEFAULT_EVENTS_LIMIT, "Number of events to retrieve"),
                    "includeRescheduled": include_rescheduled_schema()
                }
            }),
        },
        ToolDefinition {
            name: "get-events-by-date-range".to_string(),
            title: Some("Get Events by Date Range".to_string()),
            description: "Retrieve calendar events within a specific date range. Date-only bounds are UTC midnight; date-times without an offset use the configured timezone.".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "startDate": {
                        "type": "string",
                        "description": "Start date in ISO format (e.g., 2024-01-01)"
                    },
                    "endDate": {
                        "type": "string",
                        "description": "End date in ISO format (e.g., 2024-01-31)"
                    },
                    "includeRescheduled": include_rescheduled_schema()
                },
                "required": ["startDate", "endDate"]
            }),
        },
        ToolDefinition {
            name: "search-events".to_string(),
            title: Some("Search Calendar Events".to_string()),
            description: "Search for calendar events by title/summary (case-insensitive substring)".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query for event titles"
                    },
                    "limit": limit_schema(DEFAULT_SEARCH_LIMIT, "Maximum number of results"),
                    "timeRange": {
                        "type": "string",
                        "enum": ["all", "past", "future"],
                        "default": "all",
                        "description": "Time range to search"
                    },
                    "includeRescheduled": include_rescheduled_schema()
                },
                "required": ["query"]
            }),
        },
        ToolDefinition {
            name: "get-todays-events".to_string(),
            title: Some("Get Today's Events".to_string()),
            description: "Get all events scheduled for today".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "includeRescheduled": include_rescheduled_schema()
                }
            }),
        },
        ToolDefinition {
            name: "get-event-details".to_string(),
            title: Some("Get Event Details".to_string()),
            description: "Get detailed information about a specific calendar event".to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "eventId": {
                        "type": "integer",
                        "description": "The ROWID of the event"
                    }
                },
                "required": ["eventId"]
            }),
        },
    ]
}

/// Optional boolean argument, `false` when absent
fn bool_arg(args: &Value, key: &str) -> Result<bool> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(Error::InvalidRequest(format!(
            "{} must be a boolean (got {})",
            key, other
        ))),
    }
}

/// Required string argument
fn str_arg<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::InvalidRequest(format!("Missing {}", key)))
}

/// Optional `limit` argument, checked against `[1, MAX_LIMIT]`
fn limit_arg(args: &Value, default: u32) -> Result<u32> {
    let value = match args.get("limit") {
        None | Some(Value::Null) => return Ok(default),
        Some(value) => value,
    };

    value
        .as_u64()
        .filter(|n| (1..=u64::from(MAX_LIMIT)).contains(n))
        .map(|n| n as u32)
        .ok_or_else(|| {
            Error::InvalidRequest(format!(
                "limit must be an integer between 1 and {} (got {})",
                MAX_LIMIT, value
            ))
        })
}

fn time_range_arg(args: &Value) -> Result<TimeRange> {
    match args.get("timeRange") {
        None | Some(Value::Null) => Ok(TimeRange::All),
        Some(Value::String(s)) => s.parse(),
        Some(other) => Err(Error::InvalidRequest(format!(
            "timeRange must be a string (got {})",
            other
        ))),
    }
}

fn event_id_arg(args: &Value) -> Result<i64> {
    match args.get("eventId") {
        None | Some(Value::Null) => Err(Error::InvalidRequest("Missing eventId".to_string())),
        Some(value) => value.as_i64().ok_or_else(|| {
            Error::InvalidRequest(format!("eventId must be an integer (got {})", value))
        }),
    }
}

/// Tool handler
pub struct ToolHandler {
    config: Arc<Config>,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Execute a tool.
    ///
    /// Unknown tools are an error; every other failure is reported inside the
    /// returned result with `isError` set.
    pub async fn execute(&self, name: &str, arguments: &Value) -> Result<ToolResult> {
        debug!("Executing tool: {} with args: {:?}", name, arguments);

        let result = match name {
            "get-recent-events" => self.get_recent_events(arguments).await,
            "get-upcoming-events" => self.get_upcoming_events(arguments).await,
            "get-events-by-date-range" => self.get_events_by_date_range(arguments).await,
            "search-events" => self.search_events(arguments).await,
            "get-todays-events" => self.get_todays_events(arguments).await,
            "get-event-details" => self.get_event_details(arguments).await,
            _ => return Err(Error::ToolNotFound(name.to_string())),
        };

        Ok(result.unwrap_or_else(|e| {
            warn!("Tool {} failed: {}", name, e);
            ToolResult::error(e.to_string())
        }))
    }

    /// Run `f` against a freshly opened store on the blocking pool
    async fn run_query<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&CalendarStore) -> Result<T> + Send + 'static,
    {
        let path = self.config.calendar_db_path().to_path_buf();

        tokio::task::spawn_blocking(move || with_store(&path, f))
            .await
            .map_err(|e| Error::Other(format!("Calendar query task failed: {}", e)))?
    }

    async fn get_recent_events(&self, args: &Value) -> Result<ToolResult> {
        let options = EventsOptions {
            limit: limit_arg(args, DEFAULT_EVENTS_LIMIT)?,
            include_rescheduled: bool_arg(args, "includeRescheduled")?,
        };

        let events = self
            .run_query(move |store| store.recent_events(&options))
            .await?;
        ToolResult::json(&events)
    }

    async fn get_upcoming_events(&self, args: &Value) -> Result<ToolResult> {
        let options = EventsOptions {
            limit: limit_arg(args, DEFAULT_EVENTS_LIMIT)?,
            include_rescheduled: bool_arg(args, "includeRescheduled")?,
        };

        let events = self
            .run_query(move |store| store.upcoming_events(&options))
            .await?;
        ToolResult::json(&events)
    }

    async fn get_events_by_date_range(&self, args: &Value) -> Result<ToolResult> {
        let options = DateRangeOptions {
            start_date: str_arg(args, "startDate")?.to_string(),
            end_date: str_arg(args, "endDate")?.to_string(),
            include_rescheduled: bool_arg(args, "includeRescheduled")?,
        };
        let zone = self.config.zone()?;

        let events = self
            .run_query(move |store| store.events_by_date_range(&options, &zone))
            .await?;
        ToolResult::json(&events)
    }

    async fn search_events(&self, args: &Value) -> Result<ToolResult> {
        let options = SearchOptions {
            query: str_arg(args, "query")?.to_string(),
            limit: limit_arg(args, DEFAULT_SEARCH_LIMIT)?,
            time_range: time_range_arg(args)?,
            include_rescheduled: bool_arg(args, "includeRescheduled")?,
        };

        let events = self
            .run_query(move |store| store.search_events(&options))
            .await?;
        ToolResult::json(&events)
    }

    async fn get_todays_events(&self, args: &Value) -> Result<ToolResult> {
        let include_rescheduled = bool_arg(args, "includeRescheduled")?;
        let zone = self.config.zone()?;

        let today = self
            .run_query(move |store| store.todays_events(include_rescheduled, &zone))
            .await?;
        ToolResult::json(&today)
    }

    async fn get_event_details(&self, args: &Value) -> Result<ToolResult> {
        let event_id = event_id_arg(args)?;

        let event = self
            .run_query(move |store| store.event_details(event_id))
            .await?;

        match event {
            Some(event) => ToolResult::json(&event),
            None => Ok(ToolResult::text(EVENT_NOT_FOUND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::fixtures::Fixture;
    use serde_json::json;

    fn handler(fixture: &Fixture) -> ToolHandler {
        let mut config = Config::default();
        config.calendar.db_path = fixture.path.clone();
        config.general.timezone = Some("UTC".to_string());
        ToolHandler::new(Arc::new(config))
    }

    fn payload(result: &ToolResult) -> Value {
        assert_eq!(result.is_error, None, "unexpected tool error: {:?}", result);
        serde_json::from_str(result.first_text().unwrap()).unwrap()
    }

    fn ids(value: &Value) -> Vec<i64> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["id"].as_i64().unwrap())
            .collect()
    }

    #[test]
    fn test_tool_definitions() {
        let defs = get_tool_definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "get-recent-events",
                "get-upcoming-events",
                "get-events-by-date-range",
                "search-events",
                "get-todays-events",
                "get-event-details",
            ]
        );

        let search = &defs[3];
        assert_eq!(search.input_schema["properties"]["limit"]["default"], 20);
        assert_eq!(search.input_schema["properties"]["limit"]["maximum"], 100);
        assert_eq!(
            search.input_schema["properties"]["timeRange"]["enum"],
            json!(["all", "past", "future"])
        );
        assert_eq!(search.input_schema["required"], json!(["query"]));
        assert!(defs.iter().all(|d| d.title.is_some()));
    }

    #[test]
    fn test_limit_arg() {
        assert_eq!(limit_arg(&json!({}), 10).unwrap(), 10);
        assert_eq!(limit_arg(&json!({"limit": null}), 20).unwrap(), 20);
        assert_eq!(limit_arg(&json!({"limit": 1}), 10).unwrap(), 1);
        assert_eq!(limit_arg(&json!({"limit": 100}), 10).unwrap(), 100);

        for bad in [json!(0), json!(101), json!(-3), json!(2.5), json!("10")] {
            assert!(
                matches!(limit_arg(&json!({"limit": bad}), 10), Err(Error::InvalidRequest(_))),
                "accepted {}",
                bad
            );
        }
    }

    #[test]
    fn test_scalar_args() {
        assert!(!bool_arg(&json!({}), "includeRescheduled").unwrap());
        assert!(bool_arg(&json!({"includeRescheduled": true}), "includeRescheduled").unwrap());
        assert!(bool_arg(&json!({"includeRescheduled": "yes"}), "includeRescheduled").is_err());

        assert_eq!(time_range_arg(&json!({})).unwrap(), TimeRange::All);
        assert_eq!(time_range_arg(&json!({"timeRange": "past"})).unwrap(), TimeRange::Past);
        assert!(time_range_arg(&json!({"timeRange": "soon"})).is_err());

        assert_eq!(event_id_arg(&json!({"eventId": 7})).unwrap(), 7);
        assert!(event_id_arg(&json!({})).is_err());
        assert!(event_id_arg(&json!({"eventId": "7"})).is_err());
    }

    #[tokio::test]
    async fn test_recent_events_tool() {
        let fixture = Fixture::standard();
        let result = handler(&fixture)
            .execute("get-recent-events", &json!({"limit": 3}))
            .await
            .unwrap();

        // Every fixture row is in the past relative to the wall clock
        assert_eq!(ids(&payload(&result)), vec![13, 12, 11]);
    }

    #[tokio::test]
    async fn test_upcoming_events_tool_empty() {
        let fixture = Fixture::standard();
        let result = handler(&fixture)
            .execute("get-upcoming-events", &json!({}))
            .await
            .unwrap();
        assert_eq!(payload(&result), json!([]));
    }

    #[tokio::test]
    async fn test_date_range_tool() {
        let fixture = Fixture::standard();
        let result = handler(&fixture)
            .execute(
                "get-events-by-date-range",
                &json!({"startDate": "2024-01-18", "endDate": "2024-01-20T23:59:59Z", "includeRescheduled": true}),
            )
            .await
            .unwrap();
        assert_eq!(ids(&payload(&result)), vec![6, 7, 4]);
    }

    #[tokio::test]
    async fn test_search_tool() {
        let fixture = Fixture::standard();
        let result = handler(&fixture)
            .execute("search-events", &json!({"query": "review", "timeRange": "past"}))
            .await
            .unwrap();

        let events = payload(&result);
        assert_eq!(ids(&events), vec![11, 4, 2]);
        assert_eq!(events[2]["status"], "tentative");
        assert_eq!(events[2]["allDay"], false);
        assert_eq!(events[2]["isRescheduled"], false);
    }

    #[tokio::test]
    async fn test_todays_events_tool() {
        let fixture = Fixture::standard();
        let result = handler(&fixture)
            .execute("get-todays-events", &json!({}))
            .await
            .unwrap();

        let today = payload(&result);
        assert_eq!(
            today["date"],
            chrono::Utc::now().format("%Y-%m-%d").to_string()
        );
        assert!(today["events"].is_array());
    }

    #[tokio::test]
    async fn test_event_details_tool() {
        let fixture = Fixture::standard();
        let handler = handler(&fixture);

        let result = handler
            .execute("get-event-details", &json!({"eventId": 7}))
            .await
            .unwrap();
        let event = payload(&result);
        assert_eq!(event["id"], 7);
        assert_eq!(event["calendar"], "Work");
        assert_eq!(event["location"], "Room 4");
        assert_eq!(event["isRescheduled"], true);
        assert!(event.get("recurrenceRule").is_none());

        let result = handler
            .execute("get-event-details", &json!({"eventId": 999}))
            .await
            .unwrap();
        assert_eq!(result, ToolResult::text(EVENT_NOT_FOUND));
    }

    #[tokio::test]
    async fn test_argument_errors_are_tool_errors() {
        let fixture = Fixture::standard();
        let handler = handler(&fixture);

        for (name, args) in [
            ("get-recent-events", json!({"limit": 0})),
            ("search-events", json!({})),
            ("search-events", json!({"query": "x", "timeRange": "later"})),
            ("get-events-by-date-range", json!({"startDate": "nope", "endDate": "2024-01-01"})),
            ("get-event-details", json!({})),
        ] {
            let result = handler.execute(name, &args).await.unwrap();
            assert_eq!(result.is_error, Some(true), "{} {}", name, args);
        }
    }

    #[tokio::test]
    async fn test_missing_store_is_tool_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.calendar.db_path = dir.path().join("missing.sqlitedb");

        let result = ToolHandler::new(Arc::new(config))
            .execute("get-recent-events", &json!({}))
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
        assert!(result.first_text().unwrap().contains("Cannot open calendar store"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let fixture = Fixture::standard();
        let err = handler(&fixture)
            .execute("delete-all-events", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolNotFound(_)));
    }
}
