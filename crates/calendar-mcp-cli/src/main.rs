//! Calendar CLI
//!
//! Runs the same read-only queries as the MCP tools from a terminal.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use calendar_mcp_core::config::Config;
use calendar_mcp_core::db::with_store;
use calendar_mcp_core::mcp::EVENT_NOT_FOUND;
use calendar_mcp_core::models::{
    DateRangeOptions, EventStatus, EventsOptions, FormattedDetailedEvent, FormattedEvent,
    SearchOptions, TimeRange, TodaysEvents, DEFAULT_EVENTS_LIMIT, DEFAULT_SEARCH_LIMIT,
};
use calendar_mcp_core::time::Zone;

#[derive(Parser)]
#[command(name = "calendar")]
#[command(about = "Read-only access to macOS Calendar events")]
#[command(long_about = "Queries the macOS Calendar database directly (read-only).

The terminal needs Full Disk Access to read
~/Library/Group Containers/group.com.apple.calendar/Calendar.sqlitedb.

OUTPUT FORMAT:
  All commands output JSON by default, matching the MCP tool payloads.
  Add --human for direct terminal reading.

EXAMPLES:
  calendar upcoming --limit 5
  calendar range 2024-01-01 2024-01-31
  calendar search standup --time-range past
  calendar show 1234 --human")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in human-readable format instead of JSON. Applies to all subcommands.
    #[arg(long, global = true)]
    human: bool,

    /// Calendar database to read instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Events that have already started, most recent first
    Recent {
        /// Number of events to return (1-100)
        #[arg(long, default_value_t = DEFAULT_EVENTS_LIMIT, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,

        /// Include originals of rescheduled events
        #[arg(long)]
        include_rescheduled: bool,
    },
    /// Events that start in the future, soonest first
    Upcoming {
        /// Number of events to return (1-100)
        #[arg(long, default_value_t = DEFAULT_EVENTS_LIMIT, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,

        /// Include originals of rescheduled events
        #[arg(long)]
        include_rescheduled: bool,
    },
    /// Events starting between two dates (inclusive)
    Range {
        /// Start date, e.g. 2024-01-01 or 2024-01-01T09:00:00
        start: String,

        /// End date, e.g. 2024-01-31
        end: String,

        /// Include originals of rescheduled events
        #[arg(long)]
        include_rescheduled: bool,
    },
    /// Search event titles (case-insensitive substring)
    Search {
        /// Text to look for in event titles
        query: String,

        /// Maximum number of results (1-100)
        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, value_parser = clap::value_parser!(u32).range(1..=100))]
        limit: u32,

        /// Restrict to past or future events: all, past, future
        #[arg(long, default_value_t = TimeRange::All)]
        time_range: TimeRange,

        /// Include originals of rescheduled events
        #[arg(long)]
        include_rescheduled: bool,
    },
    /// Events overlapping today
    Today {
        /// Include originals of rescheduled events
        #[arg(long)]
        include_rescheduled: bool,
    },
    /// Full details of one event
    Show {
        /// Event ID (the `id` field in other commands' output)
        id: i64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_default();
    if let Some(db) = cli.db {
        config.calendar.db_path = db;
    }
    debug!("Using calendar store at {:?}", config.calendar_db_path());

    let zone = config.zone()?;
    let path = config.calendar_db_path().to_path_buf();
    let human = cli.human;

    match cli.command {
        Commands::Recent {
            limit,
            include_rescheduled,
        } => {
            let options = EventsOptions {
                limit,
                include_rescheduled,
            };
            let events = with_store(&path, |store| store.recent_events(&options))?;
            output(&events, human, |events| print_events_human(events, &zone))?;
        }

        Commands::Upcoming {
            limit,
            include_rescheduled,
        } => {
            let options = EventsOptions {
                limit,
                include_rescheduled,
            };
            let events = with_store(&path, |store| store.upcoming_events(&options))?;
            output(&events, human, |events| print_events_human(events, &zone))?;
        }

        Commands::Range {
            start,
            end,
            include_rescheduled,
        } => {
            let options = DateRangeOptions {
                start_date: start,
                end_date: end,
                include_rescheduled,
            };
            let events = with_store(&path, |store| store.events_by_date_range(&options, &zone))?;
            output(&events, human, |events| print_events_human(events, &zone))?;
        }

        Commands::Search {
            query,
            limit,
            time_range,
            include_rescheduled,
        } => {
            let options = SearchOptions {
                query,
                limit,
                time_range,
                include_rescheduled,
            };
            let events = with_store(&path, |store| store.search_events(&options))?;
            output(&events, human, |events| print_events_human(events, &zone))?;
        }

        Commands::Today {
            include_rescheduled,
        } => {
            let today = with_store(&path, |store| store.todays_events(include_rescheduled, &zone))?;
            output(&today, human, |today| print_today_human(today, &zone))?;
        }

        Commands::Show { id } => match with_store(&path, |store| store.event_details(id))? {
            Some(event) => output(&event, human, |event| print_event_detail_human(event, &zone))?,
            None => {
                if human {
                    println!("{}.", EVENT_NOT_FOUND);
                } else {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({
                            "error": EVENT_NOT_FOUND
                        }))?
                    );
                }
            }
        },
    }

    Ok(())
}

/// Print `value` as pretty JSON, or through `render` in human mode
fn output<T: Serialize>(value: &T, human: bool, render: impl FnOnce(&T)) -> Result<()> {
    if human {
        render(value);
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Render an ISO timestamp in the display zone
fn format_time_human(iso: Option<&str>, all_day: bool, zone: &Zone) -> String {
    let Some(instant) = iso
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
    else {
        return "(no time)".to_string();
    };

    // All-day boundaries are stored as midnight, so only the date is meaningful
    let pattern = if all_day { "%a %b %-d, %Y" } else { "%a %b %-d, %Y %H:%M" };

    match zone {
        Zone::Local => instant.with_timezone(&chrono::Local).format(pattern).to_string(),
        Zone::Named(tz) => instant.with_timezone(tz).format(pattern).to_string(),
    }
}

fn format_when(event: &FormattedEvent, zone: &Zone) -> String {
    let start = format_time_human(event.start_time.as_deref(), event.all_day, zone);
    if event.start_time.is_none() {
        return start;
    }
    let end = format_time_human(event.end_time.as_deref(), event.all_day, zone);
    if event.all_day {
        format!("{} - {} (all day)", start, end)
    } else {
        format!("{} - {}", start, end)
    }
}

fn print_event_summary(event: &FormattedEvent, zone: &Zone) {
    println!("📅 {}", event.title);
    println!("   When: {}", format_when(event, zone));
    if event.status != EventStatus::Confirmed {
        println!("   Status: {}", event.status);
    }
    if event.is_rescheduled {
        println!("   Rescheduled");
    }
    println!("   ID: {}", event.id);
}

fn print_events_human(events: &[FormattedEvent], zone: &Zone) {
    if events.is_empty() {
        println!("No events found.");
        return;
    }

    println!("\nFound {} events:\n", events.len());
    for event in events {
        print_event_summary(event, zone);
        println!();
    }
}

fn print_today_human(today: &TodaysEvents, zone: &Zone) {
    println!("\nToday ({})", today.date);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    if today.events.is_empty() {
        println!("Nothing scheduled.");
        return;
    }
    for event in &today.events {
        print_event_summary(event, zone);
        println!();
    }
}

fn print_event_detail_human(detail: &FormattedDetailedEvent, zone: &Zone) {
    let event = &detail.event;

    println!("\n📅 {}", event.title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("When: {}", format_when(event, zone));
    println!("Status: {}", event.status);
    if let Some(calendar) = &detail.calendar {
        println!("Calendar: {}", calendar);
    }
    if let Some(location) = &detail.location {
        println!("Where: {}", location);
    }
    if let Some(url) = &detail.url {
        println!("URL: {}", url);
    }
    if let Some(rule) = &detail.recurrence_rule {
        println!("Repeats: {}", rule);
    }
    if event.is_rescheduled {
        println!("Rescheduled from an earlier time");
    }
    println!("ID: {}", event.id);
    // Show description last
    if let Some(description) = &detail.description {
        println!("\n{}", description);
    }
}
