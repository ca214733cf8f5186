//! Query options

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default number of events for recent/upcoming queries
pub const DEFAULT_EVENTS_LIMIT: u32 = 10;

/// Default number of results for text search
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Largest limit accepted from callers
pub const MAX_LIMIT: u32 = 100;

/// Options for recent and upcoming event queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsOptions {
    pub limit: u32,
    /// Keep originals that were superseded by a rescheduled copy
    pub include_rescheduled: bool,
}

impl Default for EventsOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EVENTS_LIMIT,
            include_rescheduled: false,
        }
    }
}

/// Options for date range queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeOptions {
    /// Inclusive lower bound, ISO 8601
    pub start_date: String,
    /// Inclusive upper bound, ISO 8601
    pub end_date: String,
    pub include_rescheduled: bool,
}

impl DateRangeOptions {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            include_rescheduled: false,
        }
    }
}

/// Restricts search results relative to the current time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    #[default]
    All,
    Past,
    Future,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "past" => Ok(Self::Past),
            "future" => Ok(Self::Future),
            other => Err(Error::InvalidRequest(format!(
                "timeRange must be one of all, past, future (got '{}')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for text search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Substring matched against event titles
    pub query: String,
    pub limit: u32,
    pub time_range: TimeRange,
    pub include_rescheduled: bool,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: DEFAULT_SEARCH_LIMIT,
            time_range: TimeRange::All,
            include_rescheduled: false,
        }
    }
}
