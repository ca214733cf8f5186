//! Calendar MCP Core Library
//!
//! Read-only queries over the macOS Calendar SQLite store, event formatting,
//! and an MCP server exposing the queries as tools.

pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod mcp;
pub mod models;
pub mod time;

pub use config::Config;
pub use db::CalendarStore;
pub use error::{Error, Result};
pub use models::*;

/// Seconds between the Unix epoch and the Core Data epoch (2001-01-01T00:00:00Z)
pub const CORE_DATA_EPOCH: i64 = 978_307_200;

/// Application name for config paths
pub const APP_NAME: &str = "calendar-mcp";
