//! Error types for calendar-mcp

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using calendar-mcp's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for calendar-mcp
#[derive(Error, Debug)]
pub enum Error {
    // Store errors
    #[error("Cannot open calendar store at {path:?}: {reason}")]
    StoreOpen { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    // Input errors
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // MCP errors
    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Returns a JSON-RPC error code for this error
    pub fn rpc_code(&self) -> i32 {
        match self {
            Error::McpProtocol(_) => -32600,
            Error::MethodNotFound(_) => -32601,
            Error::InvalidRequest(_) | Error::InvalidDate(_) | Error::ToolNotFound(_) => -32602,
            _ => -32000,
        }
    }

    /// Returns an error code suitable for MCP error responses
    pub fn mcp_code(&self) -> &'static str {
        match self {
            Error::StoreOpen { .. } => "STORE_UNAVAILABLE",
            Error::Database(_) => "DATABASE_ERROR",
            Error::InvalidDate(_) => "INVALID_DATE",
            Error::InvalidRequest(_) => "INVALID_REQUEST",
            Error::McpProtocol(_) => "PROTOCOL_ERROR",
            Error::MethodNotFound(_) => "METHOD_NOT_FOUND",
            Error::ToolNotFound(_) => "TOOL_NOT_FOUND",
            Error::Config(_) | Error::InvalidConfig { .. } | Error::TomlParse(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Returns a user-friendly action message for recoverable errors
    pub fn action_hint(&self) -> Option<&'static str> {
        match self {
            Error::StoreOpen { .. } => Some(
                "Check that Calendar.app has synced locally and grant Full Disk Access to the application running this server",
            ),
            Error::InvalidDate(_) => {
                Some("Use ISO 8601 dates such as 2024-01-31 or 2024-01-31T09:00:00Z")
            }
            Error::InvalidConfig { .. } | Error::TomlParse(_) => {
                Some("Fix ~/.config/calendar-mcp/config.toml")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_open_has_hint() {
        let err = Error::StoreOpen {
            path: PathBuf::from("/nope/Calendar.sqlitedb"),
            reason: "unable to open database file".to_string(),
        };
        assert_eq!(err.mcp_code(), "STORE_UNAVAILABLE");
        assert!(err.action_hint().is_some());
        assert!(err.to_string().contains("Calendar.sqlitedb"));
    }

    #[test]
    fn test_rpc_codes() {
        assert_eq!(Error::MethodNotFound("x".into()).rpc_code(), -32601);
        assert_eq!(Error::InvalidDate("x".into()).rpc_code(), -32602);
        assert_eq!(Error::Other("x".into()).rpc_code(), -32000);
    }
}
