//! MCP (Model Context Protocol) server implementation
//!
//! Provides a stdio JSON-RPC interface exposing the calendar tools.

mod protocol;
mod tools;

pub use protocol::*;
pub use tools::*;

use std::sync::Arc;

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::APP_NAME;

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC code for unparseable input
const PARSE_ERROR: i32 = -32700;

/// MCP Server for the Calendar store
pub struct McpServer {
    config: Arc<Config>,
    tools: ToolHandler,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: Arc<Config>) -> Self {
        let tools = ToolHandler::new(config.clone());
        Self { config, tools }
    }

    /// Run the MCP server on stdio
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting MCP server on stdio (store: {:?})",
            self.config.calendar_db_path()
        );

        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve newline-delimited JSON-RPC from `reader` until EOF
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = String::new();

        loop {
            line.clear();
            let n = reader.read_line(&mut line).await?;

            if n == 0 {
                debug!("Received EOF, shutting down");
                break;
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Received request: {}", line);

            let request: JsonRpcRequest = match serde_json::from_str(line) {
                Ok(r) => r,
                Err(e) => {
                    warn!("Unparseable request: {}", e);
                    let response = JsonRpcResponse::failure(
                        None,
                        JsonRpcError {
                            code: PARSE_ERROR,
                            message: format!("Parse error: {}", e),
                            data: None,
                        },
                    );
                    write_message(&mut writer, &response).await?;
                    continue;
                }
            };

            let response = self.handle_request(&request).await;

            if request.is_notification() {
                debug!("Notification {} handled, no response", request.method);
                continue;
            }

            write_message(&mut writer, &response).await?;
        }

        Ok(())
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let start = std::time::Instant::now();
        let method = &request.method;

        // Log incoming request (with tool name if it's a tool call)
        let request_desc = if method == "tools/call" {
            let tool_name = request
                .params
                .as_ref()
                .and_then(|p| p["name"].as_str())
                .unwrap_or("unknown");
            format!("tools/call:{}", tool_name)
        } else {
            method.clone()
        };

        info!("→ {}", request_desc);

        let result = match method.as_str() {
            "initialize" => self.handle_initialize(),
            "ping" => Ok(serde_json::json!({})),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tools_call(&request.params).await,
            m if m.starts_with("notifications/") => Ok(Value::Null),
            _ => Err(Error::MethodNotFound(method.clone())),
        };

        let elapsed_ms = start.elapsed().as_millis();

        match result {
            Ok(value) => {
                // Log slow requests with warning
                if elapsed_ms > 1000 {
                    warn!("← {} OK ({}ms) SLOW", request_desc, elapsed_ms);
                } else {
                    info!("← {} OK ({}ms)", request_desc, elapsed_ms);
                }
                JsonRpcResponse::success(request.id.clone(), value)
            }
            Err(e) => {
                error!("← {} ERROR ({}ms): {}", request_desc, elapsed_ms, e);
                JsonRpcResponse::failure(
                    request.id.clone(),
                    JsonRpcError {
                        code: e.rpc_code(),
                        message: e.to_string(),
                        data: Some(serde_json::json!({
                            "code": e.mcp_code(),
                            "action": e.action_hint()
                        })),
                    },
                )
            }
        }
    }

    fn handle_initialize(&self) -> Result<Value> {
        Ok(serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": APP_NAME,
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            }
        }))
    }

    fn handle_tools_list(&self) -> Result<Value> {
        Ok(serde_json::json!({
            "tools": get_tool_definitions()
        }))
    }

    async fn handle_tools_call(&self, params: &Option<Value>) -> Result<Value> {
        let params = params
            .as_ref()
            .ok_or_else(|| Error::InvalidRequest("Missing params".to_string()))?;

        let name = params["name"]
            .as_str()
            .ok_or_else(|| Error::InvalidRequest("Missing tool name".to_string()))?;

        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(Value::Object(Default::default()));

        let result = self.tools.execute(name, &arguments).await?;
        Ok(serde_json::to_value(result)?)
    }
}

async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &JsonRpcResponse,
) -> Result<()> {
    let response_json = serde_json::to_string(response)?;
    debug!("Sending response: {}", response_json);
    writer.write_all(response_json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
