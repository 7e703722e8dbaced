mod cli;
mod sse;
mod stdio;
mod tools;

pub use cli::App;

use crate::prelude::*;
use serde::{Deserialize, Serialize};

// JSON-RPC 2.0 types
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: String,
    id: Option<serde_json::Value>,
    method: String,
    params: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    jsonrpc: String,
    id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcError {
    pub const PARSE_ERROR: i32 = -32700;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

// MCP Protocol types
#[derive(Debug, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    match app.command {
        cli::Commands::Stdio => stdio::run_stdio(global).await,
        cli::Commands::Sse(options) => sse::run_sse(options, global).await,
    }
}

/// Handle one JSON-RPC message.
///
/// Notifications (no `id`, `notifications/*`) get no response.
pub async fn handle_request(request_str: &str, global: &crate::Global) -> Option<JsonRpcResponse> {
    let request: JsonRpcRequest = match serde_json::from_str(request_str) {
        Ok(req) => req,
        Err(e) => {
            return Some(JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                id: None,
                result: None,
                error: Some(JsonRpcError::new(
                    JsonRpcError::PARSE_ERROR,
                    format!("Parse error: {e}"),
                )),
            });
        }
    };

    if request.id.is_none() && request.method.starts_with("notifications/") {
        log::debug!("notification: {}", request.method);
        return None;
    }

    let result = match request.method.as_str() {
        "initialize" => tools::handle_initialize(),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => tools::handle_tools_list(),
        "tools/call" => tools::handle_tools_call(request.params, global).await,
        method => Err(JsonRpcError::new(
            JsonRpcError::METHOD_NOT_FOUND,
            format!("Method not found: {method}"),
        )),
    };

    Some(match result {
        Ok(value) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: Some(value),
            error: None,
        },
        Err(error) => JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id: request.id,
            result: None,
            error: Some(error),
        },
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::{json, Value};

    pub(crate) fn global(base_url: &str, tmp_dir: &std::path::Path) -> crate::Global {
        crate::Global {
            base_url: base_url.to_string(),
            api_token: Some("test-token".to_string()),
            tmp_dir: tmp_dir.to_path_buf(),
            verbose: false,
        }
    }

    async fn roundtrip(global: &crate::Global, request: Value) -> Value {
        let response = handle_request(&request.to_string(), global)
            .await
            .expect("expected a response");
        serde_json::to_value(response).unwrap()
    }

    #[tokio::test]
    async fn test_parse_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = global("http://127.0.0.1:1", dir.path());

        let response = handle_request("{not json", &global).await.unwrap();
        let value = serde_json::to_value(response).unwrap();

        assert_eq!(value["error"]["code"], -32700);
        assert_eq!(value["id"], Value::Null);
    }

    #[tokio::test]
    async fn test_method_not_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = global("http://127.0.0.1:1", dir.path());

        let value = roundtrip(
            &global,
            json!({"jsonrpc": "2.0", "id": 7, "method": "resources/list"}),
        )
        .await;

        assert_eq!(value["id"], 7);
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["error"]["message"], "Method not found: resources/list");
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = global("http://127.0.0.1:1", dir.path());

        let value = roundtrip(
            &global,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .await;

        assert_eq!(value["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(value["result"]["serverInfo"]["name"], "lunchmoney");
        assert!(value.get("error").is_none());
    }

    #[tokio::test]
    async fn test_notification_has_no_response() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = global("http://127.0.0.1:1", dir.path());

        let request = json!({"jsonrpc": "2.0", "method": "notifications/initialized"});
        assert!(handle_request(&request.to_string(), &global).await.is_none());
    }

    #[tokio::test]
    async fn test_tools_list_names() {
        let dir = tempfile::TempDir::new().unwrap();
        let global = global("http://127.0.0.1:1", dir.path());

        let value = roundtrip(
            &global,
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        )
        .await;

        let tools = value["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 29);

        let names: Vec<&str> = tools.iter().filter_map(|t| t["name"].as_str()).collect();
        for name in ["get_all_assets", "get_transactions", "search_transactions", "trigger_plaid_fetch"] {
            assert!(names.contains(&name), "missing {name}");
        }
        for tool in tools {
            assert_eq!(tool["inputSchema"]["type"], "object");
        }
    }
}
