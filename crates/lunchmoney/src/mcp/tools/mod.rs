mod assets;
mod budgets;
mod categories;
mod crypto;
mod plaid_accounts;
mod recurring_items;
mod tags;
mod transactions;

use crate::api::{LunchMoneyClient, Outcome};
use crate::prelude::{eprintln, *};
use lunchmoney_core::request::Endpoint;
use lunchmoney_core::response::{FormatOptions, OutputFormatter, ResponseFormat, ResponseMode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// Re-export types needed by tool handlers
pub use super::{JsonRpcError, Tool};

// MCP Protocol types for tools
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ServerCapabilities {
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Serialize)]
pub struct ToolsCapability {}

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
pub struct ToolsList {
    pub tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

/// `response_format` / `response_mode` arguments shared by the listing tools
#[derive(Debug, Default, Deserialize)]
pub struct OutputArgs {
    #[serde(default)]
    pub response_format: ResponseFormat,
    #[serde(default)]
    pub response_mode: ResponseMode,
}

pub fn handle_initialize() -> Result<serde_json::Value, JsonRpcError> {
    let result = InitializeResult {
        protocol_version: "2024-11-05".to_string(),
        capabilities: ServerCapabilities {
            tools: Some(ToolsCapability {}),
        },
        server_info: ServerInfo {
            name: "lunchmoney".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    };

    serde_json::to_value(result).map_err(|e| internal_error(f!("Internal error: {e}")))
}

pub fn handle_tools_list() -> Result<serde_json::Value, JsonRpcError> {
    let tools: Vec<Tool> = [
        assets::tools(),
        budgets::tools(),
        categories::tools(),
        crypto::tools(),
        plaid_accounts::tools(),
        recurring_items::tools(),
        tags::tools(),
        transactions::tools(),
    ]
    .into_iter()
    .flatten()
    .collect();

    serde_json::to_value(ToolsList { tools })
        .map_err(|e| internal_error(f!("Internal error: {e}")))
}

pub async fn handle_tools_call(
    params: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let params: CallToolParams = serde_json::from_value(params.unwrap_or(serde_json::Value::Null))
        .map_err(|e| JsonRpcError::new(JsonRpcError::INVALID_PARAMS, f!("Invalid params: {e}")))?;

    let arguments = params.arguments;

    match params.name.as_str() {
        "get_all_assets" => assets::handle_get_all_assets(arguments, global).await,
        "create_asset" => assets::handle_create_asset(arguments, global).await,
        "update_asset" => assets::handle_update_asset(arguments, global).await,
        "get_budget_summary" => budgets::handle_get_budget_summary(arguments, global).await,
        "upsert_budget" => budgets::handle_upsert_budget(arguments, global).await,
        "remove_budget" => budgets::handle_remove_budget(arguments, global).await,
        "get_all_categories" => categories::handle_get_all_categories(arguments, global).await,
        "get_single_category" => categories::handle_get_single_category(arguments, global).await,
        "create_category" => categories::handle_create_category(arguments, global).await,
        "create_category_group" => {
            categories::handle_create_category_group(arguments, global).await
        }
        "update_category" => categories::handle_update_category(arguments, global).await,
        "add_to_category_group" => {
            categories::handle_add_to_category_group(arguments, global).await
        }
        "delete_category" => categories::handle_delete_category(arguments, global).await,
        "force_delete_category" => {
            categories::handle_force_delete_category(arguments, global).await
        }
        "get_all_crypto" => crypto::handle_get_all_crypto(arguments, global).await,
        "update_manual_crypto" => crypto::handle_update_manual_crypto(arguments, global).await,
        "get_all_plaid_accounts" => {
            plaid_accounts::handle_get_all_plaid_accounts(arguments, global).await
        }
        "trigger_plaid_fetch" => {
            plaid_accounts::handle_trigger_plaid_fetch(arguments, global).await
        }
        "get_recurring_items" => {
            recurring_items::handle_get_recurring_items(arguments, global).await
        }
        "get_all_tags" => tags::handle_get_all_tags(arguments, global).await,
        "get_transactions" => transactions::handle_get_transactions(arguments, global).await,
        "get_single_transaction" => {
            transactions::handle_get_single_transaction(arguments, global).await
        }
        "create_transactions" => {
            transactions::handle_create_transactions(arguments, global).await
        }
        "update_transaction" => transactions::handle_update_transaction(arguments, global).await,
        "unsplit_transactions" => {
            transactions::handle_unsplit_transactions(arguments, global).await
        }
        "get_transaction_group" => {
            transactions::handle_get_transaction_group(arguments, global).await
        }
        "create_transaction_group" => {
            transactions::handle_create_transaction_group(arguments, global).await
        }
        "delete_transaction_group" => {
            transactions::handle_delete_transaction_group(arguments, global).await
        }
        "search_transactions" => {
            transactions::handle_search_transactions(arguments, global).await
        }
        _ => Err(JsonRpcError::new(
            JsonRpcError::INVALID_PARAMS,
            f!("Unknown tool: {}", params.name),
        )),
    }
}

/// Deserialize tool arguments. Missing arguments are treated as `{}` so
/// tools whose fields are all optional can be called bare.
pub(crate) fn parse_arguments<T: DeserializeOwned>(
    arguments: Option<serde_json::Value>,
) -> Result<T, JsonRpcError> {
    let arguments = match arguments {
        None | Some(serde_json::Value::Null) => serde_json::json!({}),
        Some(value) => value,
    };

    serde_json::from_value(arguments).map_err(|e| {
        JsonRpcError::new(JsonRpcError::INVALID_PARAMS, f!("Invalid arguments: {e}"))
    })
}

pub(crate) fn internal_error(message: impl std::fmt::Display) -> JsonRpcError {
    JsonRpcError::new(JsonRpcError::INTERNAL_ERROR, message.to_string())
}

pub(crate) fn trace_call(global: &crate::Global, tool: &str, args: &impl std::fmt::Debug) {
    if global.verbose {
        eprintln!("Calling {tool}: {args:?}");
    }
    log::debug!("tools/call {tool}");
}

/// Wrap text in the MCP result format.
pub(crate) fn text_result(text: impl Into<String>) -> Result<serde_json::Value, JsonRpcError> {
    let result = CallToolResult {
        content: vec![Content::Text { text: text.into() }],
        is_error: None,
    };

    serde_json::to_value(result).map_err(|e| internal_error(f!("Internal error: {e}")))
}

/// `"{prefix}: {status}"` as a regular text result.
pub(crate) fn failure_result(prefix: &str, status: &str) -> Result<serde_json::Value, JsonRpcError> {
    text_result(lunchmoney_core::upstream::failure_message(prefix, status))
}

/// Compact JSON of an upstream payload, passed through unchanged.
pub(crate) fn json_result(value: &serde_json::Value) -> Result<serde_json::Value, JsonRpcError> {
    let text =
        serde_json::to_string(value).map_err(|e| internal_error(f!("Serialization error: {e}")))?;
    text_result(text)
}

/// Shape `data` with the requested format/mode, spilling to the temp root
/// in file mode.
pub(crate) fn formatted_result<T: Serialize + ?Sized>(
    global: &crate::Global,
    data: &T,
    output: &OutputArgs,
    options: FormatOptions,
) -> Result<serde_json::Value, JsonRpcError> {
    let formatter = OutputFormatter::new(&global.tmp_dir);
    let text = formatter
        .format_response(data, output.response_format, output.response_mode, &options)
        .map_err(|e| internal_error(f!("Tool execution error: {e}")))?;

    if output.response_mode == ResponseMode::File {
        log::info!("{} response written under {}", options.tool_name, formatter.root().display());
    }

    text_result(text)
}

/// Call upstream and parse the JSON body.
pub(crate) async fn fetch<T: DeserializeOwned>(
    global: &crate::Global,
    endpoint: &Endpoint,
) -> Result<Outcome<T>, JsonRpcError> {
    let client =
        LunchMoneyClient::from_global(global).map_err(|e| internal_error(f!("Tool execution error: {e}")))?;

    client
        .execute_json(endpoint)
        .await
        .map_err(|e| internal_error(f!("Tool execution error: {e}")))
}

/// Call upstream ignoring the body; used by tools that answer with fixed text.
pub(crate) async fn send(
    global: &crate::Global,
    endpoint: &Endpoint,
) -> Result<Outcome<String>, JsonRpcError> {
    let client =
        LunchMoneyClient::from_global(global).map_err(|e| internal_error(f!("Tool execution error: {e}")))?;

    client
        .execute(endpoint)
        .await
        .map_err(|e| internal_error(f!("Tool execution error: {e}")))
}

/// Tool whose only job is to forward a request and echo the JSON reply.
pub(crate) async fn pass_through(
    global: &crate::Global,
    endpoint: &Endpoint,
    failure_prefix: &str,
) -> Result<serde_json::Value, JsonRpcError> {
    match fetch::<serde_json::Value>(global, endpoint).await? {
        Outcome::Success(body) => json_result(&body),
        Outcome::Failure(status) => failure_result(failure_prefix, &status),
    }
}

/// Build a tool definition.
pub(crate) fn tool(name: &str, description: &str, input_schema: serde_json::Value) -> Tool {
    Tool {
        name: name.to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Add the `response_format` / `response_mode` properties to a schema.
pub(crate) fn with_output_options(mut schema: serde_json::Value) -> serde_json::Value {
    if let Some(properties) = schema
        .get_mut("properties")
        .and_then(serde_json::Value::as_object_mut)
    {
        properties.insert(
            "response_format".to_string(),
            serde_json::json!({
                "type": "string",
                "enum": ["json", "toon"],
                "default": "json",
                "description": "Response format: 'json' (default) or 'toon' (Token-Oriented Object Notation). TOON reduces token usage by ~40% for uniform arrays."
            }),
        );
        properties.insert(
            "response_mode".to_string(),
            serde_json::json!({
                "type": "string",
                "enum": ["inline", "file"],
                "default": "inline",
                "description": "Response mode: 'inline' (default) returns data in the response. 'file' writes data to a temp file and returns the path with a summary, keeping the context window small for large result sets."
            }),
        );
    }
    schema
}
