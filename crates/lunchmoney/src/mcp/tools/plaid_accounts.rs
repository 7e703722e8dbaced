use crate::api::Outcome;
use lunchmoney_core::request::Endpoint;
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, send, text_result, tool,
    trace_call, with_output_options, JsonRpcError, OutputArgs, Tool,
};

const FETCH_TRIGGERED: &str =
    "Plaid fetch triggered successfully. Fetching may take up to 5 minutes.";

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "get_all_plaid_accounts",
            "Get a list of all Plaid accounts associated with the user",
            with_output_options(json!({
                "type": "object",
                "properties": {},
                "required": []
            })),
        ),
        tool(
            "trigger_plaid_fetch",
            "Trigger a fetch of latest data from Plaid (Experimental). Note that fetching may take up to 5 minutes.",
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        ),
    ]
}

pub async fn handle_get_all_plaid_accounts(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let output: OutputArgs = parse_arguments(arguments)?;
    trace_call(global, "get_all_plaid_accounts", &output);

    match fetch::<serde_json::Value>(global, &Endpoint::get("/plaid_accounts")).await? {
        Outcome::Success(body) => {
            let accounts = extract_list(body, "plaid_accounts");
            let options = FormatOptions::new("plaid-accounts")
                .with_summary(count_summary(&accounts, "Plaid accounts"));
            formatted_result(global, &accounts, &output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get Plaid accounts", &status),
    }
}

pub async fn handle_trigger_plaid_fetch(
    _arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    trace_call(global, "trigger_plaid_fetch", &());

    match send(global, &Endpoint::post("/plaid_accounts/fetch")).await? {
        Outcome::Success(_) => text_result(FETCH_TRIGGERED),
        Outcome::Failure(status) => failure_result("Failed to trigger Plaid fetch", &status),
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{call, spawn_upstream, text_of};
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    #[tokio::test]
    async fn test_trigger_plaid_fetch() {
        let router = Router::new().route(
            "/plaid_accounts/fetch",
            post(|| async { Json(json!(true)) }),
        );
        let base_url = spawn_upstream(router).await;
        let dir = tempfile::TempDir::new().unwrap();
        let global = crate::mcp::tests::global(&base_url, dir.path());

        let result = call(&global, "trigger_plaid_fetch", serde_json::Value::Null)
            .await
            .unwrap();

        assert_eq!(text_of(&result), super::FETCH_TRIGGERED);
    }

    #[tokio::test]
    async fn test_trigger_plaid_fetch_rate_limited() {
        let router = Router::new().route(
            "/plaid_accounts/fetch",
            post(|| async { StatusCode::TOO_MANY_REQUESTS }),
        );
        let base_url = spawn_upstream(router).await;
        let dir = tempfile::TempDir::new().unwrap();
        let global = crate::mcp::tests::global(&base_url, dir.path());

        let result = call(&global, "trigger_plaid_fetch", json!({})).await.unwrap();

        assert_eq!(
            text_of(&result),
            "Failed to trigger Plaid fetch: Too Many Requests"
        );
    }
}
