use crate::api::Outcome;
use crate::prelude::f;
use lunchmoney_core::request::{Endpoint, Patch};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde::Deserialize;
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, pass_through, tool, trace_call,
    with_output_options, JsonRpcError, OutputArgs, Tool,
};

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "get_all_crypto",
            "Get a list of all cryptocurrency assets associated with the user",
            with_output_options(json!({
                "type": "object",
                "properties": {},
                "required": []
            })),
        ),
        tool(
            "update_manual_crypto",
            "Update a manually-managed cryptocurrency asset balance",
            json!({
                "type": "object",
                "properties": {
                    "crypto_id": {
                        "type": "number",
                        "description": "ID of the crypto asset to update"
                    },
                    "balance": {
                        "type": "number",
                        "description": "Updated balance of the crypto asset"
                    }
                },
                "required": ["crypto_id"]
            }),
        ),
    ]
}

pub async fn handle_get_all_crypto(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let output: OutputArgs = parse_arguments(arguments)?;
    trace_call(global, "get_all_crypto", &output);

    match fetch::<serde_json::Value>(global, &Endpoint::get("/crypto")).await? {
        Outcome::Success(body) => {
            let crypto = extract_list(body, "crypto");
            let options =
                FormatOptions::new("crypto").with_summary(count_summary(&crypto, "crypto assets"));
            formatted_result(global, &crypto, &output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get crypto assets", &status),
    }
}

pub async fn handle_update_manual_crypto(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UpdateCryptoArgs {
        crypto_id: i64,
        balance: Option<f64>,
    }

    let args: UpdateCryptoArgs = parse_arguments(arguments)?;
    trace_call(global, "update_manual_crypto", &args);

    let body = Patch::new().set_opt("balance", args.balance.map(|balance| balance.to_string()));

    pass_through(
        global,
        &Endpoint::put(f!("/crypto/manual/{}", args.crypto_id)).with_body(body),
        "Failed to update crypto asset",
    )
    .await
}
