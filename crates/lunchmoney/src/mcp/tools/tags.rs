use crate::api::Outcome;
use lunchmoney_core::request::Endpoint;
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, tool, trace_call,
    with_output_options, JsonRpcError, OutputArgs, Tool,
};

pub fn tools() -> Vec<Tool> {
    vec![tool(
        "get_all_tags",
        "Get a list of all tags associated with the user's account.",
        with_output_options(json!({
            "type": "object",
            "properties": {},
            "required": []
        })),
    )]
}

pub async fn handle_get_all_tags(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let output: OutputArgs = parse_arguments(arguments)?;
    trace_call(global, "get_all_tags", &output);

    match fetch::<serde_json::Value>(global, &Endpoint::get("/tags")).await? {
        Outcome::Success(body) => {
            let tags = extract_list(body, "tags");
            let options = FormatOptions::new("tags").with_summary(count_summary(&tags, "tags"));
            formatted_result(global, &tags, &output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get all tags", &status),
    }
}
