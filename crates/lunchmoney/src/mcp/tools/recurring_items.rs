use crate::api::Outcome;
use lunchmoney_core::request::{Endpoint, QueryParams};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde::Deserialize;
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, tool, trace_call,
    with_output_options, JsonRpcError, OutputArgs, Tool,
};

pub fn tools() -> Vec<Tool> {
    vec![tool(
        "get_recurring_items",
        "Retrieve a list of recurring items to expect for a specified month",
        with_output_options(json!({
            "type": "object",
            "properties": {
                "start_date": {
                    "type": "string",
                    "description": "Start date in YYYY-MM-DD format. Defaults to first day of current month"
                },
                "end_date": {
                    "type": "string",
                    "description": "End date in YYYY-MM-DD format"
                },
                "debit_as_negative": {
                    "type": "boolean",
                    "description": "Pass true to return debit amounts as negative"
                }
            },
            "required": []
        })),
    )]
}

pub async fn handle_get_recurring_items(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct RecurringItemsArgs {
        start_date: Option<String>,
        end_date: Option<String>,
        debit_as_negative: Option<bool>,
        #[serde(flatten)]
        output: OutputArgs,
    }

    let args: RecurringItemsArgs = parse_arguments(arguments)?;
    trace_call(global, "get_recurring_items", &args);

    let query = QueryParams::new()
        .push_non_blank("start_date", args.start_date.as_deref())
        .push_non_blank("end_date", args.end_date.as_deref())
        .push_opt("debit_as_negative", args.debit_as_negative);

    match fetch::<serde_json::Value>(global, &Endpoint::get("/recurring_items").with_query(query))
        .await?
    {
        Outcome::Success(body) => {
            let items = extract_list(body, "recurring_items");
            let options = FormatOptions::new("recurring-items")
                .with_summary(count_summary(&items, "recurring items"));
            formatted_result(global, &items, &args.output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get recurring items", &status),
    }
}
