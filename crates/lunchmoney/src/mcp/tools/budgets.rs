use crate::api::Outcome;
use lunchmoney_core::request::{Endpoint, Patch, QueryParams};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::item_count;
use serde::Deserialize;
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, pass_through, send, text_result,
    tool, trace_call, with_output_options, JsonRpcError, OutputArgs, Tool,
};

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "get_budget_summary",
            "Get budget summary for a specific date range. The budgeted and spending amounts will be broken down by month.",
            with_output_options(json!({
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Start date in YYYY-MM-DD format. Lunch Money currently only supports monthly budgets, so your date should be the start of a month (eg. 2021-04-01)"
                    },
                    "end_date": {
                        "type": "string",
                        "description": "End date in YYYY-MM-DD format. Lunch Money currently only supports monthly budgets, so your date should be the end of a month (eg. 2021-04-30)"
                    },
                    "currency": {
                        "type": "string",
                        "description": "Currency for budget (defaults to primary currency)"
                    }
                },
                "required": ["start_date", "end_date"]
            })),
        ),
        tool(
            "upsert_budget",
            "Create or update a budget for a specific category and month",
            json!({
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Budget month start date in YYYY-MM-DD format"
                    },
                    "category_id": {
                        "type": "number",
                        "description": "Category ID for the budget"
                    },
                    "amount": {
                        "type": "number",
                        "description": "Budget amount"
                    },
                    "currency": {
                        "type": "string",
                        "description": "Currency for budget (defaults to primary currency)"
                    }
                },
                "required": ["start_date", "category_id", "amount"]
            }),
        ),
        tool(
            "remove_budget",
            "Remove a budget for a specific category and month",
            json!({
                "type": "object",
                "properties": {
                    "start_date": {
                        "type": "string",
                        "description": "Budget month start date in YYYY-MM-DD format"
                    },
                    "category_id": {
                        "type": "number",
                        "description": "Category ID for the budget to remove"
                    }
                },
                "required": ["start_date", "category_id"]
            }),
        ),
    ]
}

pub async fn handle_get_budget_summary(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct BudgetSummaryArgs {
        start_date: String,
        end_date: String,
        currency: Option<String>,
        #[serde(flatten)]
        output: OutputArgs,
    }

    let args: BudgetSummaryArgs = parse_arguments(arguments)?;
    trace_call(global, "get_budget_summary", &args);

    let query = QueryParams::new()
        .push("start_date", &args.start_date)
        .push("end_date", &args.end_date)
        .push_non_blank("currency", args.currency.as_deref());

    match fetch::<serde_json::Value>(global, &Endpoint::get("/budgets").with_query(query)).await? {
        Outcome::Success(budgets) => {
            let summary = format!(
                "{} budget entries ({} to {})",
                item_count(&budgets),
                args.start_date,
                args.end_date
            );
            let options = FormatOptions::new("budgets").with_summary(summary);
            formatted_result(global, &budgets, &args.output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get budget summary", &status),
    }
}

pub async fn handle_upsert_budget(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UpsertBudgetArgs {
        start_date: String,
        category_id: i64,
        amount: f64,
        currency: Option<String>,
    }

    let args: UpsertBudgetArgs = parse_arguments(arguments)?;
    trace_call(global, "upsert_budget", &args);

    let body = Patch::new()
        .set("start_date", args.start_date)
        .set("category_id", args.category_id)
        .set("amount", args.amount)
        .set_non_blank("currency", args.currency);

    pass_through(
        global,
        &Endpoint::put("/budgets").with_body(body),
        "Failed to upsert budget",
    )
    .await
}

pub async fn handle_remove_budget(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct RemoveBudgetArgs {
        start_date: String,
        category_id: i64,
    }

    let args: RemoveBudgetArgs = parse_arguments(arguments)?;
    trace_call(global, "remove_budget", &args);

    let query = QueryParams::new()
        .push("start_date", &args.start_date)
        .push("category_id", args.category_id);

    match send(global, &Endpoint::delete("/budgets").with_query(query)).await? {
        Outcome::Success(_) => text_result("Budget removed successfully"),
        Outcome::Failure(status) => failure_result("Failed to remove budget", &status),
    }
}
