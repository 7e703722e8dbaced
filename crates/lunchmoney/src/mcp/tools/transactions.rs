use crate::api::Outcome;
use crate::prelude::f;
use crate::transactions::{list, search};
use lunchmoney_core::request::{Endpoint, Patch, QueryParams};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::transactions::{
    transaction_group_body, NewTransaction, TransactionFilters, TransactionUpdate,
};
use serde::Deserialize;
use serde_json::json;

use super::{
    failure_result, formatted_result, internal_error, parse_arguments, pass_through, send,
    text_result, tool, trace_call, with_output_options, JsonRpcError, OutputArgs, Tool,
};

fn transaction_fields_schema(required: bool) -> serde_json::Value {
    let mut schema = json!({
        "type": "object",
        "properties": {
            "date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
            "payee": {"type": "string", "description": "Payee name"},
            "amount": {"type": "string", "description": "Amount as string with up to 4 decimal places"},
            "currency": {"type": "string", "description": "Three-letter lowercase currency code"},
            "category_id": {"type": "number", "description": "Category ID"},
            "asset_id": {"type": "number", "description": "Asset ID for manual accounts"},
            "recurring_id": {"type": "number", "description": "Recurring expense ID"},
            "notes": {"type": "string", "description": "Transaction notes"},
            "status": {
                "type": "string",
                "enum": ["cleared", "uncleared", "pending"],
                "description": "Transaction status"
            },
            "external_id": {"type": "string", "description": "External ID (max 75 characters)"},
            "tags": {"type": "array", "items": {"type": "number"}, "description": "Array of tag IDs"}
        }
    });
    if required {
        schema["required"] = json!(["date", "payee", "amount"]);
    }
    schema
}

pub fn tools() -> Vec<Tool> {
    vec![
        tool(
            "get_transactions",
            "Retrieve transactions within a date range with optional filters",
            with_output_options(json!({
                "type": "object",
                "properties": {
                    "start_date": {"type": "string", "description": "Start date in YYYY-MM-DD format"},
                    "end_date": {"type": "string", "description": "End date in YYYY-MM-DD format"},
                    "tag_id": {"type": "number", "description": "Filter by tag ID"},
                    "recurring_id": {"type": "number", "description": "Filter by recurring expense ID"},
                    "plaid_account_id": {"type": "number", "description": "Filter by Plaid account ID"},
                    "category_id": {"type": "number", "description": "Filter by category ID"},
                    "asset_id": {"type": "number", "description": "Filter by asset ID"},
                    "is_group": {"type": "boolean", "description": "Filter by transaction groups"},
                    "status": {"type": "string", "description": "Filter by status: cleared, uncleared, pending"},
                    "offset": {
                        "type": "number",
                        "minimum": 0,
                        "description": "Number of transactions to skip (MCP server-side pagination)"
                    },
                    "limit": {
                        "type": "number",
                        "minimum": 0,
                        "description": "Maximum transactions to return (default: 1000, MCP server-side pagination)"
                    },
                    "debit_as_negative": {"type": "boolean", "description": "Pass true to return debit amounts as negative"},
                    "include_plaid_metadata": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include plaid_metadata in response (default: false). Set to true when you need original transaction names, merchant info, or Plaid category suggestions for corrections."
                    }
                },
                "required": ["start_date", "end_date"]
            })),
        ),
        tool(
            "get_single_transaction",
            "Get details of a specific transaction",
            json!({
                "type": "object",
                "properties": {
                    "transaction_id": {"type": "number", "description": "ID of the transaction to retrieve"},
                    "debit_as_negative": {"type": "boolean", "description": "Pass true to return debit amounts as negative"}
                },
                "required": ["transaction_id"]
            }),
        ),
        tool(
            "create_transactions",
            "Insert one or more transactions",
            json!({
                "type": "object",
                "properties": {
                    "transactions": {
                        "type": "array",
                        "items": transaction_fields_schema(true),
                        "description": "Array of transactions to create"
                    },
                    "apply_rules": {"type": "boolean", "description": "Apply account's rules to transactions"},
                    "skip_duplicates": {"type": "boolean", "description": "Skip transactions that are potential duplicates"},
                    "check_for_recurring": {"type": "boolean", "description": "Check if transactions are part of recurring expenses"},
                    "debit_as_negative": {"type": "boolean", "description": "Pass true if debits are provided as negative amounts"},
                    "skip_balance_update": {"type": "boolean", "description": "Skip updating balance for assets/accounts"}
                },
                "required": ["transactions"]
            }),
        ),
        tool(
            "update_transaction",
            "Update an existing transaction",
            json!({
                "type": "object",
                "properties": {
                    "transaction_id": {"type": "number", "description": "ID of the transaction to update"},
                    "transaction": {
                        "description": "Transaction data to update",
                        "type": "object",
                        "properties": transaction_fields_schema(false)["properties"].clone()
                    },
                    "debit_as_negative": {"type": "boolean", "description": "Pass true if debits are provided as negative amounts"},
                    "skip_balance_update": {"type": "boolean", "description": "Skip updating balance for assets/accounts"}
                },
                "required": ["transaction_id", "transaction"]
            }),
        ),
        tool(
            "unsplit_transactions",
            "Remove one or more transactions from a split",
            json!({
                "type": "object",
                "properties": {
                    "parent_ids": {
                        "type": "array",
                        "items": {"type": "number"},
                        "description": "Array of parent transaction IDs to unsplit"
                    },
                    "remove_parents": {"type": "boolean", "description": "If true, delete parent transactions"}
                },
                "required": ["parent_ids"]
            }),
        ),
        tool(
            "get_transaction_group",
            "Get details of a transaction group",
            json!({
                "type": "object",
                "properties": {
                    "transaction_id": {"type": "number", "description": "ID of the transaction group"}
                },
                "required": ["transaction_id"]
            }),
        ),
        tool(
            "create_transaction_group",
            "Create a transaction group",
            json!({
                "type": "object",
                "properties": {
                    "date": {"type": "string", "description": "Date in YYYY-MM-DD format"},
                    "payee": {"type": "string", "description": "Payee name for the group"},
                    "category_id": {"type": "number", "description": "Category ID for the group"},
                    "notes": {"type": "string", "description": "Notes for the group"},
                    "tags": {"type": "array", "items": {"type": "number"}, "description": "Array of tag IDs for the group"},
                    "transaction_ids": {
                        "type": "array",
                        "items": {"type": "number"},
                        "description": "Array of transaction IDs to group"
                    }
                },
                "required": ["date", "payee", "transaction_ids"]
            }),
        ),
        tool(
            "delete_transaction_group",
            "Delete a transaction group or a single transaction.",
            json!({
                "type": "object",
                "properties": {
                    "transaction_id": {"type": "number", "description": "ID of the transaction group to delete"}
                },
                "required": ["transaction_id"]
            }),
        ),
        tool(
            "search_transactions",
            "Search transactions by payee name, notes, or original name. Performs local filtering on API results. Use narrow date ranges for best performance.",
            with_output_options(json!({
                "type": "object",
                "properties": {
                    "start_date": {"type": "string", "description": "Start date in YYYY-MM-DD format"},
                    "end_date": {"type": "string", "description": "End date in YYYY-MM-DD format"},
                    "query": {
                        "type": "string",
                        "description": "Search query - matches against payee, notes, and original_name (case-insensitive)"
                    },
                    "category_id": {"type": "number", "description": "Optional category filter"},
                    "include_plaid_metadata": {
                        "type": "boolean",
                        "default": false,
                        "description": "Include plaid_metadata in response (default: false)"
                    }
                },
                "required": ["start_date", "end_date", "query"]
            })),
        ),
    ]
}

pub async fn handle_get_transactions(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct GetTransactionsArgs {
        #[serde(flatten)]
        filters: TransactionFilters,
        offset: Option<usize>,
        limit: Option<usize>,
        #[serde(default)]
        include_plaid_metadata: bool,
        #[serde(flatten)]
        output: OutputArgs,
    }

    let args: GetTransactionsArgs = parse_arguments(arguments)?;
    trace_call(global, "get_transactions", &args);

    let page = list::list_transactions_data(
        global,
        &args.filters,
        args.offset,
        args.limit,
        args.include_plaid_metadata,
    )
    .await
    .map_err(|e| internal_error(f!("Tool execution error: {e}")))?;

    match page {
        Outcome::Success(page) => {
            let summary = f!(
                "{} of {} transactions ({} to {})",
                page.transactions.len(),
                page.total_count,
                args.filters.start_date,
                args.filters.end_date
            );
            let options = FormatOptions::new("transactions").with_summary(summary);
            formatted_result(global, &page, &args.output, options)
        }
        Outcome::Failure(status) => failure_result(list::FAILURE_PREFIX, &status),
    }
}

pub async fn handle_get_single_transaction(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct SingleTransactionArgs {
        transaction_id: i64,
        debit_as_negative: Option<bool>,
    }

    let args: SingleTransactionArgs = parse_arguments(arguments)?;
    trace_call(global, "get_single_transaction", &args);

    let endpoint = Endpoint::get(f!("/transactions/{}", args.transaction_id))
        .with_query(QueryParams::new().push_opt("debit_as_negative", args.debit_as_negative));

    pass_through(global, &endpoint, "Failed to get transaction").await
}

pub async fn handle_create_transactions(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct CreateTransactionsArgs {
        transactions: Vec<NewTransaction>,
        apply_rules: Option<bool>,
        skip_duplicates: Option<bool>,
        check_for_recurring: Option<bool>,
        debit_as_negative: Option<bool>,
        skip_balance_update: Option<bool>,
    }

    let args: CreateTransactionsArgs = parse_arguments(arguments)?;
    trace_call(global, "create_transactions", &args);

    let transactions = serde_json::to_value(&args.transactions)
        .map_err(|e| internal_error(f!("Serialization error: {e}")))?;

    let body = Patch::new()
        .set("transactions", transactions)
        .set_opt("apply_rules", args.apply_rules)
        .set_opt("skip_duplicates", args.skip_duplicates)
        .set_opt("check_for_recurring", args.check_for_recurring)
        .set_opt("debit_as_negative", args.debit_as_negative)
        .set_opt("skip_balance_update", args.skip_balance_update);

    pass_through(
        global,
        &Endpoint::post("/transactions").with_body(body),
        "Failed to create transactions",
    )
    .await
}

pub async fn handle_update_transaction(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UpdateTransactionArgs {
        transaction_id: i64,
        transaction: TransactionUpdate,
        debit_as_negative: Option<bool>,
        skip_balance_update: Option<bool>,
    }

    let args: UpdateTransactionArgs = parse_arguments(arguments)?;
    trace_call(global, "update_transaction", &args);

    let transaction = serde_json::to_value(&args.transaction)
        .map_err(|e| internal_error(f!("Serialization error: {e}")))?;

    let body = Patch::new()
        .set("transaction", transaction)
        .set_opt("debit_as_negative", args.debit_as_negative)
        .set_opt("skip_balance_update", args.skip_balance_update);

    pass_through(
        global,
        &Endpoint::put(f!("/transactions/{}", args.transaction_id)).with_body(body),
        "Failed to update transaction",
    )
    .await
}

pub async fn handle_unsplit_transactions(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UnsplitArgs {
        parent_ids: Vec<i64>,
        remove_parents: Option<bool>,
    }

    let args: UnsplitArgs = parse_arguments(arguments)?;
    trace_call(global, "unsplit_transactions", &args);

    let body = Patch::new()
        .set("parent_ids", args.parent_ids)
        .set_opt("remove_parents", args.remove_parents);

    pass_through(
        global,
        &Endpoint::post("/transactions/unsplit").with_body(body),
        "Failed to unsplit transactions",
    )
    .await
}

#[derive(Debug, Deserialize)]
struct TransactionGroupArgs {
    transaction_id: i64,
}

pub async fn handle_get_transaction_group(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: TransactionGroupArgs = parse_arguments(arguments)?;
    trace_call(global, "get_transaction_group", &args);

    pass_through(
        global,
        &Endpoint::get(f!("/transactions/group/{}", args.transaction_id)),
        "Failed to get transaction group",
    )
    .await
}

pub async fn handle_create_transaction_group(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct CreateGroupArgs {
        date: String,
        payee: String,
        transaction_ids: Vec<i64>,
        category_id: Option<i64>,
        notes: Option<String>,
        tags: Option<Vec<i64>>,
    }

    let args: CreateGroupArgs = parse_arguments(arguments)?;
    trace_call(global, "create_transaction_group", &args);

    let body = transaction_group_body(
        &args.date,
        &args.payee,
        &args.transaction_ids,
        args.category_id,
        args.notes.as_deref(),
        args.tags.as_deref(),
    );

    pass_through(
        global,
        &Endpoint::post("/transactions/group").with_body(body),
        "Failed to create transaction group",
    )
    .await
}

pub async fn handle_delete_transaction_group(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: TransactionGroupArgs = parse_arguments(arguments)?;
    trace_call(global, "delete_transaction_group", &args);

    let endpoint = Endpoint::delete(f!("/transactions/group/{}", args.transaction_id));

    match send(global, &endpoint).await? {
        Outcome::Success(_) => text_result("Transaction group deleted successfully"),
        Outcome::Failure(status) => failure_result("Failed to delete transaction group", &status),
    }
}

pub async fn handle_search_transactions(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct SearchArgs {
        start_date: String,
        end_date: String,
        query: String,
        category_id: Option<i64>,
        #[serde(default)]
        include_plaid_metadata: bool,
        #[serde(flatten)]
        output: OutputArgs,
    }

    let args: SearchArgs = parse_arguments(arguments)?;
    trace_call(global, "search_transactions", &args);

    let filters = TransactionFilters {
        category_id: args.category_id,
        ..TransactionFilters::new(args.start_date, args.end_date)
    };

    let output = search::search_transactions_data(
        global,
        &filters,
        &args.query,
        args.include_plaid_metadata,
    )
    .await
    .map_err(|e| internal_error(f!("Tool execution error: {e}")))?;

    match output {
        Outcome::Success(output) => {
            let options = FormatOptions::new("transaction-search")
                .with_summary(f!("{} transactions match {:?}", output.match_count, output.query));
            formatted_result(global, &output, &args.output, options)
        }
        Outcome::Failure(status) => failure_result(search::FAILURE_PREFIX, &status),
    }
}
