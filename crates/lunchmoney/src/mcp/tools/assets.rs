use crate::api::Outcome;
use crate::prelude::f;
use lunchmoney_core::request::{Endpoint, Patch};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, pass_through, tool, trace_call,
    with_output_options, JsonRpcError, OutputArgs, Tool,
};

/// Primary asset type as the API spells it
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AssetType {
    #[serde(rename = "cash")]
    Cash,
    #[serde(rename = "credit")]
    Credit,
    #[serde(rename = "investment")]
    Investment,
    #[serde(rename = "real estate")]
    RealEstate,
    #[serde(rename = "loan")]
    Loan,
    #[serde(rename = "vehicle")]
    Vehicle,
    #[serde(rename = "cryptocurrency")]
    Cryptocurrency,
    #[serde(rename = "employee compensation")]
    EmployeeCompensation,
    #[serde(rename = "other liability")]
    OtherLiability,
    #[serde(rename = "other asset")]
    OtherAsset,
}

const ASSET_TYPES: [&str; 10] = [
    "cash",
    "credit",
    "investment",
    "real estate",
    "loan",
    "vehicle",
    "cryptocurrency",
    "employee compensation",
    "other liability",
    "other asset",
];

/// Fields shared by create and update. The API wants `balance` as a string.
#[derive(Debug, Default, Deserialize)]
struct AssetFields {
    subtype_name: Option<String>,
    display_name: Option<String>,
    balance_as_of: Option<String>,
    currency: Option<String>,
    institution_name: Option<String>,
    closed_on: Option<String>,
    exclude_transactions: Option<bool>,
}

impl AssetFields {
    fn apply(self, patch: Patch) -> Patch {
        patch
            .set_non_blank("subtype_name", self.subtype_name)
            .set_non_blank("display_name", self.display_name)
            .set_non_blank("balance_as_of", self.balance_as_of)
            .set_non_blank("currency", self.currency)
            .set_non_blank("institution_name", self.institution_name)
            .set_non_blank("closed_on", self.closed_on)
            .set_opt("exclude_transactions", self.exclude_transactions)
    }
}

fn type_name_value(type_name: AssetType) -> serde_json::Value {
    serde_json::to_value(type_name).unwrap_or(serde_json::Value::Null)
}

pub fn tools() -> Vec<Tool> {
    let optional_properties = json!({
        "subtype_name": {
            "type": "string",
            "description": "Optional subtype (e.g., retirement, checking, savings)"
        },
        "display_name": {
            "type": "string",
            "description": "Display name of the asset (defaults to name)"
        },
        "balance_as_of": {
            "type": "string",
            "description": "Date/time the balance is as of in ISO 8601 format"
        },
        "currency": {
            "type": "string",
            "description": "Three-letter currency code (defaults to primary currency)"
        },
        "institution_name": {
            "type": "string",
            "description": "Name of the institution holding the asset"
        },
        "closed_on": {
            "type": "string",
            "description": "Date the asset was closed in YYYY-MM-DD format"
        },
        "exclude_transactions": {
            "type": "boolean",
            "description": "Whether to exclude this asset from transaction options"
        }
    });

    let mut create_properties = json!({
        "type_name": {
            "type": "string",
            "enum": ASSET_TYPES,
            "description": "Primary type of the asset"
        },
        "name": {
            "type": "string",
            "description": "Name of the asset"
        },
        "balance": {
            "type": "number",
            "description": "Current balance of the asset"
        }
    });
    let mut update_properties = json!({
        "asset_id": {
            "type": "number",
            "description": "ID of the asset to update"
        },
        "type_name": {
            "type": "string",
            "enum": ASSET_TYPES,
            "description": "Primary type of the asset"
        },
        "name": {
            "type": "string",
            "description": "Name of the asset"
        },
        "balance": {
            "type": "number",
            "description": "Current balance of the asset"
        }
    });
    if let (Some(shared), Some(create), Some(update)) = (
        optional_properties.as_object(),
        create_properties.as_object_mut(),
        update_properties.as_object_mut(),
    ) {
        for (key, value) in shared {
            create.insert(key.clone(), value.clone());
            update.insert(key.clone(), value.clone());
        }
    }

    vec![
        tool(
            "get_all_assets",
            "Get a list of all manually-managed assets associated with the user",
            with_output_options(json!({
                "type": "object",
                "properties": {},
                "required": []
            })),
        ),
        tool(
            "create_asset",
            "Create a new manually-managed asset",
            json!({
                "type": "object",
                "properties": create_properties,
                "required": ["type_name", "name", "balance"]
            }),
        ),
        tool(
            "update_asset",
            "Update an existing manually-managed asset",
            json!({
                "type": "object",
                "properties": update_properties,
                "required": ["asset_id"]
            }),
        ),
    ]
}

pub async fn handle_get_all_assets(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let output: OutputArgs = parse_arguments(arguments)?;
    trace_call(global, "get_all_assets", &output);

    match fetch::<serde_json::Value>(global, &Endpoint::get("/assets")).await? {
        Outcome::Success(body) => {
            let assets = extract_list(body, "assets");
            let options = FormatOptions::new("assets").with_summary(count_summary(&assets, "assets"));
            formatted_result(global, &assets, &output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get assets", &status),
    }
}

pub async fn handle_create_asset(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct CreateAssetArgs {
        type_name: AssetType,
        name: String,
        balance: f64,
        #[serde(flatten)]
        fields: AssetFields,
    }

    let args: CreateAssetArgs = parse_arguments(arguments)?;
    trace_call(global, "create_asset", &args);

    let body = args.fields.apply(
        Patch::new()
            .set("type_name", type_name_value(args.type_name))
            .set("name", args.name)
            .set("balance", args.balance.to_string()),
    );

    pass_through(
        global,
        &Endpoint::post("/assets").with_body(body),
        "Failed to create asset",
    )
    .await
}

pub async fn handle_update_asset(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UpdateAssetArgs {
        asset_id: i64,
        type_name: Option<AssetType>,
        name: Option<String>,
        balance: Option<f64>,
        #[serde(flatten)]
        fields: AssetFields,
    }

    let args: UpdateAssetArgs = parse_arguments(arguments)?;
    trace_call(global, "update_asset", &args);

    let body = args.fields.apply(
        Patch::new()
            .set_opt("type_name", args.type_name.map(type_name_value))
            .set_non_blank("name", args.name)
            .set_opt("balance", args.balance.map(|balance| balance.to_string())),
    );

    pass_through(
        global,
        &Endpoint::put(f!("/assets/{}", args.asset_id)).with_body(body),
        "Failed to update asset",
    )
    .await
}
