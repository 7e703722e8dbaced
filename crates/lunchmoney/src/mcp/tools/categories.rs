use crate::api::Outcome;
use crate::prelude::f;
use lunchmoney_core::request::{Endpoint, Patch, QueryParams};
use lunchmoney_core::response::FormatOptions;
use lunchmoney_core::upstream::{count_summary, extract_list};
use serde::Deserialize;
use serde_json::json;

use super::{
    failure_result, fetch, formatted_result, parse_arguments, pass_through, tool, trace_call,
    with_output_options, JsonRpcError, OutputArgs, Tool,
};

/// Listing shape for `GET /categories`
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFormat {
    #[default]
    Flattened,
    Nested,
}

impl CategoryFormat {
    fn as_str(&self) -> &'static str {
        match self {
            CategoryFormat::Flattened => "flattened",
            CategoryFormat::Nested => "nested",
        }
    }
}

/// Properties written by create and update; omitted flags are sent as `false`.
#[derive(Debug, Deserialize)]
struct CategoryProperties {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    is_income: bool,
    #[serde(default)]
    exclude_from_budget: bool,
    #[serde(default)]
    exclude_from_totals: bool,
}

impl CategoryProperties {
    fn into_patch(self) -> Patch {
        Patch::new()
            .set("name", self.name)
            .set("description", self.description)
            .set("is_income", self.is_income)
            .set("exclude_from_budget", self.exclude_from_budget)
            .set("exclude_from_totals", self.exclude_from_totals)
    }
}

/// Members added to a category group
#[derive(Debug, Default, Deserialize)]
struct GroupMembers {
    category_ids: Option<Vec<i64>>,
    new_categories: Option<Vec<String>>,
}

impl GroupMembers {
    fn apply(self, patch: Patch) -> Patch {
        patch
            .set_non_empty("category_ids", self.category_ids)
            .set_non_empty("new_categories", self.new_categories)
    }
}

fn property_schema() -> serde_json::Map<String, serde_json::Value> {
    let properties = json!({
        "name": {
            "type": "string",
            "description": "Name of category. Must be between 1 and 40 characters."
        },
        "description": {
            "type": "string",
            "default": "",
            "description": "Description of category. Must be less than 140 characters."
        },
        "is_income": {
            "type": "boolean",
            "default": false,
            "description": "Whether or not transactions in this category should be treated as income."
        },
        "exclude_from_budget": {
            "type": "boolean",
            "default": false,
            "description": "Whether or not transactions in this category should be excluded from budgets."
        },
        "exclude_from_totals": {
            "type": "boolean",
            "default": false,
            "description": "Whether or not transactions in this category should be excluded from calculated totals."
        }
    });

    match properties {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn members_schema() -> serde_json::Map<String, serde_json::Value> {
    let properties = json!({
        "category_ids": {
            "type": "array",
            "items": {"type": "number"},
            "description": "Array of category_id to include in the category group."
        },
        "new_categories": {
            "type": "array",
            "items": {"type": "string"},
            "description": "Array of strings representing new categories to create and subsequently include in the category group."
        }
    });

    match properties {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn object_schema(
    properties: serde_json::Map<String, serde_json::Value>,
    required: &[&str],
) -> serde_json::Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn tools() -> Vec<Tool> {
    let category_properties = {
        let mut properties = property_schema();
        properties.insert(
            "archived".to_string(),
            json!({
                "type": "boolean",
                "default": false,
                "description": "Whether or not category should be archived."
            }),
        );
        properties.insert(
            "group_id".to_string(),
            json!({
                "type": "number",
                "description": "Assigns the newly-created category to an existing category group."
            }),
        );
        properties
    };

    let mut update_properties = category_properties.clone();
    update_properties.insert(
        "categoryId".to_string(),
        json!({
            "type": "string",
            "description": "Id of the category or category group to update. Execute the get_all_categories tool first, to get the category ids."
        }),
    );

    let mut group_properties = property_schema();
    group_properties.extend(members_schema());

    let mut add_properties = members_schema();
    add_properties.insert(
        "group_id".to_string(),
        json!({
            "type": "number",
            "description": "Id of the parent group to add to."
        }),
    );

    let mut delete_properties = serde_json::Map::new();
    delete_properties.insert(
        "category_id".to_string(),
        json!({
            "type": "number",
            "description": "Id of the category or the category group to delete."
        }),
    );

    vec![
        tool(
            "get_all_categories",
            "Get a flattened list of all categories in alphabetical order associated with the user's account.",
            with_output_options(json!({
                "type": "object",
                "properties": {
                    "format": {
                        "type": "string",
                        "enum": ["flattened", "nested"],
                        "description": "Can either flattened or nested. If flattened, returns a singular array of categories, ordered alphabetically. If nested, returns top-level categories (either category groups or categories not part of a category group) in an array. Subcategories are nested within the category group under the property children."
                    }
                },
                "required": []
            })),
        ),
        tool(
            "get_single_category",
            "Get hydrated details on a single category. Note that if this category is part of a category group, its properties (is_income, exclude_from_budget, exclude_from_totals) will inherit from the category group.",
            json!({
                "type": "object",
                "properties": {
                    "categoryId": {
                        "type": "string",
                        "description": "Id of the category to query. Should call the get_all_categories tool first to get the ids."
                    }
                },
                "required": ["categoryId"]
            }),
        ),
        tool(
            "create_category",
            "Create a single category.",
            object_schema(category_properties, &["name"]),
        ),
        tool(
            "create_category_group",
            "Create a single category group.",
            object_schema(group_properties, &["name"]),
        ),
        tool(
            "update_category",
            "Update the properties for a single category or category group.",
            object_schema(update_properties, &["name", "categoryId"]),
        ),
        tool(
            "add_to_category_group",
            "Add categories (either existing or new) to a single category group.",
            object_schema(add_properties, &["group_id"]),
        ),
        tool(
            "delete_category",
            "Delete a single category or category group. This will only work if there are no dependencies, such as existing budgets for the category, categorized transactions, categorized recurring items, etc. If there are dependents, this endpoint will return what the dependents are and how many there are.",
            object_schema(delete_properties.clone(), &["category_id"]),
        ),
        tool(
            "force_delete_category",
            "Delete a single category or category group and along with it, disassociate the category from any transactions, recurring items, budgets, etc. Note: it is best practice to first try the Delete Category endpoint to ensure you don't accidentally delete any data. Disassociation/deletion of the data arising from this endpoint is irreversible!",
            object_schema(delete_properties, &["category_id"]),
        ),
    ]
}

pub async fn handle_get_all_categories(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct AllCategoriesArgs {
        #[serde(default)]
        format: CategoryFormat,
        #[serde(flatten)]
        output: OutputArgs,
    }

    let args: AllCategoriesArgs = parse_arguments(arguments)?;
    trace_call(global, "get_all_categories", &args);

    let endpoint = Endpoint::get("/categories")
        .with_query(QueryParams::new().push("format", args.format.as_str()));

    match fetch::<serde_json::Value>(global, &endpoint).await? {
        Outcome::Success(body) => {
            let categories = extract_list(body, "categories");
            let options = FormatOptions::new("categories")
                .with_summary(count_summary(&categories, "categories"));
            formatted_result(global, &categories, &args.output, options)
        }
        Outcome::Failure(status) => failure_result("Failed to get all categories", &status),
    }
}

pub async fn handle_get_single_category(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct SingleCategoryArgs {
        #[serde(rename = "categoryId")]
        category_id: String,
    }

    let args: SingleCategoryArgs = parse_arguments(arguments)?;
    trace_call(global, "get_single_category", &args);

    pass_through(
        global,
        &Endpoint::get(f!("/categories/{}", args.category_id)),
        "Failed to get single category",
    )
    .await
}

pub async fn handle_create_category(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct CreateCategoryArgs {
        #[serde(flatten)]
        properties: CategoryProperties,
        #[serde(default)]
        archived: bool,
        group_id: Option<i64>,
    }

    let args: CreateCategoryArgs = parse_arguments(arguments)?;
    trace_call(global, "create_category", &args);

    let body = args
        .properties
        .into_patch()
        .set("archived", args.archived)
        .set_opt("group_id", args.group_id);

    pass_through(
        global,
        &Endpoint::post("/categories").with_body(body),
        "Failed to create a single category",
    )
    .await
}

pub async fn handle_create_category_group(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct CreateCategoryGroupArgs {
        #[serde(flatten)]
        properties: CategoryProperties,
        #[serde(flatten)]
        members: GroupMembers,
    }

    let args: CreateCategoryGroupArgs = parse_arguments(arguments)?;
    trace_call(global, "create_category_group", &args);

    let body = args.members.apply(args.properties.into_patch());

    pass_through(
        global,
        &Endpoint::post("/categories/group").with_body(body),
        "Failed to create a single category group",
    )
    .await
}

pub async fn handle_update_category(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct UpdateCategoryArgs {
        #[serde(rename = "categoryId")]
        category_id: String,
        #[serde(flatten)]
        properties: CategoryProperties,
        #[serde(default)]
        archived: bool,
        group_id: Option<i64>,
    }

    let args: UpdateCategoryArgs = parse_arguments(arguments)?;
    trace_call(global, "update_category", &args);

    let body = args
        .properties
        .into_patch()
        .set("archived", args.archived)
        .set_opt("group_id", args.group_id);

    pass_through(
        global,
        &Endpoint::put(f!("/categories/{}", args.category_id)).with_body(body),
        "Failed to update a single category",
    )
    .await
}

pub async fn handle_add_to_category_group(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    #[derive(Debug, Deserialize)]
    struct AddToGroupArgs {
        group_id: i64,
        #[serde(flatten)]
        members: GroupMembers,
    }

    let args: AddToGroupArgs = parse_arguments(arguments)?;
    trace_call(global, "add_to_category_group", &args);

    let body = args.members.apply(Patch::new());

    pass_through(
        global,
        &Endpoint::post(f!("/categories/group/{}/add", args.group_id)).with_body(body),
        "Failed to add to a single category group",
    )
    .await
}

#[derive(Debug, Deserialize)]
struct DeleteCategoryArgs {
    category_id: i64,
}

pub async fn handle_delete_category(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: DeleteCategoryArgs = parse_arguments(arguments)?;
    trace_call(global, "delete_category", &args);

    pass_through(
        global,
        &Endpoint::delete(f!("/categories/{}", args.category_id)),
        "Failed to delete a single category or category group",
    )
    .await
}

pub async fn handle_force_delete_category(
    arguments: Option<serde_json::Value>,
    global: &crate::Global,
) -> Result<serde_json::Value, JsonRpcError> {
    let args: DeleteCategoryArgs = parse_arguments(arguments)?;
    trace_call(global, "force_delete_category", &args);

    pass_through(
        global,
        &Endpoint::delete(f!("/categories/{}/force", args.category_id)),
        "Failed to force delete a single category or category group",
    )
    .await
}
