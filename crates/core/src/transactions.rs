//! Transaction windowing, search, and request shapes
//!
//! The upstream listing endpoint ignores `offset`/`limit`, so the full
//! matching set is always returned and pagination happens here. Records are
//! kept as opaque JSON objects: only the few fields this module reads are
//! typed, everything else passes through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::{Endpoint, Patch, QueryParams};

/// Default number of records returned by a window.
pub const DEFAULT_LIMIT: usize = 1000;

/// Merchant enrichment field, stripped unless explicitly requested.
pub const PLAID_METADATA: &str = "plaid_metadata";

/// A transaction record as returned by the upstream API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction(pub Map<String, Value>);

impl Transaction {
    fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn payee(&self) -> Option<&str> {
        self.text("payee")
    }

    pub fn notes(&self) -> Option<&str> {
        self.text("notes")
    }

    pub fn original_name(&self) -> Option<&str> {
        self.text("original_name")
    }

    /// Display value for a field: strings unquoted, missing or null as empty.
    pub fn display_field(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn has_plaid_metadata(&self) -> bool {
        self.0.contains_key(PLAID_METADATA)
    }

    /// Remove the `plaid_metadata` key entirely (not set to null).
    pub fn strip_plaid_metadata(&mut self) {
        self.0.remove(PLAID_METADATA);
    }

    /// Case-insensitive substring match over payee, notes and original name.
    ///
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        [self.payee(), self.notes(), self.original_name()]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Listing response from `GET /transactions`
#[derive(Debug, Deserialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

/// Locally paginated slice of a transaction listing
#[derive(Debug, Clone, Serialize)]
pub struct TransactionWindow {
    pub transactions: Vec<Transaction>,
    pub total_count: usize,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
}

impl TransactionWindow {
    /// Apply the enrichment policy: keep `plaid_metadata` only when asked to.
    pub fn with_plaid_metadata(mut self, include: bool) -> Self {
        if !include {
            strip_plaid_metadata(&mut self.transactions);
        }
        self
    }
}

/// Slice `transactions` to `[offset, offset + limit)`.
///
/// `total_count` is the length before slicing, and `has_more` is true iff
/// more than `limit` records remain after skipping `offset`.
pub fn window(transactions: Vec<Transaction>, offset: usize, limit: usize) -> TransactionWindow {
    let total_count = transactions.len();
    let mut remaining = transactions;

    if offset > 0 {
        remaining.drain(..offset.min(remaining.len()));
    }

    let has_more = remaining.len() > limit;
    if limit < remaining.len() {
        remaining.truncate(limit);
    }

    TransactionWindow {
        transactions: remaining,
        total_count,
        offset,
        limit,
        has_more,
    }
}

/// Remove `plaid_metadata` from every record.
pub fn strip_plaid_metadata(transactions: &mut [Transaction]) {
    for transaction in transactions {
        transaction.strip_plaid_metadata();
    }
}

/// Keep records whose payee, notes or original name contain `query`,
/// ignoring case.
pub fn filter_transactions(transactions: Vec<Transaction>, query: &str) -> Vec<Transaction> {
    let needle = query.to_lowercase();
    transactions
        .into_iter()
        .filter(|transaction| transaction.matches(&needle))
        .collect()
}

/// Output of a local transaction search
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub match_count: usize,
    pub transactions: Vec<Transaction>,
}

/// Filter a listing by `query` and apply the enrichment policy.
pub fn search_transactions(
    transactions: Vec<Transaction>,
    query: &str,
    include_plaid_metadata: bool,
) -> SearchOutput {
    let mut matches = filter_transactions(transactions, query);
    if !include_plaid_metadata {
        strip_plaid_metadata(&mut matches);
    }

    SearchOutput {
        query: query.to_string(),
        match_count: matches.len(),
        transactions: matches,
    }
}

/// Filters accepted by `GET /transactions`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilters {
    pub start_date: String,
    pub end_date: String,
    pub tag_id: Option<i64>,
    pub recurring_id: Option<i64>,
    pub plaid_account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub is_group: Option<bool>,
    pub status: Option<String>,
    pub debit_as_negative: Option<bool>,
}

impl TransactionFilters {
    pub fn new(start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            end_date: end_date.into(),
            ..Self::default()
        }
    }

    /// Listing request. `offset`/`limit` are forwarded even though upstream
    /// ignores them; the real pagination is [`window`].
    pub fn endpoint(&self, offset: Option<usize>, limit: Option<usize>) -> Endpoint {
        let query = QueryParams::new()
            .push("start_date", &self.start_date)
            .push("end_date", &self.end_date)
            .push_opt("tag_id", self.tag_id)
            .push_opt("recurring_id", self.recurring_id)
            .push_opt("plaid_account_id", self.plaid_account_id)
            .push_opt("category_id", self.category_id)
            .push_opt("asset_id", self.asset_id)
            .push_opt("is_group", self.is_group)
            .push_opt("status", self.status.as_deref())
            .push_opt("offset", offset)
            .push_opt("limit", limit)
            .push_opt("debit_as_negative", self.debit_as_negative);

        Endpoint::get("/transactions").with_query(query)
    }
}

/// Transaction status accepted on create and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Cleared,
    Uncleared,
    Pending,
}

/// Transaction fields for `POST /transactions`. Absent fields are omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub date: String,
    pub payee: String,
    pub amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
}

/// Sparse update for `PUT /transactions/{id}`. Absent fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
}

/// Body for `POST /transactions/group`
pub fn transaction_group_body(
    date: &str,
    payee: &str,
    transaction_ids: &[i64],
    category_id: Option<i64>,
    notes: Option<&str>,
    tags: Option<&[i64]>,
) -> Patch {
    Patch::new()
        .set("date", date)
        .set("payee", payee)
        .set("transaction_ids", transaction_ids.to_vec())
        .set_opt("category_id", category_id)
        .set_opt("notes", notes)
        .set_opt("tags", tags.map(<[i64]>::to_vec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transaction(value: Value) -> Transaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_listing_requires_transactions_key() {
        let result = serde_json::from_str::<TransactionsResponse>(r#"{"error":"Invalid date"}"#);
        assert!(result.is_err());

        let listing: TransactionsResponse = serde_json::from_str(r#"{"transactions":[]}"#).unwrap();
        assert!(listing.transactions.is_empty());
    }

    fn numbered(n: usize) -> Vec<Transaction> {
        (0..n)
            .map(|id| transaction(json!({"id": id, "payee": format!("Payee {id}")})))
            .collect()
    }

    fn ids(window: &TransactionWindow) -> Vec<u64> {
        window
            .transactions
            .iter()
            .map(|t| t.0["id"].as_u64().unwrap())
            .collect()
    }

    #[test]
    fn test_window_first_page_of_many() {
        let result = window(numbered(1500), 0, 1000);
        assert_eq!(result.total_count, 1500);
        assert_eq!(result.transactions.len(), 1000);
        assert!(result.has_more);
        assert_eq!(ids(&result)[0], 0);
    }

    #[test]
    fn test_window_last_partial_page() {
        let result = window(numbered(1500), 1000, 1000);
        assert_eq!(result.total_count, 1500);
        assert_eq!(result.transactions.len(), 500);
        assert!(!result.has_more);
        assert_eq!(ids(&result)[0], 1000);
        assert_eq!(result.offset, 1000);
        assert_eq!(result.limit, 1000);
    }

    #[test]
    fn test_window_offset_past_end() {
        let result = window(numbered(5), 10, 1000);
        assert_eq!(result.total_count, 5);
        assert!(result.transactions.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn test_window_offset_equal_to_length() {
        let result = window(numbered(5), 5, 1);
        assert!(result.transactions.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn test_window_zero_limit() {
        let result = window(numbered(3), 1, 0);
        assert!(result.transactions.is_empty());
        assert!(result.has_more);

        let result = window(numbered(3), 3, 0);
        assert!(result.transactions.is_empty());
        assert!(!result.has_more);
    }

    #[test]
    fn test_window_exact_fit_has_no_more() {
        let result = window(numbered(10), 2, 8);
        assert_eq!(ids(&result), (2..10u64).collect::<Vec<_>>());
        assert!(!result.has_more);
    }

    #[test]
    fn test_window_counts_match_formula() {
        for n in [0usize, 1, 7, 20] {
            for o in 0..=n + 2 {
                for l in [0usize, 1, 3, 20] {
                    let result = window(numbered(n), o, l);
                    let remaining = n.saturating_sub(o);
                    assert_eq!(result.total_count, n);
                    assert_eq!(result.transactions.len(), l.min(remaining));
                    assert_eq!(result.has_more, remaining > l, "n={n} o={o} l={l}");
                }
            }
        }
    }

    #[test]
    fn test_plaid_metadata_stripped_by_default_policy() {
        let transactions = vec![
            transaction(json!({"id": 1, "plaid_metadata": {"merchant_name": "Blue Bottle"}})),
            transaction(json!({"id": 2, "plaid_metadata": null})),
            transaction(json!({"id": 3})),
        ];

        let result = window(transactions, 0, DEFAULT_LIMIT).with_plaid_metadata(false);

        assert_eq!(result.transactions.len(), 3);
        assert!(result.transactions.iter().all(|t| !t.has_plaid_metadata()));
        let text = serde_json::to_string(&result).unwrap();
        assert!(!text.contains("plaid_metadata"));
    }

    #[test]
    fn test_plaid_metadata_preserved_when_requested() {
        let metadata = json!({"merchant_name": "Blue Bottle", "category": ["Food"]});
        let transactions = vec![transaction(json!({"id": 1, "plaid_metadata": metadata}))];

        let result = window(transactions, 0, DEFAULT_LIMIT).with_plaid_metadata(true);

        assert_eq!(result.transactions[0].0[PLAID_METADATA], metadata);
    }

    #[test]
    fn test_total_count_ignores_stripping_and_slicing() {
        let transactions = (0..4)
            .map(|id| transaction(json!({"id": id, "plaid_metadata": {}})))
            .collect();

        let result = window(transactions, 1, 2).with_plaid_metadata(false);

        assert_eq!(result.total_count, 4);
        assert_eq!(ids(&result), vec![1, 2]);
        assert!(result.has_more);
    }

    #[test]
    fn test_window_envelope_field_order() {
        let result = window(numbered(1), 0, 10);
        let text = serde_json::to_string(&result).unwrap();
        assert!(text.starts_with("{\"transactions\":"));
        assert!(text.ends_with("\"total_count\":1,\"offset\":0,\"limit\":10,\"has_more\":false}"));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let transactions = vec![
            transaction(json!({"id": 1, "payee": "Coffee Shop"})),
            transaction(json!({"id": 2, "payee": "Bakery", "notes": "bread"})),
        ];

        for query in ["coffee", "COFFEE", "Coffee Shop"] {
            let result = filter_transactions(transactions.clone(), query);
            assert_eq!(result.len(), 1, "query {query}");
            assert_eq!(result[0].payee(), Some("Coffee Shop"));
        }
    }

    #[test]
    fn test_search_matches_notes_and_original_name() {
        let transactions = vec![
            transaction(json!({"id": 1, "payee": "Shop", "notes": "Monthly Coffee beans"})),
            transaction(json!({"id": 2, "payee": "SQ *BB", "original_name": "BLUE BOTTLE COFFEE"})),
            transaction(json!({"id": 3, "payee": "Bakery", "notes": null})),
            transaction(json!({"id": 4, "payee": null})),
        ];

        let result = filter_transactions(transactions, "coffee");
        let ids: Vec<u64> = result.iter().map(|t| t.0["id"].as_u64().unwrap()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_search_output_strips_metadata() {
        let transactions = vec![
            transaction(json!({"payee": "Coffee Shop", "plaid_metadata": {"x": 1}})),
            transaction(json!({"payee": "Bakery", "plaid_metadata": {"x": 2}})),
        ];

        let output = search_transactions(transactions.clone(), "coffee", false);
        assert_eq!(output.query, "coffee");
        assert_eq!(output.match_count, 1);
        assert!(!output.transactions[0].has_plaid_metadata());

        let output = search_transactions(transactions, "coffee", true);
        assert!(output.transactions[0].has_plaid_metadata());
    }

    #[test]
    fn test_display_field() {
        let t = transaction(json!({"payee": "Bakery", "amount": "4.5000", "id": 9, "notes": null}));
        assert_eq!(t.display_field("payee"), "Bakery");
        assert_eq!(t.display_field("amount"), "4.5000");
        assert_eq!(t.display_field("id"), "9");
        assert_eq!(t.display_field("notes"), "");
        assert_eq!(t.display_field("missing"), "");
    }

    #[test]
    fn test_filters_endpoint_query() {
        let mut filters = TransactionFilters::new("2024-01-01", "2024-01-31");
        filters.category_id = Some(12);
        filters.status = Some("cleared".to_string());
        filters.debit_as_negative = Some(true);

        let endpoint = filters.endpoint(Some(0), None);

        assert_eq!(endpoint.path, "/transactions");
        assert_eq!(
            endpoint.query.pairs(),
            &[
                ("start_date".to_string(), "2024-01-01".to_string()),
                ("end_date".to_string(), "2024-01-31".to_string()),
                ("category_id".to_string(), "12".to_string()),
                ("status".to_string(), "cleared".to_string()),
                ("offset".to_string(), "0".to_string()),
                ("debit_as_negative".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_transaction_update_is_sparse() {
        let update = TransactionUpdate {
            payee: Some("Bakery".to_string()),
            status: Some(TransactionStatus::Cleared),
            ..TransactionUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"payee": "Bakery", "status": "cleared"})
        );
    }

    #[test]
    fn test_transaction_group_body() {
        let body = transaction_group_body("2024-02-01", "Trip", &[1, 2], None, Some("split"), None);
        assert_eq!(
            body.into_value(),
            json!({"date": "2024-02-01", "payee": "Trip", "transaction_ids": [1, 2], "notes": "split"})
        );
    }
}
