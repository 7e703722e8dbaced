use crate::api::{LunchMoneyClient, Outcome};
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use lunchmoney_core::transactions::{
    window, TransactionFilters, TransactionWindow, TransactionsResponse, DEFAULT_LIMIT,
};

pub const FAILURE_PREFIX: &str = "Failed to get transactions";

/// Options for listing transactions
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # First page of January:
  lunchmoney transactions list 2024-01-01 2024-01-31

  # Next page, keeping the Plaid enrichment data:
  lunchmoney transactions list 2024-01-01 2024-01-31 --offset 1000 --include-plaid-metadata --json

NOTES:
  - The API returns the whole date range; --offset/--limit slice it locally
  - Narrow date ranges keep responses small")]
pub struct ListOptions {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,

    /// End date (YYYY-MM-DD)
    pub end_date: String,

    /// Filter by category ID
    #[arg(long)]
    pub category_id: Option<i64>,

    /// Filter by tag ID
    #[arg(long)]
    pub tag_id: Option<i64>,

    /// Filter by asset ID
    #[arg(long)]
    pub asset_id: Option<i64>,

    /// Filter by status: cleared, uncleared, pending
    #[arg(long)]
    pub status: Option<String>,

    /// Number of transactions to skip
    #[arg(long, default_value = "0")]
    pub offset: usize,

    /// Maximum number of transactions to return
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Keep `plaid_metadata` on each transaction
    #[arg(long)]
    pub include_plaid_metadata: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function - used by both CLI and MCP.
///
/// `offset`/`limit` are forwarded to the API when given, then applied
/// locally to the full listing it returns.
pub async fn list_transactions_data(
    global: &crate::Global,
    filters: &TransactionFilters,
    offset: Option<usize>,
    limit: Option<usize>,
    include_plaid_metadata: bool,
) -> Result<Outcome<TransactionWindow>> {
    let client = LunchMoneyClient::from_global(global)?;
    let endpoint = filters.endpoint(offset, limit);

    let response = client.execute_json::<TransactionsResponse>(&endpoint).await?;

    Ok(response.map(|response| {
        let page = window(
            response.transactions,
            offset.unwrap_or(0),
            limit.unwrap_or(DEFAULT_LIMIT),
        );
        log::debug!(
            "windowed {} of {} transactions (offset {}, limit {})",
            page.transactions.len(),
            page.total_count,
            page.offset,
            page.limit
        );
        page.with_plaid_metadata(include_plaid_metadata)
    }))
}

pub async fn handler(options: ListOptions, global: crate::Global) -> Result<()> {
    let filters = TransactionFilters {
        category_id: options.category_id,
        tag_id: options.tag_id,
        asset_id: options.asset_id,
        status: options.status.clone(),
        ..TransactionFilters::new(&options.start_date, &options.end_date)
    };

    let page = list_transactions_data(
        &global,
        &filters,
        Some(options.offset),
        Some(options.limit),
        options.include_plaid_metadata,
    )
    .await?
    .into_result(FAILURE_PREFIX)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    println!(
        "Showing {} of {} transaction(s) ({} to {}):\n",
        page.transactions.len(),
        page.total_count,
        options.start_date,
        options.end_date
    );

    if page.transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    super::print_table(&page.transactions);

    if page.has_more {
        eprintln!(
            "\n{}\n  lunchmoney transactions list {} {} --offset {} --limit {}",
            "To fetch the next page, run:".yellow(),
            options.start_date,
            options.end_date,
            page.offset + page.limit,
            page.limit
        );
    }

    Ok(())
}
