use crate::api::{LunchMoneyClient, Outcome};
use crate::prelude::{println, *};
use colored::Colorize;
use lunchmoney_core::transactions::{
    search_transactions, SearchOutput, TransactionFilters, TransactionsResponse,
};

pub const FAILURE_PREFIX: &str = "Failed to search transactions";

/// Options for searching transactions
#[derive(Debug, clap::Args, Clone)]
#[command(after_help = "EXAMPLES:
  # Every coffee purchase this year:
  lunchmoney transactions search 2024-01-01 2024-12-31 coffee

  # Restrict to one category:
  lunchmoney transactions search 2024-01-01 2024-03-31 amazon --category-id 315172

NOTES:
  - Matching is a case-insensitive substring match on payee, notes and original name
  - The whole date range is fetched and filtered locally")]
pub struct SearchOptions {
    /// Start date (YYYY-MM-DD)
    pub start_date: String,

    /// End date (YYYY-MM-DD)
    pub end_date: String,

    /// Text to look for
    pub query: String,

    /// Filter by category ID before searching
    #[arg(long)]
    pub category_id: Option<i64>,

    /// Keep `plaid_metadata` on each match
    #[arg(long)]
    pub include_plaid_metadata: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Public data function - used by both CLI and MCP
pub async fn search_transactions_data(
    global: &crate::Global,
    filters: &TransactionFilters,
    query: &str,
    include_plaid_metadata: bool,
) -> Result<Outcome<SearchOutput>> {
    let client = LunchMoneyClient::from_global(global)?;

    let response = client
        .execute_json::<TransactionsResponse>(&filters.endpoint(None, None))
        .await?;

    Ok(response.map(|response| {
        let scanned = response.transactions.len();
        let output = search_transactions(response.transactions, query, include_plaid_metadata);
        log::debug!("{} of {} transactions match {:?}", output.match_count, scanned, query);
        output
    }))
}

pub async fn handler(options: SearchOptions, global: crate::Global) -> Result<()> {
    let filters = TransactionFilters {
        category_id: options.category_id,
        ..TransactionFilters::new(&options.start_date, &options.end_date)
    };

    let output = search_transactions_data(
        &global,
        &filters,
        &options.query,
        options.include_plaid_metadata,
    )
    .await?
    .into_result(FAILURE_PREFIX)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "Found {} match(es) for {}:\n",
        output.match_count,
        output.query.bold()
    );

    if output.transactions.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }

    super::print_table(&output.transactions);

    Ok(())
}
