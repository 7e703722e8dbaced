pub mod list;
pub mod search;

use crate::prelude::{eprintln, *};
use lunchmoney_core::transactions::Transaction;

/// Transactions module app - root command
#[derive(Debug, clap::Parser)]
#[command(name = "transactions")]
#[command(about = "Lunch Money transaction operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// List transactions in a date range, paginated locally
    #[clap(name = "list")]
    List(list::ListOptions),

    /// Search transactions by payee, notes or original name
    #[clap(name = "search")]
    Search(search::SearchOptions),
}

/// Run transaction commands
pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Running transactions command...");
    }

    match app.command {
        Commands::List(options) => list::handler(options, global).await,
        Commands::Search(options) => search::handler(options, global).await,
    }
}

/// Render transactions as a CLI table.
pub(crate) fn print_table(transactions: &[Transaction]) {
    let mut table = new_table();
    table.set_titles(prettytable::row!["ID", "Date", "Payee", "Amount", "Currency", "Category"]);

    for transaction in transactions {
        table.add_row(prettytable::row![
            transaction.display_field("id"),
            transaction.display_field("date"),
            transaction.display_field("payee"),
            transaction.display_field("amount"),
            transaction.display_field("currency"),
            transaction.display_field("category_name")
        ]);
    }

    table.printstd();
}
