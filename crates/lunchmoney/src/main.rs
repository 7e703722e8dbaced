use crate::prelude::*;
use clap::Parser;

mod api;
mod error;
mod mcp;
mod prelude;
mod transactions;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Lunch Money personal finance tools for LLM agents"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Lunch Money API base URL
    #[clap(
        long,
        env = "LUNCHMONEY_BASE_URL",
        global = true,
        default_value = api::DEFAULT_BASE_URL
    )]
    base_url: String,

    /// Lunch Money API access token
    #[clap(long, env = "LUNCHMONEY_API_TOKEN", global = true, hide_env_values = true)]
    api_token: Option<String>,

    /// Directory where `response_mode: file` payloads are written
    #[clap(
        long,
        env = "LUNCHMONEY_MCP_TMP_DIR",
        global = true,
        default_value = lunchmoney_core::response::DEFAULT_TMP_DIR
    )]
    tmp_dir: std::path::PathBuf,

    /// Whether to display additional information.
    #[clap(long, env = "LUNCHMONEY_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Model Context Protocol server
    MCP(crate::mcp::App),

    /// Lunch Money transaction operations
    #[clap(name = "transactions", alias = "tx")]
    Transactions(crate::transactions::App),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::MCP(sub_app) => crate::mcp::run(sub_app, app.global).await,
        SubCommands::Transactions(sub_app) => crate::transactions::run(sub_app, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
