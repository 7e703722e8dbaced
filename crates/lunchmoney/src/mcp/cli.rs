#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Serve the Lunch Money tools over the Model Context Protocol")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Serve newline-delimited JSON-RPC on stdin/stdout (for agent hosts that spawn the server)
    #[clap(name = "stdio")]
    Stdio,

    /// Serve JSON-RPC over HTTP: `POST /message` for requests, `GET /sse` for the event stream
    #[clap(name = "sse")]
    Sse(SseOptions),
}

/// Where the HTTP transport listens
#[derive(Debug, clap::Args)]
pub struct SseOptions {
    /// Port to listen on
    #[arg(short, long, env = "LUNCHMONEY_MCP_PORT", default_value_t = 3000)]
    pub port: u16,

    /// Address to bind; use 0.0.0.0 to accept remote agents
    #[arg(long, env = "LUNCHMONEY_MCP_HOST", default_value = "127.0.0.1")]
    pub host: String,
}

impl SseOptions {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
