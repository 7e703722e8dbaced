use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

pub async fn run_stdio(global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Starting Lunch Money MCP server with stdio transport...");
        eprintln!();
    }

    let reader = BufReader::new(tokio::io::stdin());
    let answered = serve_lines(reader, tokio::io::stdout(), &global).await?;

    log::info!("stdin closed after {answered} response(s), shutting down");

    Ok(())
}

/// Answer newline-delimited JSON-RPC messages until `reader` hits EOF.
///
/// Blank lines are skipped and notifications produce no output line.
/// Returns the number of responses written.
pub(crate) async fn serve_lines<R, W>(mut reader: R, mut writer: W, global: &crate::Global) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    let mut answered = 0;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        log::debug!("<- {message}");
        if global.verbose {
            eprintln!("Received: {message}");
        }

        let Some(response) = super::handle_request(message, global).await else {
            log::debug!("notification, no reply");
            continue;
        };
        let response_json = serde_json::to_string(&response)?;

        log::debug!("-> {response_json}");
        if global.verbose {
            eprintln!("Sending: {response_json}");
        }

        writer.write_all(response_json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}
