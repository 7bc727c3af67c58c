use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

/// webtools-mcp: web fetch, screenshot, search, and memory tools over MCP
#[derive(Parser)]
#[command(name = "webtools-mcp", version, about)]
struct Cli {
    /// Run Chrome with a visible window (default: headless)
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr only — stdout is the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();
    let headless = !cli.headed;

    tracing::info!("Starting webtools-mcp server (headless: {})", headless);

    let server = webtools_mcp::server::WebToolsServer::new(headless);
    let service = server.clone().serve(stdio()).await?;

    // Serve until the client disconnects or we get a termination signal
    tokio::select! {
        result = service.waiting() => { result?; }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received interrupt signal, shutting down");
        }
    }

    // Always release Chrome before exiting
    server.shutdown().await;

    tracing::info!("webtools-mcp server shut down");
    Ok(())
}
