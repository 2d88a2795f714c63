//! `fileagent-mcp`: serve the sandboxed file tools as an MCP stdio server.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use fileagent::io::config::load_config;
use fileagent::logging;
use fileagent::tools::ToolRegistry;
use fileagent_mcp::FileToolsServer;
use rmcp::ServiceExt;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "fileagent-mcp",
    version,
    about = "Serve sandboxed list/search/read file tools over MCP stdio"
)]
struct Cli {
    /// Path to the TOML config (defaults apply when missing).
    #[arg(long, default_value = "fileagent.toml")]
    config: PathBuf,

    /// Directory the tools are confined to; overrides `root_dir`.
    #[arg(long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config =
        load_config(&cli.config).with_context(|| format!("load {}", cli.config.display()))?;
    if let Some(root) = cli.root {
        config.root_dir = root;
    }
    let registry = ToolRegistry::from_config(&config)
        .with_context(|| format!("open root_dir {}", config.root_dir.display()))?;
    info!(root = %registry.sandbox().root().display(), "starting file tools server");

    let service = FileToolsServer::new(registry)
        .serve(rmcp::transport::stdio())
        .await
        .context("start MCP service")?;
    service.waiting().await.context("MCP service")?;

    info!("file tools server stopped");
    Ok(())
}
