use anyhow::Result;
use clap::{Parser, Subcommand};
use maiga_core::config::AppConfig;
use maiga_core::ToolName;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "maiga-cli", about = "Maiga partner API tools", version)]
struct Cli {
    /// Partner API token (overrides MAIGA_API_TOKEN)
    #[arg(long, global = true)]
    api_token: Option<String>,
    /// Partner API base URL (overrides MAIGA_API_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Log request and response bodies
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the available tools and their endpoints
    Tools,
    /// Invoke a single tool and print its text result
    #[cfg(feature = "mcp")]
    Call {
        /// Tool name, e.g. analyse_token or maiga_analyse_token
        tool: String,
        /// Arguments as a JSON object
        #[arg(long, short = 'a', default_value = "null")]
        args: String,
    },
    /// Serve the tools over MCP stdio
    #[cfg(feature = "mcp")]
    Serve,
    /// Replace keytar with a no-op stub if it cannot load
    #[cfg(feature = "keytar")]
    KeytarStub {
        /// Project root containing node_modules
        #[arg(long)]
        root: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let mut config = AppConfig::load_from_env()?;
    if let Some(token) = cli.api_token {
        config = config.with_api_token(token);
    }
    if let Some(base_url) = cli.base_url {
        config = config.with_base_url(base_url);
    }
    config.debug |= cli.debug;

    match cli.command {
        Commands::Tools => print_tools(),
        #[cfg(feature = "mcp")]
        Commands::Call { tool, args } => handle_call(&config, &tool, &args).await?,
        #[cfg(feature = "mcp")]
        Commands::Serve => mcp_adapter::MaigaServer::from_config(&config)?
            .serve_stdio()
            .await?,
        #[cfg(feature = "keytar")]
        Commands::KeytarStub { root } => handle_keytar_stub(&config, root),
    }

    Ok(())
}

// Logs go to stderr so `serve` keeps stdout for the protocol.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )
    .is_err()
    {
        // tracing already initialised; ignore.
    }
    Ok(())
}

fn print_tools() {
    for tool in ToolName::ALL {
        println!("{:<16} POST {:<24} {}", tool.as_str(), tool.endpoint(), tool.title());
        println!("{:<16} {}", "", tool.description());
    }
}

#[cfg(feature = "mcp")]
async fn handle_call(config: &AppConfig, tool: &str, args: &str) -> Result<()> {
    use anyhow::Context;
    use maiga::MaigaRestClient;
    use mcp_adapter::{invoke_tool_text, ToolRequest};

    let tool: ToolName = tool.parse()?;
    let arguments = serde_json::from_str(args).context("--args is not valid JSON")?;
    let request = ToolRequest::from_arguments(tool, arguments)?;

    let client = MaigaRestClient::from_config(config)?;
    println!("{}", invoke_tool_text(&client, &request).await);

    Ok(())
}

#[cfg(feature = "keytar")]
fn handle_keytar_stub(config: &AppConfig, root: Option<PathBuf>) {
    use keytar_stub::{ensure_usable_credential_module, InstallOutcome};

    let root = root
        .or_else(|| config.keytar_stub_root.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    match ensure_usable_credential_module(root) {
        InstallOutcome::Failed { reason } => eprintln!("keytar stub not installed: {reason}"),
        outcome => println!("{outcome:?}"),
    }
}
