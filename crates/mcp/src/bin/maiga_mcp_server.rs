use anyhow::{Context, Result};
use maiga_core::config::AppConfig;
use mcp_adapter::MaigaServer;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let config = AppConfig::load_from_env()?;
    MaigaServer::from_config(&config)?.serve_stdio().await
}

// stdout carries the protocol, so logs go to stderr and a rolling file.
fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("maiga-mcp-server")
        .build("logs")
        .context("failed to create rolling file appender")?;

    let writer = std::io::stderr
        .with_max_level(tracing::Level::DEBUG)
        .and(file_appender);

    let subscriber = fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(writer)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(())
}
