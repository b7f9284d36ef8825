use clap::Parser;
use keytar_stub::{InstallOutcome, NodeProbe, StubInstaller};
use maiga_core::config::AppConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Stub out keytar when libsecret is missing. Always exits successfully.
#[derive(Parser, Debug)]
#[command(name = "keytar-stub", version)]
struct Cli {
    /// Project root containing node_modules (defaults to KEYTAR_STUB_ROOT, then ".")
    #[arg(long)]
    root: Option<PathBuf>,
    /// Node.js executable used to probe the module
    #[arg(long, default_value = "node")]
    node: PathBuf,
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let root = cli.root.unwrap_or_else(default_root);

    let outcome = StubInstaller::with_probe(root, NodeProbe::with_binary(cli.node)).run();
    if let InstallOutcome::Failed { reason } = &outcome {
        eprintln!("keytar stub not installed: {reason}");
    }
}

fn default_root() -> PathBuf {
    AppConfig::load_from_env()
        .ok()
        .and_then(|config| config.keytar_stub_root)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_env_filter(filter).finish(),
    )
    .is_err()
    {
        // tracing already initialised; ignore.
    }
}
