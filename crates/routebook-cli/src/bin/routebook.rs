use anyhow::Result;
use clap::Parser;
use routebook_cli::cli::{run_command, Cli};
use routebook_cli::RoutebookClient;
use routebook_core::{HistoryTracker, JsonFileHistoryStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let client = RoutebookClient::new(cli.url)?;
    let mut history = HistoryTracker::open_or_empty(JsonFileHistoryStore::new(cli.history_file));

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_command(&client, &mut history, cli.command, &mut out).await
}
