//! Main entry point for the bet-ledger command-line tool

use anyhow::{Context, Result};
use bet_ledger::cli::{self, Cli};
use bet_ledger::ledger::{BetBook, LedgerStorage, SqliteLedger, StatisticsAggregator};
use bet_ledger::LedgerConfig;
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, error};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = LedgerConfig::from_env().context("Failed to load configuration")?;
    if let Some(url) = cli.database_url {
        config = config.with_database_url(url);
    }
    if let Some(max_connections) = cli.max_connections {
        anyhow::ensure!(max_connections > 0, "--max-connections must be at least 1");
        config = config.with_max_connections(max_connections);
    }
    if cli.json_logs {
        config.logging.format = "json".into();
    }
    config.logging.init();

    debug!("Opening ledger at {}", config.database_url);

    // One store handle for the whole process, shared by both components
    let storage: Arc<dyn LedgerStorage> = SqliteLedger::connect(&config)
        .await
        .context("Failed to open the ledger database")?;
    let book = BetBook::new(storage.clone());
    let aggregator = StatisticsAggregator::new(storage);

    let output = cli::execute(cli.command, &book, &aggregator).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
