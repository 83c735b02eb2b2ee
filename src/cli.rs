//! Command-line interface definitions.

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use crate::ledger::{BetBook, LedgerResult, StatisticsAggregator};
use crate::types::{BetId, BetPatch, MethodId, NewBet, NewBetFields};

/// bet-ledger - Record bets by method and summarize their outcomes.
#[derive(Parser, Debug)]
#[command(name = "bet-ledger")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Override the database URL (defaults to DATABASE_URL)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Override the connection pool size (defaults to BET_LEDGER_MAX_CONNECTIONS)
    #[arg(long, global = true)]
    pub max_connections: Option<u32>,

    /// Use JSON log format instead of pretty
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage betting methods
    #[command(subcommand)]
    Methods(MethodCommand),

    /// Manage bets
    #[command(subcommand)]
    Bets(BetCommand),

    /// Summarize the whole bet history
    Stats,
}

/// Subcommands for `bet-ledger methods`
#[derive(Subcommand, Debug)]
pub enum MethodCommand {
    /// List all methods
    List,
    /// Show one method
    Show { id: MethodId },
    /// Create a method
    Add { name: String },
    /// Rename a method
    Rename { id: MethodId, name: String },
    /// Delete a method no bet uses
    Remove { id: MethodId },
}

/// Subcommands for `bet-ledger bets`
#[derive(Subcommand, Debug)]
pub enum BetCommand {
    /// List all bets, newest first
    List,
    /// Show one bet
    Show { id: BetId },
    /// Record a bet
    Add(BetArgs),
    /// Change fields of a bet
    Edit(EditBetArgs),
    /// Delete a bet
    Remove { id: BetId },
}

/// Arguments for `bets add`.
#[derive(Parser, Debug, Default)]
pub struct BetArgs {
    /// Date and time of the event, e.g. 2024-05-01T16:00
    #[arg(long)]
    pub at: String,

    /// What was bet on, as a single field
    #[arg(long)]
    pub game: Option<String>,

    #[arg(long)]
    pub home_team: Option<String>,

    #[arg(long)]
    pub away_team: Option<String>,

    /// Method id
    #[arg(long)]
    pub method: MethodId,

    /// Amount staked (stake/return bets)
    #[arg(long)]
    pub stake: Option<f64>,

    /// Amount received back (stake/return bets)
    #[arg(long = "return")]
    pub return_amount: Option<f64>,

    /// Amount at risk (risk/profit bets)
    #[arg(long)]
    pub risk: Option<f64>,

    /// Net result, negative for a loss (risk/profit bets)
    #[arg(long, allow_negative_numbers = true)]
    pub profit_or_loss: Option<f64>,
}

impl BetArgs {
    pub fn into_new_bet(self) -> LedgerResult<NewBet> {
        NewBet::try_from(NewBetFields {
            placed_at: self.at,
            game: self.game,
            home_team: self.home_team,
            away_team: self.away_team,
            method_id: self.method,
            stake: self.stake,
            return_amount: self.return_amount,
            risk: self.risk,
            profit_or_loss: self.profit_or_loss,
        })
    }
}

/// Arguments for `bets edit`. Only the given flags change.
#[derive(Parser, Debug, Default)]
pub struct EditBetArgs {
    pub id: BetId,

    #[arg(long)]
    pub at: Option<String>,

    #[arg(long)]
    pub game: Option<String>,

    #[arg(long)]
    pub home_team: Option<String>,

    #[arg(long)]
    pub away_team: Option<String>,

    #[arg(long)]
    pub method: Option<MethodId>,

    #[arg(long)]
    pub stake: Option<f64>,

    #[arg(long = "return")]
    pub return_amount: Option<f64>,

    #[arg(long)]
    pub risk: Option<f64>,

    #[arg(long, allow_negative_numbers = true)]
    pub profit_or_loss: Option<f64>,
}

impl EditBetArgs {
    pub fn into_patch(self) -> (BetId, BetPatch) {
        let patch = BetPatch {
            placed_at: self.at,
            game: self.game,
            home_team: self.home_team,
            away_team: self.away_team,
            method_id: self.method,
            stake: self.stake,
            return_amount: self.return_amount,
            risk: self.risk,
            profit_or_loss: self.profit_or_loss,
        };
        (self.id, patch)
    }
}

/// Run a command and return what should be printed.
pub async fn execute(
    command: Commands,
    book: &BetBook,
    aggregator: &StatisticsAggregator,
) -> anyhow::Result<Value> {
    let output = match command {
        Commands::Methods(MethodCommand::List) => serde_json::to_value(book.list_methods().await?)?,
        Commands::Methods(MethodCommand::Show { id }) => serde_json::to_value(book.get_method(id).await?)?,
        Commands::Methods(MethodCommand::Add { name }) => {
            serde_json::to_value(book.create_method(&name).await?)?
        }
        Commands::Methods(MethodCommand::Rename { id, name }) => {
            serde_json::to_value(book.rename_method(id, &name).await?)?
        }
        Commands::Methods(MethodCommand::Remove { id }) => {
            book.delete_method(id).await?;
            json!({ "deleted_method": id })
        }
        Commands::Bets(BetCommand::List) => serde_json::to_value(book.list_bets().await?)?,
        Commands::Bets(BetCommand::Show { id }) => serde_json::to_value(book.get_bet(id).await?)?,
        Commands::Bets(BetCommand::Add(args)) => {
            serde_json::to_value(book.create_bet(args.into_new_bet()?).await?)?
        }
        Commands::Bets(BetCommand::Edit(args)) => {
            let (id, patch) = args.into_patch();
            serde_json::to_value(book.update_bet(id, patch).await?)?
        }
        Commands::Bets(BetCommand::Remove { id }) => {
            book.delete_bet(id).await?;
            json!({ "deleted_bet": id })
        }
        Commands::Stats => serde_json::to_value(aggregator.compute().await?)?,
    };
    Ok(output)
}
