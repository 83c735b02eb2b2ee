//! bet-ledger - record keeping for betting events
//!
//! This crate stores bets grouped by betting method, derives each bet's outcome
//! from its monetary inputs and summarizes the history (loss probability, profit
//! and loss extremes and averages).

pub mod types;
pub mod config;
pub mod ledger;
pub mod cli;

// Re-export main types for convenience
pub use config::LedgerConfig;
pub use types::{Bet, BetPatch, Method, NewBet, NewBetFields, Status, Subject, Wager};
