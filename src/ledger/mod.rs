//! Ledger module - record store, outcome classification and statistics
//!
//! Bets flow through the BetBook, which classifies their monetary inputs before
//! handing them to a LedgerStorage; the StatisticsAggregator reads the same
//! storage to summarize the history.

pub mod error;
pub mod time;
pub mod classifier;
pub mod types;
pub mod storage;
pub mod sqlite_ledger;
pub mod book;
pub mod statistics;

// Re-export main types
pub use error::{Entity, LedgerError, LedgerResult};
pub use classifier::{classify, Outcome};
pub use types::BetRecord;
pub use storage::LedgerStorage;

// Re-export key components
pub use sqlite_ledger::SqliteLedger;
pub use book::BetBook;
pub use statistics::{summarize, LedgerStatistics, PartitionStats, StatisticsAggregator};
