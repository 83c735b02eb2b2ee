//! Tests for the file-backed SQLite ledger

use anyhow::Result;
use bet_ledger::ledger::{BetBook, LedgerStorage, SqliteLedger};
use bet_ledger::{LedgerConfig, NewBet, Status, Subject, Wager};
use std::sync::Arc;

fn file_config(dir: &tempfile::TempDir) -> LedgerConfig {
    let path = dir.path().join("bets.db");
    LedgerConfig::default().with_database_url(format!("sqlite:{}?mode=rwc", path.display()))
}

#[tokio::test]
async fn test_records_survive_reopening() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = file_config(&dir);

    let bet_id = {
        let storage: Arc<dyn LedgerStorage> = SqliteLedger::connect(&config).await?;
        let book = BetBook::new(storage);

        // Default seed methods are present on first start
        let methods = book.list_methods().await?;
        let names: Vec<&str> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["lay 0x1", "lay 1x0"]);

        let bet = book
            .create_bet(NewBet {
                placed_at: "2024-05-01T16:00".into(),
                subject: Subject::Game {
                    game: "Cruzeiro x Atlético".into(),
                },
                method_id: methods[1].id,
                wager: Wager::RiskProfit {
                    risk: 20.0,
                    profit_or_loss: -20.0,
                },
            })
            .await?;
        bet.id
    };

    let storage: Arc<dyn LedgerStorage> = SqliteLedger::connect(&config).await?;
    let book = BetBook::new(storage.clone());

    // Seeding does not run again on a populated table
    assert_eq!(storage.method_count().await?, 2);

    let bet = book.get_bet(bet_id).await?;
    assert_eq!(bet.method_name, "lay 1x0");
    assert_eq!(bet.status, Status::Loss);
    assert_eq!(bet.outcome_pct, 20.0);
    assert!(storage.health_check().await?);

    Ok(())
}

#[tokio::test]
async fn test_seeding_respects_configured_names() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = file_config(&dir).with_seed_methods(vec!["back home".into()]);

    let storage = SqliteLedger::connect(&config).await?;
    let methods = storage.list_methods().await?;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].name, "back home");

    Ok(())
}
