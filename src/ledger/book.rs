//! BetBook - validated record keeping over a LedgerStorage
//!
//! Every write goes through here: inputs are validated, monetary inputs are
//! classified, and only then is the enriched record handed to the storage.

use std::sync::Arc;
use tracing::{debug, info};

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::storage::LedgerStorage;
use crate::ledger::time::parse_timestamp;
use crate::ledger::types::BetRecord;
use crate::types::{Bet, BetId, BetPatch, Method, MethodId, NewBet, Subject, Wager};

/// Entry point for method and bet operations
pub struct BetBook {
    storage: Arc<dyn LedgerStorage>,
}

impl BetBook {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    pub async fn list_methods(&self) -> LedgerResult<Vec<Method>> {
        self.storage.list_methods().await
    }

    pub async fn get_method(&self, id: MethodId) -> LedgerResult<Method> {
        self.storage
            .get_method(id)
            .await?
            .ok_or_else(|| LedgerError::method_not_found(id))
    }

    pub async fn create_method(&self, name: &str) -> LedgerResult<Method> {
        require_text("name", name)?;
        let method = self.storage.insert_method(name).await?;
        info!("Created method {} '{}'", method.id, method.name);
        Ok(method)
    }

    /// Renames a method. Keeping its current name is not a conflict.
    pub async fn rename_method(&self, id: MethodId, name: &str) -> LedgerResult<Method> {
        require_text("name", name)?;
        self.storage.rename_method(id, name).await
    }

    pub async fn delete_method(&self, id: MethodId) -> LedgerResult<()> {
        self.storage.delete_method(id).await?;
        info!("Deleted method {}", id);
        Ok(())
    }

    /// All bets, newest first.
    pub async fn list_bets(&self) -> LedgerResult<Vec<Bet>> {
        self.storage.list_bets().await
    }

    pub async fn get_bet(&self, id: BetId) -> LedgerResult<Bet> {
        self.storage
            .get_bet(id)
            .await?
            .ok_or_else(|| LedgerError::bet_not_found(id))
    }

    pub async fn create_bet(&self, new_bet: NewBet) -> LedgerResult<Bet> {
        let placed_at = parse_timestamp(&new_bet.placed_at)?;
        validate_subject(&new_bet.subject)?;
        self.ensure_method(new_bet.method_id).await?;

        let record = BetRecord::new(placed_at, new_bet.subject, new_bet.method_id, new_bet.wager)?;
        let id = self.storage.insert_bet(&record).await?;

        info!(
            "Recorded bet {} ({} {:.2})",
            id,
            record.outcome().status.as_str(),
            record.outcome().outcome_pct
        );
        self.get_bet(id).await
    }

    /// Applies the fields set in `patch`. The outcome is re-derived only when
    /// the patch carries a monetary input.
    pub async fn update_bet(&self, id: BetId, patch: BetPatch) -> LedgerResult<Bet> {
        let current = self.get_bet(id).await?;
        if patch.is_empty() {
            debug!("Empty patch for bet {}, nothing to update", id);
            return Ok(current);
        }

        let mut record = BetRecord::from_stored(&current);

        if let Some(raw) = &patch.placed_at {
            record.placed_at = parse_timestamp(raw)?;
        }
        if patch.touches_subject() {
            record.subject = patched_subject(id, &current.subject, &patch)?;
        }
        if let Some(method_id) = patch.method_id {
            self.ensure_method(method_id).await?;
            record.method_id = method_id;
        }
        if patch.touches_wager() {
            record.set_wager(patched_wager(id, &current.wager, &patch)?)?;
        }

        self.storage.update_bet(id, &record).await?;
        debug!("Updated bet {}", id);
        self.get_bet(id).await
    }

    pub async fn delete_bet(&self, id: BetId) -> LedgerResult<()> {
        self.storage.delete_bet(id).await?;
        info!("Deleted bet {}", id);
        Ok(())
    }

    async fn ensure_method(&self, id: MethodId) -> LedgerResult<()> {
        self.get_method(id).await.map(|_| ())
    }
}

fn require_text(field: &str, value: &str) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn validate_subject(subject: &Subject) -> LedgerResult<()> {
    match subject {
        Subject::Game { game } => require_text("game", game),
        Subject::Teams { home_team, away_team } => {
            require_text("home_team", home_team)?;
            require_text("away_team", away_team)
        }
    }
}

fn schema_mismatch(id: BetId, stored: &str, field: &str) -> LedgerError {
    LedgerError::Validation(format!(
        "bet {} is recorded as {}; '{}' does not apply",
        id, stored, field
    ))
}

fn patched_subject(id: BetId, current: &Subject, patch: &BetPatch) -> LedgerResult<Subject> {
    let subject = match current {
        Subject::Game { game } => {
            if patch.home_team.is_some() || patch.away_team.is_some() {
                return Err(schema_mismatch(id, "a single game", "home_team/away_team"));
            }
            Subject::Game {
                game: patch.game.clone().unwrap_or_else(|| game.clone()),
            }
        }
        Subject::Teams { home_team, away_team } => {
            if patch.game.is_some() {
                return Err(schema_mismatch(id, "home and away teams", "game"));
            }
            Subject::Teams {
                home_team: patch.home_team.clone().unwrap_or_else(|| home_team.clone()),
                away_team: patch.away_team.clone().unwrap_or_else(|| away_team.clone()),
            }
        }
    };
    validate_subject(&subject)?;
    Ok(subject)
}

fn patched_wager(id: BetId, current: &Wager, patch: &BetPatch) -> LedgerResult<Wager> {
    match *current {
        Wager::StakeReturn { stake, return_amount } => {
            if patch.risk.is_some() || patch.profit_or_loss.is_some() {
                return Err(schema_mismatch(id, "stake/return", "risk/profit_or_loss"));
            }
            Ok(Wager::StakeReturn {
                stake: patch.stake.unwrap_or(stake),
                return_amount: patch.return_amount.unwrap_or(return_amount),
            })
        }
        Wager::RiskProfit { risk, profit_or_loss } => {
            if patch.stake.is_some() || patch.return_amount.is_some() {
                return Err(schema_mismatch(id, "risk/profit", "stake/return_amount"));
            }
            Ok(Wager::RiskProfit {
                risk: patch.risk.unwrap_or(risk),
                profit_or_loss: patch.profit_or_loss.unwrap_or(profit_or_loss),
            })
        }
    }
}
