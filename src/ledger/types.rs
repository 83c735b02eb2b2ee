//! Write-side record types for the ledger storage.

use chrono::NaiveDateTime;

use crate::ledger::classifier::{classify, Outcome};
use crate::ledger::error::LedgerResult;
use crate::types::{Bet, MethodId, Subject, Wager};

/// A bet ready to be persisted. The outcome can only be produced by
/// classifying the wager, so it always matches the monetary inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct BetRecord {
    pub placed_at: NaiveDateTime,
    pub subject: Subject,
    pub method_id: MethodId,
    wager: Wager,
    outcome: Outcome,
}

impl BetRecord {
    pub fn new(
        placed_at: NaiveDateTime,
        subject: Subject,
        method_id: MethodId,
        wager: Wager,
    ) -> LedgerResult<Self> {
        let outcome = classify(&wager)?;
        Ok(Self {
            placed_at,
            subject,
            method_id,
            wager,
            outcome,
        })
    }

    /// Rebuild the write form of a stored bet, keeping its stored outcome.
    pub fn from_stored(bet: &Bet) -> Self {
        Self {
            placed_at: bet.placed_at,
            subject: bet.subject.clone(),
            method_id: bet.method_id,
            wager: bet.wager,
            outcome: Outcome {
                outcome_pct: bet.outcome_pct,
                status: bet.status,
            },
        }
    }

    /// Replace the monetary inputs and re-derive the outcome.
    pub fn set_wager(&mut self, wager: Wager) -> LedgerResult<()> {
        self.outcome = classify(&wager)?;
        self.wager = wager;
        Ok(())
    }

    pub fn wager(&self) -> &Wager {
        &self.wager
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }
}
