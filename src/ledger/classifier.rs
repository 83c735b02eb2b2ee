//! Outcome classification for a single bet.
//!
//! Two policies exist, one per monetary schema:
//! - stake/return: the outcome is the gain or loss relative to the stake, in percent.
//!   Break-even counts as a loss with 0%.
//! - risk/profit: the sign of the net result decides the status and the outcome is
//!   its absolute value. It is a magnitude, not a percentage of anything.

use crate::ledger::error::{LedgerError, LedgerResult};
use crate::types::{Status, Wager};

/// Derived outcome of a bet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outcome {
    pub outcome_pct: f64,
    pub status: Status,
}

/// Classify a wager with the policy matching its shape.
pub fn classify(wager: &Wager) -> LedgerResult<Outcome> {
    match *wager {
        Wager::StakeReturn { stake, return_amount } => classify_stake_return(stake, return_amount),
        Wager::RiskProfit { risk, profit_or_loss } => {
            ensure_finite("risk", risk)?;
            if risk < 0.0 {
                return Err(LedgerError::Validation("risk must not be negative".into()));
            }
            classify_profit_or_loss(profit_or_loss)
        }
    }
}

pub fn classify_stake_return(stake: f64, return_amount: f64) -> LedgerResult<Outcome> {
    ensure_finite("stake", stake)?;
    ensure_finite("return_amount", return_amount)?;
    if stake <= 0.0 {
        return Err(LedgerError::Validation(format!(
            "stake must be greater than zero, got {}",
            stake
        )));
    }
    if return_amount < 0.0 {
        return Err(LedgerError::Validation("return_amount must not be negative".into()));
    }

    if return_amount > stake {
        Ok(Outcome {
            outcome_pct: (return_amount - stake) / stake * 100.0,
            status: Status::Win,
        })
    } else {
        Ok(Outcome {
            outcome_pct: (stake - return_amount) / stake * 100.0,
            status: Status::Loss,
        })
    }
}

pub fn classify_profit_or_loss(profit_or_loss: f64) -> LedgerResult<Outcome> {
    ensure_finite("profit_or_loss", profit_or_loss)?;

    let status = if profit_or_loss > 0.0 { Status::Win } else { Status::Loss };
    Ok(Outcome {
        outcome_pct: profit_or_loss.abs(),
        status,
    })
}

fn ensure_finite(field: &str, value: f64) -> LedgerResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(LedgerError::Validation(format!("{} must be a finite number", field)))
    }
}
