//! Core types and data structures for the bet ledger.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize, Serializer};

use crate::ledger::error::LedgerError;
use crate::ledger::time::format_wire;

/// Database identifier of a betting method
pub type MethodId = i64;

/// Database identifier of a bet
pub type BetId = i64;

/// A named betting strategy used to group bets (e.g. "lay 0x1").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Method {
    pub id: MethodId,
    pub name: String,
}

/// Binary classification of a bet's outcome.
///
/// Serialized with the ledger's traditional colour labels; `win`/`loss`
/// are accepted on input as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "green", alias = "win")]
    Win,
    #[serde(rename = "red", alias = "loss")]
    Loss,
}

impl Status {
    /// Label used on the wire and in the `bets.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Win => "green",
            Status::Loss => "red",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "green" | "win" => Some(Status::Win),
            "red" | "loss" => Some(Status::Loss),
            _ => None,
        }
    }
}

/// What a bet was placed on. The two shapes are alternative schemas and
/// never coexist on one record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Subject {
    /// Single free-text field, e.g. "Flamengo x Palmeiras"
    Game { game: String },
    /// Separate team names
    Teams { home_team: String, away_team: String },
}

impl Subject {
    pub fn kind(&self) -> &'static str {
        match self {
            Subject::Game { .. } => "game",
            Subject::Teams { .. } => "teams",
        }
    }
}

/// Monetary inputs of a bet. Which variant a bet carries decides the
/// classification policy applied to it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Wager {
    /// Amount risked and amount received back
    StakeReturn { stake: f64, return_amount: f64 },
    /// Amount at risk and the signed net result (positive = gain)
    RiskProfit { risk: f64, profit_or_loss: f64 },
}

impl Wager {
    pub fn kind(&self) -> &'static str {
        match self {
            Wager::StakeReturn { .. } => "stake_return",
            Wager::RiskProfit { .. } => "risk_profit",
        }
    }
}

/// A stored bet as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bet {
    pub id: BetId,
    #[serde(serialize_with = "serialize_wire_timestamp")]
    pub placed_at: NaiveDateTime,
    /// `dd/mm/YYYY HH:MM` rendering of `placed_at`
    pub placed_at_display: String,
    #[serde(flatten)]
    pub subject: Subject,
    pub method_id: MethodId,
    /// Name of the referenced method, empty when the method row is missing
    pub method_name: String,
    #[serde(flatten)]
    pub wager: Wager,
    /// Magnitude of the outcome. A true percentage of the stake for
    /// stake/return bets, the absolute profit or loss for risk/profit bets.
    pub outcome_pct: f64,
    pub status: Status,
}

fn serialize_wire_timestamp<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_wire(value))
}

/// Input for creating a bet. Outcome fields are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NewBetFields")]
pub struct NewBet {
    /// ISO-8601 local date-time, e.g. `2024-05-01T16:00`
    pub placed_at: String,
    pub subject: Subject,
    pub method_id: MethodId,
    pub wager: Wager,
}

/// Flat form of a new bet as it arrives from callers, before the subject
/// and wager shapes are chosen.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewBetFields {
    pub placed_at: String,
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub home_team: Option<String>,
    #[serde(default)]
    pub away_team: Option<String>,
    pub method_id: MethodId,
    #[serde(default)]
    pub stake: Option<f64>,
    #[serde(default)]
    pub return_amount: Option<f64>,
    #[serde(default)]
    pub risk: Option<f64>,
    #[serde(default)]
    pub profit_or_loss: Option<f64>,
}

impl TryFrom<NewBetFields> for NewBet {
    type Error = LedgerError;

    fn try_from(fields: NewBetFields) -> Result<Self, Self::Error> {
        let subject = match (fields.game, fields.home_team, fields.away_team) {
            (Some(game), None, None) => Subject::Game { game },
            (None, Some(home_team), Some(away_team)) => Subject::Teams { home_team, away_team },
            _ => {
                return Err(LedgerError::Validation(
                    "provide either game or both home_team and away_team".into(),
                ))
            }
        };

        let wager = match (fields.stake, fields.return_amount, fields.risk, fields.profit_or_loss) {
            (Some(stake), Some(return_amount), None, None) => Wager::StakeReturn { stake, return_amount },
            (None, None, Some(risk), Some(profit_or_loss)) => Wager::RiskProfit { risk, profit_or_loss },
            _ => {
                return Err(LedgerError::Validation(
                    "provide either stake and return_amount or risk and profit_or_loss".into(),
                ))
            }
        };

        Ok(NewBet {
            placed_at: fields.placed_at,
            subject,
            method_id: fields.method_id,
            wager,
        })
    }
}

/// Partial update of a bet. Only fields that are set are applied.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BetPatch {
    pub placed_at: Option<String>,
    pub game: Option<String>,
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub method_id: Option<MethodId>,
    pub stake: Option<f64>,
    pub return_amount: Option<f64>,
    pub risk: Option<f64>,
    pub profit_or_loss: Option<f64>,
}

impl BetPatch {
    pub fn is_empty(&self) -> bool {
        *self == BetPatch::default()
    }

    /// Whether any monetary input is part of the patch.
    pub fn touches_wager(&self) -> bool {
        self.stake.is_some()
            || self.return_amount.is_some()
            || self.risk.is_some()
            || self.profit_or_loss.is_some()
    }

    pub fn touches_subject(&self) -> bool {
        self.game.is_some() || self.home_team.is_some() || self.away_team.is_some()
    }
}
