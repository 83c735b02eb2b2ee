//! SqliteLedger module - SQLite implementation of the ledger storage
//!
//! This module implements the LedgerStorage trait using SQLite as the backend.
//! Method names are unique at the storage level and bets reference methods through
//! an indexed foreign key; the delete guard and name lookups are explicit queries.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{sqlite::SqlitePoolOptions, FromRow, Pool, Sqlite};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::LedgerConfig;
use crate::ledger::error::{LedgerError, LedgerResult};
use crate::ledger::storage::LedgerStorage;
use crate::ledger::time::format_display;
use crate::ledger::types::BetRecord;
use crate::types::{Bet, BetId, Method, MethodId, Status, Subject, Wager};

const SELECT_BETS: &str = r#"
    SELECT
        b.id, b.placed_at, b.subject_kind, b.game, b.home_team, b.away_team,
        b.method_id, COALESCE(m.name, '') AS method_name,
        b.wager_kind, b.stake, b.return_amount, b.risk, b.profit_or_loss,
        b.outcome_pct, b.status
    FROM bets b
    LEFT JOIN methods m ON m.id = b.method_id
"#;

/// Helper type for deserializing bets joined with their method name
#[derive(FromRow)]
struct BetRow {
    id: i64,
    placed_at: NaiveDateTime,
    subject_kind: String,
    game: Option<String>,
    home_team: Option<String>,
    away_team: Option<String>,
    method_id: i64,
    method_name: String,
    wager_kind: String,
    stake: Option<f64>,
    return_amount: Option<f64>,
    risk: Option<f64>,
    profit_or_loss: Option<f64>,
    outcome_pct: f64,
    status: String,
}

impl BetRow {
    fn into_bet(self) -> LedgerResult<Bet> {
        let subject = match (self.subject_kind.as_str(), self.game, self.home_team, self.away_team) {
            ("game", Some(game), _, _) => Subject::Game { game },
            ("teams", _, Some(home_team), Some(away_team)) => Subject::Teams { home_team, away_team },
            (kind, ..) => return Err(corrupt(self.id, format!("subject kind '{}'", kind))),
        };

        let wager = match (
            self.wager_kind.as_str(),
            self.stake,
            self.return_amount,
            self.risk,
            self.profit_or_loss,
        ) {
            ("stake_return", Some(stake), Some(return_amount), _, _) => {
                Wager::StakeReturn { stake, return_amount }
            }
            ("risk_profit", _, _, Some(risk), Some(profit_or_loss)) => {
                Wager::RiskProfit { risk, profit_or_loss }
            }
            (kind, ..) => return Err(corrupt(self.id, format!("wager kind '{}'", kind))),
        };

        let status = Status::parse(&self.status)
            .ok_or_else(|| corrupt(self.id, format!("status '{}'", self.status)))?;

        Ok(Bet {
            id: self.id,
            placed_at: self.placed_at,
            placed_at_display: format_display(&self.placed_at),
            subject,
            method_id: self.method_id,
            method_name: self.method_name,
            wager,
            outcome_pct: self.outcome_pct,
            status,
        })
    }
}

fn corrupt(id: i64, what: String) -> LedgerError {
    LedgerError::Storage(sqlx::Error::Decode(
        format!("bet {} has an unreadable {}", id, what).into(),
    ))
}

/// Column values of a bet record in table order.
struct BetColumns<'a> {
    game: Option<&'a str>,
    home_team: Option<&'a str>,
    away_team: Option<&'a str>,
    stake: Option<f64>,
    return_amount: Option<f64>,
    risk: Option<f64>,
    profit_or_loss: Option<f64>,
}

impl<'a> BetColumns<'a> {
    fn of(record: &'a BetRecord) -> Self {
        let (game, home_team, away_team) = match &record.subject {
            Subject::Game { game } => (Some(game.as_str()), None, None),
            Subject::Teams { home_team, away_team } => {
                (None, Some(home_team.as_str()), Some(away_team.as_str()))
            }
        };
        let (stake, return_amount, risk, profit_or_loss) = match *record.wager() {
            Wager::StakeReturn { stake, return_amount } => (Some(stake), Some(return_amount), None, None),
            Wager::RiskProfit { risk, profit_or_loss } => (None, None, Some(risk), Some(profit_or_loss)),
        };
        Self {
            game,
            home_team,
            away_team,
            stake,
            return_amount,
            risk,
            profit_or_loss,
        }
    }
}

/// Translate constraint violations on a method write into ledger errors.
fn method_write_error(err: sqlx::Error, name: &str) -> LedgerError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => LedgerError::Conflict {
            name: name.to_string(),
        },
        _ => LedgerError::Storage(err),
    }
}

/// Translate a foreign key violation on a bet write into a missing method.
fn bet_write_error(err: sqlx::Error, method_id: MethodId) -> LedgerError {
    match &err {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            LedgerError::method_not_found(method_id)
        }
        _ => LedgerError::Storage(err),
    }
}

/// SqliteLedger provides persistent storage for methods and bets using SQLite
pub struct SqliteLedger {
    pool: Pool<Sqlite>,
}

impl SqliteLedger {
    /// Connects to the configured database, creates the schema and seeds the
    /// default methods when the ledger is empty.
    pub async fn connect(config: &LedgerConfig) -> LedgerResult<Arc<Self>> {
        let mut options = SqlitePoolOptions::new();
        if config.is_in_memory() {
            // every connection to `:memory:` opens a separate database
            options = options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>);
        } else {
            options = options.max_connections(config.max_connections);
        }

        let pool = options.connect(&config.database_url).await?;

        Self::create_schema(&pool).await?;

        let ledger = Self { pool };
        ledger.seed_methods(&config.seed_methods).await?;

        info!("SqliteLedger initialized and connected to {}", config.database_url);

        Ok(Arc::new(ledger))
    }

    /// Create the database schema
    async fn create_schema(pool: &Pool<Sqlite>) -> LedgerResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS methods (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS bets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                placed_at TEXT NOT NULL,
                subject_kind TEXT NOT NULL,
                game TEXT,
                home_team TEXT,
                away_team TEXT,
                method_id INTEGER NOT NULL,
                wager_kind TEXT NOT NULL,
                stake REAL,
                return_amount REAL,
                risk REAL,
                profit_or_loss REAL,
                outcome_pct REAL NOT NULL,
                status TEXT NOT NULL,
                FOREIGN KEY (method_id) REFERENCES methods (id)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bets_method_id ON bets (method_id);")
            .execute(pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_bets_placed_at ON bets (placed_at);")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Inserts the given methods if, and only if, no method exists yet.
    pub async fn seed_methods(&self, names: &[String]) -> LedgerResult<()> {
        if names.is_empty() || self.method_count().await? > 0 {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for name in names {
            sqlx::query("INSERT OR IGNORE INTO methods (name) VALUES (?)")
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!("Seeded {} default methods", names.len());
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for SqliteLedger {
    async fn list_methods(&self) -> LedgerResult<Vec<Method>> {
        let methods = sqlx::query_as::<_, Method>("SELECT id, name FROM methods ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(methods)
    }

    async fn get_method(&self, id: MethodId) -> LedgerResult<Option<Method>> {
        let method = sqlx::query_as::<_, Method>("SELECT id, name FROM methods WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(method)
    }

    async fn insert_method(&self, name: &str) -> LedgerResult<Method> {
        debug!("Inserting method '{}'", name);

        let id = sqlx::query("INSERT INTO methods (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| method_write_error(e, name))?
            .last_insert_rowid();

        Ok(Method {
            id,
            name: name.to_string(),
        })
    }

    async fn rename_method(&self, id: MethodId, name: &str) -> LedgerResult<Method> {
        debug!("Renaming method {} to '{}'", id, name);

        let result = sqlx::query("UPDATE methods SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| method_write_error(e, name))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::method_not_found(id));
        }

        Ok(Method {
            id,
            name: name.to_string(),
        })
    }

    async fn delete_method(&self, id: MethodId) -> LedgerResult<()> {
        debug!("Deleting method {}", id);

        let mut tx = self.pool.begin().await?;

        let exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM methods WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(LedgerError::method_not_found(id));
        }

        let (bet_count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bets WHERE method_id = ?")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if bet_count > 0 {
            warn!("Refusing to delete method {}: {} bets reference it", id, bet_count);
            return Err(LedgerError::MethodInUse {
                method_id: id,
                bet_count,
            });
        }

        sqlx::query("DELETE FROM methods WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn method_count(&self) -> LedgerResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM methods")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    async fn list_bets(&self) -> LedgerResult<Vec<Bet>> {
        let rows: Vec<BetRow> = sqlx::query_as(&format!(
            "{} ORDER BY b.placed_at DESC, b.id DESC",
            SELECT_BETS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BetRow::into_bet).collect()
    }

    async fn get_bet(&self, id: BetId) -> LedgerResult<Option<Bet>> {
        let row: Option<BetRow> = sqlx::query_as(&format!("{} WHERE b.id = ?", SELECT_BETS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(BetRow::into_bet).transpose()
    }

    async fn insert_bet(&self, record: &BetRecord) -> LedgerResult<BetId> {
        debug!("Inserting bet for method {} at {}", record.method_id, record.placed_at);

        let columns = BetColumns::of(record);
        let outcome = record.outcome();

        let result = sqlx::query(
            r#"
            INSERT INTO bets (
                placed_at, subject_kind, game, home_team, away_team, method_id,
                wager_kind, stake, return_amount, risk, profit_or_loss, outcome_pct, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?);
            "#,
        )
        .bind(record.placed_at)
        .bind(record.subject.kind())
        .bind(columns.game)
        .bind(columns.home_team)
        .bind(columns.away_team)
        .bind(record.method_id)
        .bind(record.wager().kind())
        .bind(columns.stake)
        .bind(columns.return_amount)
        .bind(columns.risk)
        .bind(columns.profit_or_loss)
        .bind(outcome.outcome_pct)
        .bind(outcome.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| bet_write_error(e, record.method_id))?;

        Ok(result.last_insert_rowid())
    }

    async fn update_bet(&self, id: BetId, record: &BetRecord) -> LedgerResult<()> {
        debug!("Updating bet {}", id);

        let columns = BetColumns::of(record);
        let outcome = record.outcome();

        let result = sqlx::query(
            r#"
            UPDATE bets
            SET
                placed_at = ?, subject_kind = ?, game = ?, home_team = ?, away_team = ?,
                method_id = ?, wager_kind = ?, stake = ?, return_amount = ?, risk = ?,
                profit_or_loss = ?, outcome_pct = ?, status = ?
            WHERE id = ?;
            "#,
        )
        .bind(record.placed_at)
        .bind(record.subject.kind())
        .bind(columns.game)
        .bind(columns.home_team)
        .bind(columns.away_team)
        .bind(record.method_id)
        .bind(record.wager().kind())
        .bind(columns.stake)
        .bind(columns.return_amount)
        .bind(columns.risk)
        .bind(columns.profit_or_loss)
        .bind(outcome.outcome_pct)
        .bind(outcome.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| bet_write_error(e, record.method_id))?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::bet_not_found(id));
        }
        Ok(())
    }

    async fn delete_bet(&self, id: BetId) -> LedgerResult<()> {
        debug!("Deleting bet {}", id);

        let result = sqlx::query("DELETE FROM bets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::bet_not_found(id));
        }
        Ok(())
    }

    async fn health_check(&self) -> LedgerResult<bool> {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(_) => Ok(false),
        }
    }
}
