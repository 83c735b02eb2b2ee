//! Storage abstraction layer for the bet ledger
//!
//! This module defines the formal contract for persisting methods and bets,
//! keeping classification and statistics independent of the database engine.

use async_trait::async_trait;

use crate::ledger::error::LedgerResult;
use crate::ledger::types::BetRecord;
use crate::types::{Bet, BetId, Method, MethodId};

/// Formal contract for the record store.
/// Defines operations that must be supported by any database engine.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Lists every method ordered by id.
    async fn list_methods(&self) -> LedgerResult<Vec<Method>>;

    async fn get_method(&self, id: MethodId) -> LedgerResult<Option<Method>>;

    /// Inserts a method. A name already in use yields `LedgerError::Conflict`.
    async fn insert_method(&self, name: &str) -> LedgerResult<Method>;

    /// Renames a method. Fails with `NotFound` for an unknown id and with
    /// `Conflict` when another method already has the name.
    async fn rename_method(&self, id: MethodId, name: &str) -> LedgerResult<Method>;

    /// Deletes a method that no bet references. Otherwise fails with
    /// `MethodInUse` and leaves everything untouched.
    async fn delete_method(&self, id: MethodId) -> LedgerResult<()>;

    async fn method_count(&self) -> LedgerResult<i64>;

    /// Lists every bet, newest first, with its method name resolved.
    async fn list_bets(&self) -> LedgerResult<Vec<Bet>>;

    async fn get_bet(&self, id: BetId) -> LedgerResult<Option<Bet>>;

    /// Saves a new bet and returns its id.
    async fn insert_bet(&self, record: &BetRecord) -> LedgerResult<BetId>;

    /// Overwrites every column of an existing bet.
    async fn update_bet(&self, id: BetId, record: &BetRecord) -> LedgerResult<()>;

    async fn delete_bet(&self, id: BetId) -> LedgerResult<()>;

    /// Health check for the storage backend.
    async fn health_check(&self) -> LedgerResult<bool>;
}
