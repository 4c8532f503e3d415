// Transaction Coordinator
//
// Serialises every mutation of a hotel's inventory behind a per-hotel lock and
// wraps the validate-then-write sequence in one ledger transaction.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::error::InventoryError;
use crate::hotels::Hotel;
use crate::inventory::ledger::{InventoryLedger, LedgerTransaction};

/// Lifecycle of one mutation request
///
/// `Started → Validated → Committed`, or `Started | Validated → Aborted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeState {
    Started,
    Validated,
    Committed,
    Aborted,
}

impl std::fmt::Display for ScopeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScopeState::Started => write!(f, "started"),
            ScopeState::Validated => write!(f, "validated"),
            ScopeState::Committed => write!(f, "committed"),
            ScopeState::Aborted => write!(f, "aborted"),
        }
    }
}

/// In-process lock table keyed by hotel id
#[derive(Debug, Clone, Default)]
pub struct HotelLocks {
    table: Arc<Mutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl HotelLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to a hotel, giving up after `timeout`
    pub async fn acquire(
        &self,
        hotel_id: i64,
        timeout: Duration,
    ) -> Result<OwnedMutexGuard<()>, InventoryError> {
        let lock = {
            let mut table = self.table.lock().await;
            table.entry(hotel_id).or_default().clone()
        };

        tokio::time::timeout(timeout, lock.lock_owned())
            .await
            .map_err(|_| InventoryError::LockTimeout { hotel_id })
    }

    /// Drop the lock entry of a hotel that no longer exists
    ///
    /// Waiters still holding the old mutex will find the hotel gone once they get it.
    pub async fn forget(&self, hotel_id: i64) {
        self.table.lock().await.remove(&hotel_id);
    }

    /// Drop a hotel's entry once no scope holds or awaits its mutex
    pub async fn release_idle(&self, hotel_id: i64) {
        let mut table = self.table.lock().await;
        if table
            .get(&hotel_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&hotel_id);
        }
    }

    pub async fn tracked_hotels(&self) -> usize {
        self.table.lock().await.len()
    }
}

/// One open, hotel-scoped transaction
///
/// Owns the ledger transaction and the hotel lock. Dropping the scope before
/// `commit` (early return, cancelled request) rolls the transaction back and
/// releases the lock.
pub struct TransactionScope {
    id: Uuid,
    hotel: Hotel,
    state: ScopeState,
    tx: Option<Box<dyn LedgerTransaction>>,
    _guard: OwnedMutexGuard<()>,
}

impl TransactionScope {
    pub fn hotel_id(&self) -> i64 {
        self.hotel.id
    }

    pub fn capacity(&self) -> i32 {
        self.hotel.total_room_capacity
    }

    pub fn state(&self) -> ScopeState {
        self.state
    }

    /// The ledger transaction all reads and writes of this scope go through
    pub fn ledger(
        &mut self,
    ) -> Result<&mut (dyn LedgerTransaction + 'static), InventoryError> {
        match self.tx.as_deref_mut() {
            Some(tx) => Ok(tx),
            None => Err(InventoryError::StorageFailure(format!(
                "transaction {} is already closed",
                self.id
            ))),
        }
    }

    /// Record that the validator accepted the mutation
    pub fn mark_validated(&mut self) {
        if self.state == ScopeState::Started {
            tracing::debug!(scope = %self.id, hotel_id = self.hotel.id, "transaction validated");
            self.state = ScopeState::Validated;
        }
    }

    /// Commit the transaction; only a validated scope may commit
    pub async fn commit(mut self) -> Result<(), InventoryError> {
        if self.state != ScopeState::Validated {
            let message = format!(
                "transaction {} cannot commit from state {}",
                self.id, self.state
            );
            self.abort().await;
            return Err(InventoryError::StorageFailure(message));
        }

        let tx = self.ledger_handle()?;
        match tx.commit().await {
            Ok(()) => {
                self.state = ScopeState::Committed;
                tracing::debug!(scope = %self.id, hotel_id = self.hotel.id, "transaction committed");
                Ok(())
            }
            Err(e) => {
                self.state = ScopeState::Aborted;
                tracing::error!(scope = %self.id, hotel_id = self.hotel.id, "commit failed: {}", e);
                Err(e)
            }
        }
    }

    /// Roll the transaction back
    pub async fn abort(mut self) {
        self.state = ScopeState::Aborted;
        if let Some(tx) = self.tx.take() {
            if let Err(e) = tx.rollback().await {
                // The connection discards the transaction regardless.
                tracing::warn!(scope = %self.id, "rollback failed: {}", e);
            }
        }
        tracing::debug!(scope = %self.id, hotel_id = self.hotel.id, "transaction aborted");
    }

    /// Commit on success, abort on failure, and hand back the outcome
    pub async fn finish<T>(self, outcome: Result<T, InventoryError>) -> Result<T, InventoryError> {
        match outcome {
            Ok(value) => {
                self.commit().await?;
                Ok(value)
            }
            Err(e) => {
                self.abort().await;
                Err(e)
            }
        }
    }

    fn ledger_handle(&mut self) -> Result<Box<dyn LedgerTransaction>, InventoryError> {
        let id = self.id;
        self.tx.take().ok_or_else(|| {
            InventoryError::StorageFailure(format!("transaction {} is already closed", id))
        })
    }
}

impl Drop for TransactionScope {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!(
                scope = %self.id,
                hotel_id = self.hotel.id,
                state = %self.state,
                "transaction dropped before completion; rolling back"
            );
        }
    }
}

/// Hands out hotel-scoped transactions
#[derive(Clone)]
pub struct TransactionCoordinator {
    ledger: Arc<dyn InventoryLedger>,
    locks: HotelLocks,
    lock_timeout: Duration,
}

impl TransactionCoordinator {
    pub fn new(ledger: Arc<dyn InventoryLedger>, lock_timeout: Duration) -> Self {
        Self {
            ledger,
            locks: HotelLocks::new(),
            lock_timeout,
        }
    }

    pub fn locks(&self) -> &HotelLocks {
        &self.locks
    }

    /// Open a transaction with exclusive access to one hotel
    ///
    /// Fails with `LockTimeout` if the hotel stays busy past the configured
    /// timeout, and with `HotelNotFound` if the hotel does not exist (or was
    /// deleted while we waited).
    pub async fn begin(&self, hotel_id: i64) -> Result<TransactionScope, InventoryError> {
        let guard = self.locks.acquire(hotel_id, self.lock_timeout).await?;

        let (tx, hotel) = match self.open(hotel_id).await {
            Ok(opened) => opened,
            Err(e) => {
                // Unknown hotel ids must not pile up in the lock table.
                drop(guard);
                self.locks.release_idle(hotel_id).await;
                return Err(e);
            }
        };

        let scope = TransactionScope {
            id: Uuid::new_v4(),
            hotel,
            state: ScopeState::Started,
            tx: Some(tx),
            _guard: guard,
        };
        tracing::debug!(scope = %scope.id, hotel_id, "transaction started");
        Ok(scope)
    }

    async fn open(
        &self,
        hotel_id: i64,
    ) -> Result<(Box<dyn LedgerTransaction>, Hotel), InventoryError> {
        let mut tx = self.ledger.begin().await?;

        match tx.lock_hotel(hotel_id).await {
            Ok(Some(hotel)) => Ok((tx, hotel)),
            Ok(None) => {
                if let Err(e) = tx.rollback().await {
                    tracing::warn!(hotel_id, "rollback failed: {}", e);
                }
                Err(InventoryError::HotelNotFound(hotel_id))
            }
            Err(e) => {
                if let Err(rollback_error) = tx.rollback().await {
                    tracing::warn!(hotel_id, "rollback failed: {}", rollback_error);
                }
                Err(e)
            }
        }
    }
}
