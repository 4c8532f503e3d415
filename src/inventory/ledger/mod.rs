//! Inventory ledger: the only owner of inventory entry storage.
//!
//! Writes happen through a [`LedgerTransaction`] handed out by
//! [`InventoryLedger::begin`]. The ledger never commits or rolls back on its
//! own; dropping an uncommitted transaction discards its writes.
//!
//! Implementations:
//! - `PgLedger`: PostgreSQL storage
//! - `MemoryLedger`: in-process storage for local runs and tests

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedger;
pub use postgres::PgLedger;

use async_trait::async_trait;

use crate::error::InventoryError;
use crate::hotels::{Hotel, UpdateHotelRequest};
use crate::inventory::{
    Accommodation, Allocation, InventoryEntry, NewAllocation, RoomType, RoomWithHotel,
};

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, InventoryError>;

/// Reads and writes scoped to one open transaction.
///
/// Reads observe the transaction's own uncommitted writes and nothing
/// uncommitted from any other transaction.
#[async_trait]
pub trait LedgerTransaction: Send {
    /// Resolve a hotel and hold its row lock until the transaction ends.
    async fn lock_hotel(&mut self, hotel_id: i64) -> LedgerResult<Option<Hotel>>;

    /// Sum of quantity over the hotel's entries.
    async fn current_total(&mut self, hotel_id: i64) -> LedgerResult<i64>;

    async fn find_entry(&mut self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>>;

    async fn find_by_type_and_accommodation(
        &mut self,
        hotel_id: i64,
        room_type: RoomType,
        accommodation: Accommodation,
    ) -> LedgerResult<Option<InventoryEntry>>;

    async fn insert(&mut self, allocation: NewAllocation) -> LedgerResult<InventoryEntry>;

    async fn update(&mut self, entry_id: i64, allocation: Allocation)
        -> LedgerResult<InventoryEntry>;

    /// Returns whether an entry was removed.
    async fn delete(&mut self, entry_id: i64) -> LedgerResult<bool>;

    async fn update_hotel(
        &mut self,
        hotel_id: i64,
        changes: &UpdateHotelRequest,
    ) -> LedgerResult<Hotel>;

    /// Removes the hotel and, by cascade, all of its entries.
    async fn delete_hotel(&mut self, hotel_id: i64) -> LedgerResult<bool>;

    async fn commit(self: Box<Self>) -> LedgerResult<()>;

    async fn rollback(self: Box<Self>) -> LedgerResult<()>;
}

/// Interface for inventory persistence.
///
/// The non-transactional reads here serve reporting and the GET endpoints;
/// they never feed a write decision.
#[async_trait]
pub trait InventoryLedger: Send + Sync {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTransaction>>;

    async fn find_entry(&self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>>;

    async fn find_entry_with_hotel(&self, entry_id: i64) -> LedgerResult<Option<RoomWithHotel>>;

    async fn list_entries_with_hotel(&self) -> LedgerResult<Vec<RoomWithHotel>>;

    async fn current_total(&self, hotel_id: i64) -> LedgerResult<i64>;
}
