use std::sync::Arc;

use validator::Validate;

use crate::error::InventoryError;
use crate::hotels::HotelDirectory;
use crate::inventory::coordinator::{TransactionCoordinator, TransactionScope};
use crate::inventory::ledger::InventoryLedger;
use crate::inventory::{
    AllocationSummary, AllocationValidator, CreateRoomRequest, InventoryEntry, NewAllocation,
    RoomWithHotel, UpdateRoomRequest,
};

/// Service layer for room inventory allocations
#[derive(Clone)]
pub struct InventoryService {
    ledger: Arc<dyn InventoryLedger>,
    hotels: Arc<dyn HotelDirectory>,
    coordinator: TransactionCoordinator,
}

impl InventoryService {
    pub fn new(
        ledger: Arc<dyn InventoryLedger>,
        hotels: Arc<dyn HotelDirectory>,
        coordinator: TransactionCoordinator,
    ) -> Self {
        Self {
            ledger,
            hotels,
            coordinator,
        }
    }

    /// Allocate rooms of one (type, accommodation) pair at a hotel
    ///
    /// This method:
    /// 1. Validates the request payload
    /// 2. Opens a transaction holding the hotel lock
    /// 3. Runs the allocation checks against the locked snapshot
    /// 4. Inserts the entry and commits
    pub async fn create_allocation(
        &self,
        request: CreateRoomRequest,
    ) -> Result<InventoryEntry, InventoryError> {
        request.validate()?;
        let allocation = NewAllocation::from(&request);

        let mut scope = self.coordinator.begin(allocation.hotel_id).await?;
        let result = Self::apply_create(&mut scope, allocation).await;
        let entry = scope.finish(result).await?;

        tracing::info!(
            "Allocated {} {}/{} rooms at hotel {} (entry {})",
            entry.quantity,
            entry.room_type,
            entry.accommodation,
            entry.hotel_id,
            entry.id
        );
        Ok(entry)
    }

    /// Change the slot and/or quantity of an existing entry
    ///
    /// The entry is looked up without the lock to find its hotel, then read
    /// again inside the transaction before validation.
    pub async fn update_allocation(
        &self,
        entry_id: i64,
        changes: UpdateRoomRequest,
    ) -> Result<InventoryEntry, InventoryError> {
        changes.validate()?;

        let hotel_id = self.owning_hotel(entry_id).await?;
        let mut scope = self.begin_for_entry(entry_id, hotel_id).await?;
        let result = Self::apply_update(&mut scope, entry_id, &changes).await;
        let entry = scope.finish(result).await?;

        tracing::info!(
            "Updated entry {} to {} {}/{} rooms at hotel {}",
            entry.id,
            entry.quantity,
            entry.room_type,
            entry.accommodation,
            entry.hotel_id
        );
        Ok(entry)
    }

    /// Remove an entry, releasing its rooms
    pub async fn delete_allocation(&self, entry_id: i64) -> Result<(), InventoryError> {
        let hotel_id = self.owning_hotel(entry_id).await?;
        let mut scope = self.begin_for_entry(entry_id, hotel_id).await?;
        let result = Self::apply_delete(&mut scope, entry_id).await;
        let removed = scope.finish(result).await?;

        tracing::info!(
            "Deleted entry {} ({} {}/{} rooms) at hotel {}",
            removed.id,
            removed.quantity,
            removed.room_type,
            removed.accommodation,
            removed.hotel_id
        );
        Ok(())
    }

    pub async fn get_allocation(&self, entry_id: i64) -> Result<RoomWithHotel, InventoryError> {
        tracing::debug!("Fetching inventory entry {}", entry_id);
        self.ledger
            .find_entry_with_hotel(entry_id)
            .await?
            .ok_or(InventoryError::RoomNotFound(entry_id))
    }

    pub async fn list_allocations(&self) -> Result<Vec<RoomWithHotel>, InventoryError> {
        let entries = self.ledger.list_entries_with_hotel().await?;
        tracing::debug!("Retrieved {} inventory entries", entries.len());
        Ok(entries)
    }

    /// Capacity report for a hotel; a plain read that takes no lock
    pub async fn allocation_summary(
        &self,
        hotel_id: i64,
    ) -> Result<AllocationSummary, InventoryError> {
        let hotel = self
            .hotels
            .find_by_id(hotel_id)
            .await?
            .ok_or(InventoryError::HotelNotFound(hotel_id))?;
        let allocated = self.ledger.current_total(hotel_id).await?;
        Ok(AllocationSummary::new(&hotel, allocated))
    }

    async fn owning_hotel(&self, entry_id: i64) -> Result<i64, InventoryError> {
        self.ledger
            .find_entry(entry_id)
            .await?
            .map(|entry| entry.hotel_id)
            .ok_or(InventoryError::RoomNotFound(entry_id))
    }

    /// A hotel deleted since the unlocked lookup took the entry with it
    async fn begin_for_entry(
        &self,
        entry_id: i64,
        hotel_id: i64,
    ) -> Result<TransactionScope, InventoryError> {
        self.coordinator
            .begin(hotel_id)
            .await
            .map_err(|e| match e {
                InventoryError::HotelNotFound(_) => InventoryError::RoomNotFound(entry_id),
                other => other,
            })
    }

    async fn apply_create(
        scope: &mut TransactionScope,
        allocation: NewAllocation,
    ) -> Result<InventoryEntry, InventoryError> {
        let capacity = scope.capacity();
        AllocationValidator::validate_create(scope.ledger()?, &allocation, capacity).await?;
        scope.mark_validated();

        scope.ledger()?.insert(allocation).await
    }

    async fn apply_update(
        scope: &mut TransactionScope,
        entry_id: i64,
        changes: &UpdateRoomRequest,
    ) -> Result<InventoryEntry, InventoryError> {
        let capacity = scope.capacity();
        let hotel_id = scope.hotel_id();
        let tx = scope.ledger()?;

        let existing = tx
            .find_entry(entry_id)
            .await?
            .filter(|entry| entry.hotel_id == hotel_id)
            .ok_or(InventoryError::RoomNotFound(entry_id))?;
        let resolved =
            AllocationValidator::validate_update(tx, &existing, changes, capacity).await?;
        scope.mark_validated();

        scope.ledger()?.update(entry_id, resolved).await
    }

    async fn apply_delete(
        scope: &mut TransactionScope,
        entry_id: i64,
    ) -> Result<InventoryEntry, InventoryError> {
        let tx = scope.ledger()?;
        let current = tx.find_entry(entry_id).await?;
        let existing = AllocationValidator::validate_delete(entry_id, current)?;
        scope.mark_validated();

        if scope.ledger()?.delete(entry_id).await? {
            Ok(existing)
        } else {
            Err(InventoryError::RoomNotFound(entry_id))
        }
    }
}
