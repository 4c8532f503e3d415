// Allocation Validator
//
// Decides whether a proposed create/update keeps a hotel's inventory within
// its invariants. Reads through the caller's transaction and never writes.

use crate::error::InventoryError;
use crate::inventory::ledger::LedgerTransaction;
use crate::inventory::{
    is_compatible, Accommodation, Allocation, InventoryEntry, NewAllocation, RoomType,
    UpdateRoomRequest,
};

/// Admission checks for inventory mutations
pub struct AllocationValidator;

impl AllocationValidator {
    /// Validate a new allocation
    ///
    /// Checks, in order:
    /// 1. No entry already occupies the (type, accommodation) slot
    /// 2. The accommodation is legal for the room type
    /// 3. Current total plus the new quantity stays within capacity
    pub async fn validate_create(
        tx: &mut dyn LedgerTransaction,
        allocation: &NewAllocation,
        capacity: i32,
    ) -> Result<(), InventoryError> {
        let existing = tx
            .find_by_type_and_accommodation(
                allocation.hotel_id,
                allocation.room_type,
                allocation.accommodation,
            )
            .await?;
        if existing.is_some() {
            return Err(InventoryError::DuplicateAllocation {
                hotel_id: allocation.hotel_id,
                room_type: allocation.room_type,
                accommodation: allocation.accommodation,
            });
        }

        Self::ensure_compatible(allocation.room_type, allocation.accommodation)?;

        let current_total = tx.current_total(allocation.hotel_id).await?;
        Self::ensure_within_capacity(
            allocation.hotel_id,
            current_total + i64::from(allocation.quantity),
            capacity,
        )
    }

    /// Validate changes to an existing entry and return the resulting allocation
    ///
    /// Uniqueness and compatibility are only re-checked when the slot moves;
    /// capacity is always recomputed with the entry's old quantity swapped
    /// for the new one.
    pub async fn validate_update(
        tx: &mut dyn LedgerTransaction,
        existing: &InventoryEntry,
        changes: &UpdateRoomRequest,
        capacity: i32,
    ) -> Result<Allocation, InventoryError> {
        let resulting = changes.apply_to(existing.allocation());

        let slot_changed = resulting.room_type != existing.room_type
            || resulting.accommodation != existing.accommodation;
        if slot_changed {
            let occupant = tx
                .find_by_type_and_accommodation(
                    existing.hotel_id,
                    resulting.room_type,
                    resulting.accommodation,
                )
                .await?;
            if occupant.is_some_and(|entry| entry.id != existing.id) {
                return Err(InventoryError::DuplicateAllocation {
                    hotel_id: existing.hotel_id,
                    room_type: resulting.room_type,
                    accommodation: resulting.accommodation,
                });
            }

            Self::ensure_compatible(resulting.room_type, resulting.accommodation)?;
        }

        let current_total = tx.current_total(existing.hotel_id).await?;
        let projected =
            current_total - i64::from(existing.quantity) + i64::from(resulting.quantity);
        Self::ensure_within_capacity(existing.hotel_id, projected, capacity)?;

        Ok(resulting)
    }

    /// Deleting can never break an invariant; the entry only has to exist
    pub fn validate_delete(
        entry_id: i64,
        existing: Option<InventoryEntry>,
    ) -> Result<InventoryEntry, InventoryError> {
        existing.ok_or(InventoryError::RoomNotFound(entry_id))
    }

    pub fn ensure_compatible(
        room_type: RoomType,
        accommodation: Accommodation,
    ) -> Result<(), InventoryError> {
        if is_compatible(room_type, accommodation) {
            Ok(())
        } else {
            Err(InventoryError::IncompatibleAccommodation {
                room_type,
                accommodation,
            })
        }
    }

    /// Reaching capacity exactly is allowed
    pub fn ensure_within_capacity(
        hotel_id: i64,
        projected_total: i64,
        capacity: i32,
    ) -> Result<(), InventoryError> {
        if projected_total > i64::from(capacity) {
            Err(InventoryError::CapacityExceeded {
                hotel_id,
                capacity,
                requested_total: projected_total,
            })
        } else {
            Ok(())
        }
    }
}
