//! In-memory inventory ledger.
//!
//! Each transaction stages its writes privately and applies them in one step
//! at commit, so other transactions never see uncommitted quantities. The
//! storage constraints of the Postgres schema (unique slot, compatible pair,
//! non-negative quantity, cascade on hotel delete) are mirrored here.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{InventoryLedger, LedgerResult, LedgerTransaction};
use crate::error::InventoryError;
use crate::hotels::{CreateHotelRequest, Hotel, HotelDirectory, UpdateHotelRequest};
use crate::inventory::{
    is_compatible, Accommodation, Allocation, InventoryEntry, NewAllocation, RoomType,
    RoomWithHotel,
};

#[derive(Debug, Default)]
struct MemoryState {
    hotels: BTreeMap<i64, Hotel>,
    entries: BTreeMap<i64, InventoryEntry>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    state: RwLock<MemoryState>,
    next_hotel_id: AtomicI64,
    next_entry_id: AtomicI64,
    fail_on_commit: AtomicBool,
}

/// Ledger and hotel directory backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    inner: Arc<MemoryInner>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent commit fail with a storage failure.
    #[cfg(test)]
    pub fn set_fail_on_commit(&self, fail: bool) {
        self.inner.fail_on_commit.store(fail, Ordering::SeqCst);
    }

    /// Committed entries of one hotel
    #[cfg(test)]
    pub async fn list_hotel_entries(&self, hotel_id: i64) -> LedgerResult<Vec<InventoryEntry>> {
        let state = self.inner.state.read().await;
        Ok(state
            .entries
            .values()
            .filter(|e| e.hotel_id == hotel_id)
            .cloned()
            .collect())
    }
}

/// Open transaction against a [`MemoryLedger`].
///
/// `None` in a staged map marks a deletion.
pub struct MemoryTransaction {
    inner: Arc<MemoryInner>,
    hotels: BTreeMap<i64, Option<Hotel>>,
    entries: BTreeMap<i64, Option<InventoryEntry>>,
}

impl MemoryTransaction {
    fn hotel_deleted(&self, hotel_id: i64) -> bool {
        matches!(self.hotels.get(&hotel_id), Some(None))
    }

    async fn visible_hotel(&self, hotel_id: i64) -> Option<Hotel> {
        if let Some(staged) = self.hotels.get(&hotel_id) {
            return staged.clone();
        }
        self.inner.state.read().await.hotels.get(&hotel_id).cloned()
    }

    async fn visible_entry(&self, entry_id: i64) -> Option<InventoryEntry> {
        let entry = match self.entries.get(&entry_id) {
            Some(staged) => staged.clone(),
            None => self.inner.state.read().await.entries.get(&entry_id).cloned(),
        };
        entry.filter(|e| !self.hotel_deleted(e.hotel_id))
    }

    async fn visible_hotel_entries(&self, hotel_id: i64) -> Vec<InventoryEntry> {
        if self.hotel_deleted(hotel_id) {
            return Vec::new();
        }

        let mut entries: BTreeMap<i64, InventoryEntry> = {
            let state = self.inner.state.read().await;
            state
                .entries
                .values()
                .filter(|e| e.hotel_id == hotel_id)
                .map(|e| (e.id, e.clone()))
                .collect()
        };

        for (id, staged) in &self.entries {
            match staged {
                Some(entry) if entry.hotel_id == hotel_id => {
                    entries.insert(*id, entry.clone());
                }
                Some(_) => {}
                None => {
                    entries.remove(id);
                }
            }
        }

        entries.into_values().collect()
    }

    /// Storage-level guard equivalent to the schema constraints.
    async fn check_slot(
        &self,
        hotel_id: i64,
        exclude_id: Option<i64>,
        allocation: Allocation,
    ) -> LedgerResult<()> {
        if allocation.quantity < 0 {
            return Err(InventoryError::Validation(
                "Quantity must not be negative".to_string(),
            ));
        }
        if !is_compatible(allocation.room_type, allocation.accommodation) {
            return Err(InventoryError::IncompatibleAccommodation {
                room_type: allocation.room_type,
                accommodation: allocation.accommodation,
            });
        }
        let taken = self
            .visible_hotel_entries(hotel_id)
            .await
            .into_iter()
            .any(|e| {
                Some(e.id) != exclude_id
                    && e.room_type == allocation.room_type
                    && e.accommodation == allocation.accommodation
            });
        if taken {
            return Err(InventoryError::DuplicateAllocation {
                hotel_id,
                room_type: allocation.room_type,
                accommodation: allocation.accommodation,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerTransaction for MemoryTransaction {
    async fn lock_hotel(&mut self, hotel_id: i64) -> LedgerResult<Option<Hotel>> {
        // The coordinator's per-hotel mutex already serialises writers.
        Ok(self.visible_hotel(hotel_id).await)
    }

    async fn current_total(&mut self, hotel_id: i64) -> LedgerResult<i64> {
        Ok(self
            .visible_hotel_entries(hotel_id)
            .await
            .iter()
            .map(|e| i64::from(e.quantity))
            .sum())
    }

    async fn find_entry(&mut self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>> {
        Ok(self.visible_entry(entry_id).await)
    }

    async fn find_by_type_and_accommodation(
        &mut self,
        hotel_id: i64,
        room_type: RoomType,
        accommodation: Accommodation,
    ) -> LedgerResult<Option<InventoryEntry>> {
        Ok(self
            .visible_hotel_entries(hotel_id)
            .await
            .into_iter()
            .find(|e| e.room_type == room_type && e.accommodation == accommodation))
    }

    async fn insert(&mut self, allocation: NewAllocation) -> LedgerResult<InventoryEntry> {
        if self.visible_hotel(allocation.hotel_id).await.is_none() {
            return Err(InventoryError::HotelNotFound(allocation.hotel_id));
        }
        let slot = Allocation {
            room_type: allocation.room_type,
            accommodation: allocation.accommodation,
            quantity: allocation.quantity,
        };
        self.check_slot(allocation.hotel_id, None, slot).await?;

        let now = Utc::now();
        let entry = InventoryEntry {
            id: self.inner.next_entry_id.fetch_add(1, Ordering::SeqCst) + 1,
            hotel_id: allocation.hotel_id,
            room_type: allocation.room_type,
            accommodation: allocation.accommodation,
            quantity: allocation.quantity,
            created_at: now,
            updated_at: now,
        };
        self.entries.insert(entry.id, Some(entry.clone()));
        Ok(entry)
    }

    async fn update(
        &mut self,
        entry_id: i64,
        allocation: Allocation,
    ) -> LedgerResult<InventoryEntry> {
        let mut entry = self
            .visible_entry(entry_id)
            .await
            .ok_or(InventoryError::RoomNotFound(entry_id))?;
        self.check_slot(entry.hotel_id, Some(entry_id), allocation)
            .await?;

        entry.room_type = allocation.room_type;
        entry.accommodation = allocation.accommodation;
        entry.quantity = allocation.quantity;
        entry.updated_at = Utc::now();
        self.entries.insert(entry_id, Some(entry.clone()));
        Ok(entry)
    }

    async fn delete(&mut self, entry_id: i64) -> LedgerResult<bool> {
        if self.visible_entry(entry_id).await.is_none() {
            return Ok(false);
        }
        self.entries.insert(entry_id, None);
        Ok(true)
    }

    async fn update_hotel(
        &mut self,
        hotel_id: i64,
        changes: &UpdateHotelRequest,
    ) -> LedgerResult<Hotel> {
        let mut hotel = self
            .visible_hotel(hotel_id)
            .await
            .ok_or(InventoryError::HotelNotFound(hotel_id))?;
        changes.apply_to(&mut hotel);
        hotel.updated_at = Utc::now();
        self.hotels.insert(hotel_id, Some(hotel.clone()));
        Ok(hotel)
    }

    async fn delete_hotel(&mut self, hotel_id: i64) -> LedgerResult<bool> {
        if self.visible_hotel(hotel_id).await.is_none() {
            return Ok(false);
        }
        self.hotels.insert(hotel_id, None);
        Ok(true)
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        if self.inner.fail_on_commit.load(Ordering::SeqCst) {
            return Err(InventoryError::StorageFailure(
                "commit rejected by memory ledger".to_string(),
            ));
        }

        let MemoryTransaction {
            inner,
            hotels,
            entries,
        } = *self;
        let mut state = inner.state.write().await;

        for (hotel_id, staged) in hotels {
            match staged {
                Some(hotel) => {
                    state.hotels.insert(hotel_id, hotel);
                }
                None => {
                    state.hotels.remove(&hotel_id);
                    state.entries.retain(|_, e| e.hotel_id != hotel_id);
                }
            }
        }

        for (entry_id, staged) in entries {
            match staged {
                Some(entry) if state.hotels.contains_key(&entry.hotel_id) => {
                    state.entries.insert(entry_id, entry);
                }
                Some(_) => {}
                None => {
                    state.entries.remove(&entry_id);
                }
            }
        }

        Ok(())
    }

    async fn rollback(self: Box<Self>) -> LedgerResult<()> {
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for MemoryLedger {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTransaction>> {
        Ok(Box::new(MemoryTransaction {
            inner: self.inner.clone(),
            hotels: BTreeMap::new(),
            entries: BTreeMap::new(),
        }))
    }

    async fn find_entry(&self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>> {
        Ok(self.inner.state.read().await.entries.get(&entry_id).cloned())
    }

    async fn find_entry_with_hotel(&self, entry_id: i64) -> LedgerResult<Option<RoomWithHotel>> {
        let state = self.inner.state.read().await;
        Ok(state.entries.get(&entry_id).and_then(|entry| {
            state
                .hotels
                .get(&entry.hotel_id)
                .map(|hotel| RoomWithHotel::new(entry.clone(), hotel))
        }))
    }

    async fn list_entries_with_hotel(&self) -> LedgerResult<Vec<RoomWithHotel>> {
        let state = self.inner.state.read().await;
        Ok(state
            .entries
            .values()
            .filter_map(|entry| {
                state
                    .hotels
                    .get(&entry.hotel_id)
                    .map(|hotel| RoomWithHotel::new(entry.clone(), hotel))
            })
            .collect())
    }

    async fn current_total(&self, hotel_id: i64) -> LedgerResult<i64> {
        let state = self.inner.state.read().await;
        Ok(state
            .entries
            .values()
            .filter(|e| e.hotel_id == hotel_id)
            .map(|e| i64::from(e.quantity))
            .sum())
    }
}

#[async_trait]
impl HotelDirectory for MemoryLedger {
    async fn find_by_id(&self, hotel_id: i64) -> Result<Option<Hotel>, InventoryError> {
        Ok(self.inner.state.read().await.hotels.get(&hotel_id).cloned())
    }

    async fn list(&self) -> Result<Vec<Hotel>, InventoryError> {
        Ok(self
            .inner
            .state
            .read()
            .await
            .hotels
            .values()
            .cloned()
            .collect())
    }

    async fn create(&self, request: &CreateHotelRequest) -> Result<Hotel, InventoryError> {
        let now = Utc::now();
        let hotel = Hotel {
            id: self.inner.next_hotel_id.fetch_add(1, Ordering::SeqCst) + 1,
            name: request.name.clone(),
            tax_id: request.tax_id.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
            total_room_capacity: request.total_room_capacity,
            created_at: now,
            updated_at: now,
        };
        self.inner
            .state
            .write()
            .await
            .hotels
            .insert(hotel.id, hotel.clone());
        Ok(hotel)
    }
}
