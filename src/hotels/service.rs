use std::sync::Arc;

use validator::Validate;

use crate::error::InventoryError;
use crate::hotels::{CreateHotelRequest, Hotel, HotelDirectory, UpdateHotelRequest};
use crate::inventory::{TransactionCoordinator, TransactionScope};

/// Service layer for the hotel registry
#[derive(Clone)]
pub struct HotelService {
    directory: Arc<dyn HotelDirectory>,
    coordinator: TransactionCoordinator,
}

impl HotelService {
    /// `coordinator` must be the one the inventory service uses, so hotel
    /// writes and allocations share a lock table.
    pub fn new(directory: Arc<dyn HotelDirectory>, coordinator: TransactionCoordinator) -> Self {
        Self {
            directory,
            coordinator,
        }
    }

    pub async fn create_hotel(&self, request: CreateHotelRequest) -> Result<Hotel, InventoryError> {
        request.validate()?;

        let hotel = self.directory.create(&request).await?;
        tracing::info!(
            "Registered hotel {} ({}) with capacity {}",
            hotel.id,
            hotel.name,
            hotel.total_room_capacity
        );
        Ok(hotel)
    }

    pub async fn list_hotels(&self) -> Result<Vec<Hotel>, InventoryError> {
        let hotels = self.directory.list().await?;
        tracing::debug!("Retrieved {} hotels", hotels.len());
        Ok(hotels)
    }

    pub async fn get_hotel(&self, hotel_id: i64) -> Result<Hotel, InventoryError> {
        self.directory
            .find_by_id(hotel_id)
            .await?
            .ok_or(InventoryError::HotelNotFound(hotel_id))
    }

    /// Update hotel details
    ///
    /// A new capacity is checked against the rooms already allocated, under
    /// the same hotel lock allocations take.
    pub async fn update_hotel(
        &self,
        hotel_id: i64,
        changes: UpdateHotelRequest,
    ) -> Result<Hotel, InventoryError> {
        changes.validate()?;

        let mut scope = self.coordinator.begin(hotel_id).await?;
        let result = Self::apply_update(&mut scope, &changes).await;
        let hotel = scope.finish(result).await?;

        tracing::info!("Updated hotel {}", hotel.id);
        Ok(hotel)
    }

    /// Delete a hotel together with all of its inventory entries
    pub async fn delete_hotel(&self, hotel_id: i64) -> Result<(), InventoryError> {
        let mut scope = self.coordinator.begin(hotel_id).await?;
        let result = Self::apply_delete(&mut scope).await;
        scope.finish(result).await?;

        self.coordinator.locks().forget(hotel_id).await;
        tracing::info!("Deleted hotel {} and its inventory", hotel_id);
        Ok(())
    }

    async fn apply_update(
        scope: &mut TransactionScope,
        changes: &UpdateHotelRequest,
    ) -> Result<Hotel, InventoryError> {
        let hotel_id = scope.hotel_id();

        if let Some(capacity) = changes.total_room_capacity {
            let allocated = scope.ledger()?.current_total(hotel_id).await?;
            if allocated > i64::from(capacity) {
                return Err(InventoryError::CapacityBelowAllocated {
                    hotel_id,
                    capacity,
                    allocated,
                });
            }
        }
        scope.mark_validated();

        scope.ledger()?.update_hotel(hotel_id, changes).await
    }

    async fn apply_delete(scope: &mut TransactionScope) -> Result<(), InventoryError> {
        let hotel_id = scope.hotel_id();
        scope.mark_validated();

        if scope.ledger()?.delete_hotel(hotel_id).await? {
            Ok(())
        } else {
            Err(InventoryError::HotelNotFound(hotel_id))
        }
    }
}
