use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::validate_not_blank;

/// A hotel and the room capacity its inventory entries partition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Decameron Cartagena")]
    pub name: String,
    #[schema(example = "12345678-9")]
    pub tax_id: String,
    #[schema(example = "Calle 23 #56-10")]
    pub address: String,
    #[schema(example = "Cartagena")]
    pub city: String,
    #[schema(example = 42, minimum = 0)]
    pub total_room_capacity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Hotel reference embedded in room listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HotelRef {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub total_room_capacity: i32,
}

impl From<&Hotel> for HotelRef {
    fn from(hotel: &Hotel) -> Self {
        Self {
            id: hotel.id,
            name: hotel.name.clone(),
            city: hotel.city.clone(),
            total_room_capacity: hotel.total_room_capacity,
        }
    }
}

/// Request DTO for POST /api/hotels
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateHotelRequest {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Decameron Cartagena")]
    pub name: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "12345678-9")]
    pub tax_id: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Calle 23 #56-10")]
    pub address: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Cartagena")]
    pub city: String,
    #[validate(range(min = 0, message = "Room capacity must not be negative"))]
    #[schema(example = 42, minimum = 0)]
    pub total_room_capacity: i32,
}

/// Request DTO for PUT /api/hotels/{id}
///
/// Omitted fields keep their current value. Capacity changes are checked
/// against the rooms already allocated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHotelRequest {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub tax_id: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub address: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub city: Option<String>,
    #[validate(range(min = 0, message = "Room capacity must not be negative"))]
    pub total_room_capacity: Option<i32>,
}

impl UpdateHotelRequest {
    /// Overlay the supplied fields on a hotel
    pub fn apply_to(&self, hotel: &mut Hotel) {
        if let Some(ref name) = self.name {
            hotel.name = name.clone();
        }
        if let Some(ref tax_id) = self.tax_id {
            hotel.tax_id = tax_id.clone();
        }
        if let Some(ref address) = self.address {
            hotel.address = address.clone();
        }
        if let Some(ref city) = self.city {
            hotel.city = city.clone();
        }
        if let Some(capacity) = self.total_room_capacity {
            hotel.total_room_capacity = capacity;
        }
    }
}
