use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::hotels::{Hotel, HotelRef};

/// Room category offered by a hotel
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "room_type", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RoomType {
    Standard,
    Junior,
    Suite,
}

impl RoomType {
    pub const ALL: [RoomType; 3] = [RoomType::Standard, RoomType::Junior, RoomType::Suite];

    /// Convert room type to its wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Standard => "STANDARD",
            RoomType::Junior => "JUNIOR",
            RoomType::Suite => "SUITE",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "STANDARD" => Ok(RoomType::Standard),
            "JUNIOR" => Ok(RoomType::Junior),
            "SUITE" => Ok(RoomType::Suite),
            _ => Err(format!("Invalid room type: {}", s)),
        }
    }
}

/// Occupancy layout of a room
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "accommodation", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Accommodation {
    Single,
    Double,
    Triple,
    Quadruple,
}

impl Accommodation {
    pub const ALL: [Accommodation; 4] = [
        Accommodation::Single,
        Accommodation::Double,
        Accommodation::Triple,
        Accommodation::Quadruple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Accommodation::Single => "SINGLE",
            Accommodation::Double => "DOUBLE",
            Accommodation::Triple => "TRIPLE",
            Accommodation::Quadruple => "QUADRUPLE",
        }
    }
}

impl std::fmt::Display for Accommodation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Accommodation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SINGLE" => Ok(Accommodation::Single),
            "DOUBLE" => Ok(Accommodation::Double),
            "TRIPLE" => Ok(Accommodation::Triple),
            "QUADRUPLE" => Ok(Accommodation::Quadruple),
            _ => Err(format!("Invalid accommodation: {}", s)),
        }
    }
}

/// One committed allocation of rooms for a (type, accommodation) pair at a hotel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = 1)]
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub accommodation: Accommodation,
    #[schema(example = 5, minimum = 0)]
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryEntry {
    pub fn allocation(&self) -> Allocation {
        Allocation {
            room_type: self.room_type,
            accommodation: self.accommodation,
            quantity: self.quantity,
        }
    }
}

/// The mutable part of an entry: which slot it occupies and how many rooms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    pub room_type: RoomType,
    pub accommodation: Accommodation,
    pub quantity: i32,
}

/// An allocation about to be inserted for a hotel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAllocation {
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub accommodation: Accommodation,
    pub quantity: i32,
}

impl From<&CreateRoomRequest> for NewAllocation {
    fn from(request: &CreateRoomRequest) -> Self {
        Self {
            hotel_id: request.hotel_id,
            room_type: request.room_type,
            accommodation: request.accommodation,
            quantity: request.quantity,
        }
    }
}

/// Request DTO for POST /api/rooms
///
/// All fields are required.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    #[schema(example = 1)]
    pub hotel_id: i64,
    #[schema(example = "STANDARD")]
    pub room_type: RoomType,
    #[schema(example = "DOUBLE")]
    pub accommodation: Accommodation,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    #[schema(example = 5, minimum = 0)]
    pub quantity: i32,
}

/// Request DTO for PUT /api/rooms/{id}
///
/// Every field is optional; omitted fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomRequest {
    #[schema(example = "SUITE")]
    pub room_type: Option<RoomType>,
    #[schema(example = "TRIPLE")]
    pub accommodation: Option<Accommodation>,
    #[validate(range(min = 0, message = "Quantity must not be negative"))]
    #[schema(example = 3, minimum = 0)]
    pub quantity: Option<i32>,
}

impl UpdateRoomRequest {
    /// Overlay the supplied fields on an existing allocation
    pub fn apply_to(&self, current: Allocation) -> Allocation {
        Allocation {
            room_type: self.room_type.unwrap_or(current.room_type),
            accommodation: self.accommodation.unwrap_or(current.accommodation),
            quantity: self.quantity.unwrap_or(current.quantity),
        }
    }
}

/// Response DTO for entries listed with their owning hotel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomWithHotel {
    pub id: i64,
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub accommodation: Accommodation,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub hotel: HotelRef,
}

impl RoomWithHotel {
    pub fn new(entry: InventoryEntry, hotel: &Hotel) -> Self {
        Self {
            id: entry.id,
            hotel_id: entry.hotel_id,
            room_type: entry.room_type,
            accommodation: entry.accommodation,
            quantity: entry.quantity,
            created_at: entry.created_at,
            updated_at: entry.updated_at,
            hotel: HotelRef::from(hotel),
        }
    }
}

/// Capacity report for one hotel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSummary {
    pub hotel_id: i64,
    pub total_room_capacity: i32,
    pub allocated: i64,
    pub remaining: i64,
}

impl AllocationSummary {
    pub fn new(hotel: &Hotel, allocated: i64) -> Self {
        Self {
            hotel_id: hotel.id,
            total_room_capacity: hotel.total_room_capacity,
            allocated,
            remaining: i64::from(hotel.total_room_capacity) - allocated,
        }
    }
}
