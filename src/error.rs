// Error handling module for the Hotel Inventory API
// Provides the shared error taxonomy and HTTP response conversion

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, warn};
use utoipa::ToSchema;

use crate::inventory::{Accommodation, RoomType};

/// Main error type for the inventory core and its HTTP surface
///
/// Rule violations (duplicate, incompatible, capacity) are client errors and
/// always leave the ledger untouched. `StorageFailure` and `LockTimeout` are
/// safe to retry because the aborted transaction wrote nothing.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Hotel with id {0} not found")]
    HotelNotFound(i64),

    #[error("Room inventory entry with id {0} not found")]
    RoomNotFound(i64),

    #[error("Hotel {hotel_id} already has an allocation for {room_type}/{accommodation}")]
    DuplicateAllocation {
        hotel_id: i64,
        room_type: RoomType,
        accommodation: Accommodation,
    },

    #[error("Accommodation {accommodation} is not allowed for room type {room_type}")]
    IncompatibleAccommodation {
        room_type: RoomType,
        accommodation: Accommodation,
    },

    #[error("Allocating {requested_total} rooms exceeds hotel {hotel_id} capacity of {capacity}")]
    CapacityExceeded {
        hotel_id: i64,
        capacity: i32,
        requested_total: i64,
    },

    #[error("Hotel {hotel_id} capacity cannot be set to {capacity}: {allocated} rooms are already allocated")]
    CapacityBelowAllocated {
        hotel_id: i64,
        capacity: i32,
        allocated: i64,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timed out waiting for exclusive access to hotel {hotel_id}")]
    LockTimeout { hotel_id: i64 },

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

/// Consistent error response structure
///
/// `error_code` is machine-readable, `message` is meant for humans.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "CAPACITY_EXCEEDED")]
    pub error_code: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<serde_json::Value>,

    /// RFC 3339 timestamp of when the error occurred
    pub timestamp: String,
}

impl InventoryError {
    /// Machine-readable code used in the response body
    pub fn error_code(&self) -> &'static str {
        match self {
            InventoryError::HotelNotFound(_) => "HOTEL_NOT_FOUND",
            InventoryError::RoomNotFound(_) => "ROOM_NOT_FOUND",
            InventoryError::DuplicateAllocation { .. } => "DUPLICATE_ALLOCATION",
            InventoryError::IncompatibleAccommodation { .. } => "INCOMPATIBLE_ACCOMMODATION",
            InventoryError::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            InventoryError::CapacityBelowAllocated { .. } => "CAPACITY_BELOW_ALLOCATED",
            InventoryError::Validation(_) => "VALIDATION_ERROR",
            InventoryError::LockTimeout { .. } => "LOCK_TIMEOUT",
            InventoryError::StorageFailure(_) => "STORAGE_FAILURE",
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            InventoryError::HotelNotFound(_) | InventoryError::RoomNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            InventoryError::DuplicateAllocation { .. }
            | InventoryError::IncompatibleAccommodation { .. }
            | InventoryError::CapacityExceeded { .. }
            | InventoryError::CapacityBelowAllocated { .. }
            | InventoryError::Validation(_) => StatusCode::BAD_REQUEST,
            InventoryError::LockTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
            InventoryError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the caller may safely retry the whole operation
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            InventoryError::LockTimeout { .. } | InventoryError::StorageFailure(_)
        )
    }

    /// Convert the error into a status code and client-facing body
    ///
    /// Logging level follows severity: storage failures at error, rule
    /// violations and lock contention at warn, not-found at debug.
    /// Storage details never reach the client; retryable errors say so in
    /// `details`.
    fn to_error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = self.status_code();

        let (message, details) = match self {
            InventoryError::StorageFailure(internal) => {
                error!("Storage failure: {}", internal);
                (
                    "A storage error occurred".to_string(),
                    Some(serde_json::json!({ "retryable": self.is_retryable() })),
                )
            }
            InventoryError::HotelNotFound(_) | InventoryError::RoomNotFound(_) => {
                debug!("{}", self);
                (self.to_string(), None)
            }
            InventoryError::DuplicateAllocation {
                hotel_id,
                room_type,
                accommodation,
            } => {
                warn!("{}", self);
                (
                    self.to_string(),
                    Some(serde_json::json!({
                        "hotelId": hotel_id,
                        "roomType": room_type,
                        "accommodation": accommodation,
                    })),
                )
            }
            InventoryError::IncompatibleAccommodation {
                room_type,
                accommodation,
            } => {
                warn!("{}", self);
                (
                    self.to_string(),
                    Some(serde_json::json!({
                        "roomType": room_type,
                        "accommodation": accommodation,
                        "allowed": crate::inventory::compatible_accommodations(*room_type),
                    })),
                )
            }
            InventoryError::CapacityExceeded {
                hotel_id,
                capacity,
                requested_total,
            } => {
                warn!("{}", self);
                (
                    self.to_string(),
                    Some(serde_json::json!({
                        "hotelId": hotel_id,
                        "capacity": capacity,
                        "requestedTotal": requested_total,
                    })),
                )
            }
            InventoryError::CapacityBelowAllocated {
                hotel_id,
                capacity,
                allocated,
            } => {
                warn!("{}", self);
                (
                    self.to_string(),
                    Some(serde_json::json!({
                        "hotelId": hotel_id,
                        "capacity": capacity,
                        "allocated": allocated,
                    })),
                )
            }
            InventoryError::Validation(_) => {
                debug!("{}", self);
                (self.to_string(), None)
            }
            InventoryError::LockTimeout { hotel_id } => {
                warn!("{}", self);
                (
                    self.to_string(),
                    Some(serde_json::json!({
                        "hotelId": hotel_id,
                        "retryable": self.is_retryable(),
                    })),
                )
            }
        };

        (
            status,
            ErrorResponse {
                error_code: self.error_code().to_string(),
                message,
                details,
                timestamp: Utc::now().to_rfc3339(),
            },
        )
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let (status, error_response) = self.to_error_response();
        (status, Json(error_response)).into_response()
    }
}

/// Convert sqlx errors to InventoryError
///
/// Constraint-specific codes are mapped where the failing statement is known,
/// in the Postgres ledger. Anything reaching this conversion is a storage failure.
impl From<sqlx::Error> for InventoryError {
    fn from(error: sqlx::Error) -> Self {
        InventoryError::StorageFailure(error.to_string())
    }
}

/// Convert validator errors to InventoryError
impl From<validator::ValidationErrors> for InventoryError {
    fn from(errors: validator::ValidationErrors) -> Self {
        InventoryError::Validation(errors.to_string())
    }
}
