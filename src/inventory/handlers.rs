// HTTP handlers for room inventory endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::InventoryError;
use crate::inventory::{CreateRoomRequest, InventoryEntry, RoomWithHotel, UpdateRoomRequest};
use crate::AppState;

/// Handler for POST /api/rooms
/// Allocates rooms of one type/accommodation pair at a hotel
#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Allocation created", body = InventoryEntry),
        (status = 400, description = "Duplicate allocation, incompatible accommodation, capacity exceeded or invalid input", body = ErrorResponse),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 503, description = "Hotel is busy, retry later", body = ErrorResponse)
    ),
    tag = "rooms"
)]
pub async fn create_room(
    State(state): State<AppState>,
    Json(payload): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<InventoryEntry>), InventoryError> {
    tracing::debug!(
        "Creating {}/{} allocation for hotel {}",
        payload.room_type,
        payload.accommodation,
        payload.hotel_id
    );

    let entry = state.inventory.create_allocation(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Handler for GET /api/rooms
/// Lists every allocation with its hotel
#[utoipa::path(
    get,
    path = "/api/rooms",
    responses(
        (status = 200, description = "All allocations", body = Vec<RoomWithHotel>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomWithHotel>>, InventoryError> {
    let rooms = state.inventory.list_allocations().await?;
    Ok(Json(rooms))
}

/// Handler for GET /api/rooms/:id
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(
        ("id" = i64, Path, description = "Inventory entry ID")
    ),
    responses(
        (status = 200, description = "Allocation found", body = RoomWithHotel),
        (status = 404, description = "Allocation not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "rooms"
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RoomWithHotel>, InventoryError> {
    let room = state.inventory.get_allocation(id).await?;
    Ok(Json(room))
}

/// Handler for PUT /api/rooms/:id
/// Omitted fields keep their current value
#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(
        ("id" = i64, Path, description = "Inventory entry ID")
    ),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Allocation updated", body = InventoryEntry),
        (status = 400, description = "Duplicate allocation, incompatible accommodation, capacity exceeded or invalid input", body = ErrorResponse),
        (status = 404, description = "Allocation not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 503, description = "Hotel is busy, retry later", body = ErrorResponse)
    ),
    tag = "rooms"
)]
pub async fn update_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoomRequest>,
) -> Result<Json<InventoryEntry>, InventoryError> {
    tracing::debug!("Updating inventory entry {}", id);

    let entry = state.inventory.update_allocation(id, payload).await?;
    Ok(Json(entry))
}

/// Handler for DELETE /api/rooms/:id
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(
        ("id" = i64, Path, description = "Inventory entry ID")
    ),
    responses(
        (status = 204, description = "Allocation deleted"),
        (status = 404, description = "Allocation not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 503, description = "Hotel is busy, retry later", body = ErrorResponse)
    ),
    tag = "rooms"
)]
pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, InventoryError> {
    tracing::debug!("Deleting inventory entry {}", id);

    state.inventory.delete_allocation(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
