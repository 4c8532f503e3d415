// HTTP handlers for hotel endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::error::InventoryError;
use crate::hotels::{CreateHotelRequest, Hotel, UpdateHotelRequest};
use crate::inventory::AllocationSummary;
use crate::AppState;

/// Handler for POST /api/hotels
#[utoipa::path(
    post,
    path = "/api/hotels",
    request_body = CreateHotelRequest,
    responses(
        (status = 201, description = "Hotel registered", body = Hotel),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn create_hotel(
    State(state): State<AppState>,
    Json(payload): Json<CreateHotelRequest>,
) -> Result<(StatusCode, Json<Hotel>), InventoryError> {
    tracing::debug!("Registering hotel: {}", payload.name);

    let hotel = state.hotels.create_hotel(payload).await?;
    Ok((StatusCode::CREATED, Json(hotel)))
}

/// Handler for GET /api/hotels
#[utoipa::path(
    get,
    path = "/api/hotels",
    responses(
        (status = 200, description = "All hotels", body = Vec<Hotel>),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn list_hotels(State(state): State<AppState>) -> Result<Json<Vec<Hotel>>, InventoryError> {
    let hotels = state.hotels.list_hotels().await?;
    Ok(Json(hotels))
}

/// Handler for GET /api/hotels/:id
#[utoipa::path(
    get,
    path = "/api/hotels/{id}",
    params(
        ("id" = i64, Path, description = "Hotel ID")
    ),
    responses(
        (status = 200, description = "Hotel found", body = Hotel),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Hotel>, InventoryError> {
    let hotel = state.hotels.get_hotel(id).await?;
    Ok(Json(hotel))
}

/// Handler for PUT /api/hotels/:id
/// Capacity may not drop below the rooms already allocated
#[utoipa::path(
    put,
    path = "/api/hotels/{id}",
    params(
        ("id" = i64, Path, description = "Hotel ID")
    ),
    request_body = UpdateHotelRequest,
    responses(
        (status = 200, description = "Hotel updated", body = Hotel),
        (status = 400, description = "Invalid input or capacity below allocated rooms", body = ErrorResponse),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 503, description = "Hotel is busy, retry later", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn update_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateHotelRequest>,
) -> Result<Json<Hotel>, InventoryError> {
    tracing::debug!("Updating hotel {}", id);

    let hotel = state.hotels.update_hotel(id, payload).await?;
    Ok(Json(hotel))
}

/// Handler for DELETE /api/hotels/:id
/// Removes the hotel and all of its room allocations
#[utoipa::path(
    delete,
    path = "/api/hotels/{id}",
    params(
        ("id" = i64, Path, description = "Hotel ID")
    ),
    responses(
        (status = 204, description = "Hotel deleted"),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse),
        (status = 503, description = "Hotel is busy, retry later", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn delete_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, InventoryError> {
    tracing::debug!("Deleting hotel {}", id);

    state.hotels.delete_hotel(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for GET /api/hotels/:id/allocation
/// Reports capacity, allocated and remaining rooms
#[utoipa::path(
    get,
    path = "/api/hotels/{id}/allocation",
    params(
        ("id" = i64, Path, description = "Hotel ID")
    ),
    responses(
        (status = 200, description = "Allocation summary", body = AllocationSummary),
        (status = 404, description = "Hotel not found", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "hotels"
)]
pub async fn get_hotel_allocation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AllocationSummary>, InventoryError> {
    let summary = state.inventory.allocation_summary(id).await?;
    Ok(Json(summary))
}
