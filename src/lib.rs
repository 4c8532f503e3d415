pub mod config;
pub mod db;
pub mod error;
pub mod hotels;
pub mod inventory;
pub mod validation;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use error::ErrorResponse;
use hotels::{
    CreateHotelRequest, HotelDirectory, HotelRef, HotelService, PgHotelRepository,
    UpdateHotelRequest,
};
use inventory::ledger::{InventoryLedger, MemoryLedger, PgLedger};
use inventory::{
    Accommodation, AllocationSummary, CreateRoomRequest, InventoryEntry, InventoryService,
    RoomType, RoomWithHotel, TransactionCoordinator, UpdateRoomRequest,
};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        inventory::handlers::create_room,
        inventory::handlers::list_rooms,
        inventory::handlers::get_room,
        inventory::handlers::update_room,
        inventory::handlers::delete_room,
        hotels::handlers::create_hotel,
        hotels::handlers::list_hotels,
        hotels::handlers::get_hotel,
        hotels::handlers::update_hotel,
        hotels::handlers::delete_hotel,
        hotels::handlers::get_hotel_allocation,
    ),
    components(
        schemas(
            hotels::Hotel,
            HotelRef,
            CreateHotelRequest,
            UpdateHotelRequest,
            InventoryEntry,
            RoomWithHotel,
            CreateRoomRequest,
            UpdateRoomRequest,
            AllocationSummary,
            RoomType,
            Accommodation,
            ErrorResponse,
        )
    ),
    tags(
        (name = "rooms", description = "Room inventory allocation endpoints"),
        (name = "hotels", description = "Hotel registry endpoints")
    ),
    info(
        title = "Hotel Inventory API",
        version = "1.0.0",
        description = "Room allocation against hotel capacity, with per-hotel serialised writes"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub inventory: InventoryService,
    pub hotels: HotelService,
}

impl AppState {
    /// Wire both services over one coordinator so hotel writes and room
    /// allocations share a lock table.
    pub fn new(
        ledger: Arc<dyn InventoryLedger>,
        directory: Arc<dyn HotelDirectory>,
        lock_timeout: Duration,
    ) -> Self {
        let coordinator = TransactionCoordinator::new(ledger.clone(), lock_timeout);
        Self {
            inventory: InventoryService::new(ledger, directory.clone(), coordinator.clone()),
            hotels: HotelService::new(directory, coordinator),
        }
    }

    pub fn postgres(pool: db::DbPool, lock_timeout: Duration) -> Self {
        Self::new(
            Arc::new(PgLedger::new(pool.clone(), lock_timeout)),
            Arc::new(PgHotelRepository::new(pool)),
            lock_timeout,
        )
    }

    pub fn in_memory(lock_timeout: Duration) -> Self {
        let ledger = MemoryLedger::new();
        Self::new(Arc::new(ledger.clone()), Arc::new(ledger), lock_timeout)
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and request tracing
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Room inventory
        .route(
            "/api/rooms",
            post(inventory::create_room).get(inventory::list_rooms),
        )
        .route(
            "/api/rooms/:id",
            get(inventory::get_room)
                .put(inventory::update_room)
                .delete(inventory::delete_room),
        )
        // Hotels
        .route(
            "/api/hotels",
            post(hotels::create_hotel).get(hotels::list_hotels),
        )
        .route(
            "/api/hotels/:id",
            get(hotels::get_hotel)
                .put(hotels::update_hotel)
                .delete(hotels::delete_hotel),
        )
        .route(
            "/api/hotels/:id/allocation",
            get(hotels::get_hotel_allocation),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests;
