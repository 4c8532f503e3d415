use hotel_inventory::config::{AppConfig, StorageBackend};
use hotel_inventory::{create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // RUST_LOG controls verbosity, e.g. RUST_LOG=hotel_inventory=debug,tower_http=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Hotel Inventory API - Starting...");

    let config = AppConfig::from_env().expect("Invalid configuration");

    let state = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .expect("DATABASE_URL must be set in environment");

            tracing::info!("Connecting to database...");
            let db_pool = db::create_pool(
                database_url,
                config.db_max_connections,
                config.db_acquire_timeout,
            )
            .await
            .expect("Failed to create database pool");

            db::run_migrations(&db_pool)
                .await
                .expect("Failed to run database migrations");

            AppState::postgres(db_pool, config.hotel_lock_timeout)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            AppState::in_memory(config.hotel_lock_timeout)
        }
    };

    let app = create_router(state);

    // Start the Axum server
    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Hotel Inventory API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}
