use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::InventoryError;
use crate::hotels::{CreateHotelRequest, Hotel};

pub(crate) const HOTEL_COLUMNS: &str =
    "id, name, tax_id, address, city, total_room_capacity, created_at, updated_at";

/// Hotel lookups and registration
///
/// Capacity changes and deletion are not here: they go through the
/// transaction coordinator so they serialise with inventory mutations.
#[async_trait]
pub trait HotelDirectory: Send + Sync {
    async fn find_by_id(&self, hotel_id: i64) -> Result<Option<Hotel>, InventoryError>;

    async fn list(&self) -> Result<Vec<Hotel>, InventoryError>;

    async fn create(&self, request: &CreateHotelRequest) -> Result<Hotel, InventoryError>;
}

/// Repository for database operations on hotels
#[derive(Clone)]
pub struct PgHotelRepository {
    pool: PgPool,
}

impl PgHotelRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HotelDirectory for PgHotelRepository {
    async fn find_by_id(&self, hotel_id: i64) -> Result<Option<Hotel>, InventoryError> {
        let hotel = sqlx::query_as::<_, Hotel>(&format!(
            "SELECT {} FROM hotels WHERE id = $1",
            HOTEL_COLUMNS
        ))
        .bind(hotel_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(hotel)
    }

    async fn list(&self) -> Result<Vec<Hotel>, InventoryError> {
        let hotels = sqlx::query_as::<_, Hotel>(&format!(
            "SELECT {} FROM hotels ORDER BY id",
            HOTEL_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(hotels)
    }

    async fn create(&self, request: &CreateHotelRequest) -> Result<Hotel, InventoryError> {
        let hotel = sqlx::query_as::<_, Hotel>(&format!(
            r#"
            INSERT INTO hotels (name, tax_id, address, city, total_room_capacity)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            HOTEL_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.tax_id)
        .bind(&request.address)
        .bind(&request.city)
        .bind(request.total_room_capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(hotel)
    }
}
