//! PostgreSQL inventory ledger.
//!
//! Per-hotel exclusivity across processes comes from `SELECT ... FOR UPDATE`
//! on the hotel row, bounded by `SET LOCAL lock_timeout`. The schema carries
//! the same uniqueness, compatibility and cascade rules as the validator, so
//! a bypassed check still cannot commit a violating row.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{InventoryLedger, LedgerResult, LedgerTransaction};
use crate::error::InventoryError;
use crate::hotels::{Hotel, HotelRef, UpdateHotelRequest, HOTEL_COLUMNS};
use crate::inventory::{
    Accommodation, Allocation, InventoryEntry, NewAllocation, RoomType, RoomWithHotel,
};

/// SQLSTATE raised when `lock_timeout` expires.
const LOCK_NOT_AVAILABLE: &str = "55P03";

/// Table constraint encoding the room type / accommodation table
const COMPATIBILITY_CONSTRAINT: &str = "room_inventory_compatible";

const ENTRY_COLUMNS: &str =
    "id, hotel_id, room_type, accommodation, quantity, created_at, updated_at";

/// Joined row for entries listed with their hotel
#[derive(Debug, FromRow)]
struct RoomHotelRow {
    id: i64,
    hotel_id: i64,
    room_type: RoomType,
    accommodation: Accommodation,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    hotel_name: String,
    hotel_city: String,
    hotel_capacity: i32,
}

impl From<RoomHotelRow> for RoomWithHotel {
    fn from(row: RoomHotelRow) -> Self {
        Self {
            id: row.id,
            hotel_id: row.hotel_id,
            room_type: row.room_type,
            accommodation: row.accommodation,
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
            hotel: HotelRef {
                id: row.hotel_id,
                name: row.hotel_name,
                city: row.hotel_city,
                total_room_capacity: row.hotel_capacity,
            },
        }
    }
}

const ROOM_WITH_HOTEL_SELECT: &str = r#"
    SELECT r.id, r.hotel_id, r.room_type, r.accommodation, r.quantity,
           r.created_at, r.updated_at,
           h.name AS hotel_name, h.city AS hotel_city,
           h.total_room_capacity AS hotel_capacity
    FROM room_inventory r
    JOIN hotels h ON h.id = r.hotel_id
"#;

/// Map a failed entry write onto the rule it violated
fn map_write_error(
    error: sqlx::Error,
    hotel_id: i64,
    room_type: RoomType,
    accommodation: Accommodation,
) -> InventoryError {
    if let Some(db_error) = error.as_database_error() {
        if db_error.is_unique_violation() {
            return InventoryError::DuplicateAllocation {
                hotel_id,
                room_type,
                accommodation,
            };
        }
        if db_error.is_foreign_key_violation() {
            return InventoryError::HotelNotFound(hotel_id);
        }
        if db_error.is_check_violation() {
            return check_violation(db_error.constraint(), room_type, accommodation);
        }
    }
    error.into()
}

fn check_violation(
    constraint: Option<&str>,
    room_type: RoomType,
    accommodation: Accommodation,
) -> InventoryError {
    match constraint {
        Some(COMPATIBILITY_CONSTRAINT) => InventoryError::IncompatibleAccommodation {
            room_type,
            accommodation,
        },
        Some(name) => InventoryError::Validation(format!("constraint {} violated", name)),
        None => InventoryError::StorageFailure("unnamed check constraint violated".to_string()),
    }
}

fn map_lock_error(error: sqlx::Error, hotel_id: i64) -> InventoryError {
    let timed_out = error
        .as_database_error()
        .and_then(|db_error| db_error.code())
        .map(|code| code == LOCK_NOT_AVAILABLE)
        .unwrap_or(false);

    if timed_out {
        InventoryError::LockTimeout { hotel_id }
    } else {
        error.into()
    }
}

/// Ledger stored in PostgreSQL
#[derive(Clone)]
pub struct PgLedger {
    pool: PgPool,
    lock_timeout: Duration,
}

impl PgLedger {
    /// Create a new PgLedger
    ///
    /// `lock_timeout` bounds how long a transaction waits for a hotel row lock.
    pub fn new(pool: PgPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }
}

/// Open transaction against a [`PgLedger`]
///
/// Dropping it without commit rolls back.
pub struct PgLedgerTransaction {
    tx: Transaction<'static, Postgres>,
    lock_timeout: Duration,
}

#[async_trait]
impl LedgerTransaction for PgLedgerTransaction {
    async fn lock_hotel(&mut self, hotel_id: i64) -> LedgerResult<Option<Hotel>> {
        // SET does not accept bind parameters; the value is an integer we format ourselves.
        let set_timeout = format!(
            "SET LOCAL lock_timeout = '{}ms'",
            self.lock_timeout.as_millis()
        );
        sqlx::query(&set_timeout).execute(&mut *self.tx).await?;

        let hotel = sqlx::query_as::<_, Hotel>(&format!(
            "SELECT {} FROM hotels WHERE id = $1 FOR UPDATE",
            HOTEL_COLUMNS
        ))
        .bind(hotel_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(|e| map_lock_error(e, hotel_id))?;

        Ok(hotel)
    }

    async fn current_total(&mut self, hotel_id: i64) -> LedgerResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM room_inventory WHERE hotel_id = $1",
        )
        .bind(hotel_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(total)
    }

    async fn find_entry(&mut self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>> {
        let entry = sqlx::query_as::<_, InventoryEntry>(&format!(
            "SELECT {} FROM room_inventory WHERE id = $1 FOR UPDATE",
            ENTRY_COLUMNS
        ))
        .bind(entry_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn find_by_type_and_accommodation(
        &mut self,
        hotel_id: i64,
        room_type: RoomType,
        accommodation: Accommodation,
    ) -> LedgerResult<Option<InventoryEntry>> {
        let entry = sqlx::query_as::<_, InventoryEntry>(&format!(
            r#"
            SELECT {}
            FROM room_inventory
            WHERE hotel_id = $1 AND room_type = $2 AND accommodation = $3
            "#,
            ENTRY_COLUMNS
        ))
        .bind(hotel_id)
        .bind(room_type)
        .bind(accommodation)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(entry)
    }

    async fn insert(&mut self, allocation: NewAllocation) -> LedgerResult<InventoryEntry> {
        sqlx::query_as::<_, InventoryEntry>(&format!(
            r#"
            INSERT INTO room_inventory (hotel_id, room_type, accommodation, quantity)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(allocation.hotel_id)
        .bind(allocation.room_type)
        .bind(allocation.accommodation)
        .bind(allocation.quantity)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(
                e,
                allocation.hotel_id,
                allocation.room_type,
                allocation.accommodation,
            )
        })
    }

    async fn update(
        &mut self,
        entry_id: i64,
        allocation: Allocation,
    ) -> LedgerResult<InventoryEntry> {
        let hotel_id: Option<i64> =
            sqlx::query_scalar("SELECT hotel_id FROM room_inventory WHERE id = $1")
                .bind(entry_id)
                .fetch_optional(&mut *self.tx)
                .await?;
        let hotel_id = hotel_id.ok_or(InventoryError::RoomNotFound(entry_id))?;

        sqlx::query_as::<_, InventoryEntry>(&format!(
            r#"
            UPDATE room_inventory
            SET room_type = $1,
                accommodation = $2,
                quantity = $3,
                updated_at = NOW()
            WHERE id = $4
            RETURNING {}
            "#,
            ENTRY_COLUMNS
        ))
        .bind(allocation.room_type)
        .bind(allocation.accommodation)
        .bind(allocation.quantity)
        .bind(entry_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| {
            map_write_error(e, hotel_id, allocation.room_type, allocation.accommodation)
        })
    }

    async fn delete(&mut self, entry_id: i64) -> LedgerResult<bool> {
        let result = sqlx::query("DELETE FROM room_inventory WHERE id = $1")
            .bind(entry_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_hotel(
        &mut self,
        hotel_id: i64,
        changes: &UpdateHotelRequest,
    ) -> LedgerResult<Hotel> {
        sqlx::query_as::<_, Hotel>(&format!(
            r#"
            UPDATE hotels
            SET name = COALESCE($1, name),
                tax_id = COALESCE($2, tax_id),
                address = COALESCE($3, address),
                city = COALESCE($4, city),
                total_room_capacity = COALESCE($5, total_room_capacity),
                updated_at = NOW()
            WHERE id = $6
            RETURNING {}
            "#,
            HOTEL_COLUMNS
        ))
        .bind(&changes.name)
        .bind(&changes.tax_id)
        .bind(&changes.address)
        .bind(&changes.city)
        .bind(changes.total_room_capacity)
        .bind(hotel_id)
        .fetch_optional(&mut *self.tx)
        .await?
        .ok_or(InventoryError::HotelNotFound(hotel_id))
    }

    async fn delete_hotel(&mut self, hotel_id: i64) -> LedgerResult<bool> {
        // room_inventory rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM hotels WHERE id = $1")
            .bind(hotel_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> LedgerResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryLedger for PgLedger {
    async fn begin(&self) -> LedgerResult<Box<dyn LedgerTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTransaction {
            tx,
            lock_timeout: self.lock_timeout,
        }))
    }

    async fn find_entry(&self, entry_id: i64) -> LedgerResult<Option<InventoryEntry>> {
        let entry = sqlx::query_as::<_, InventoryEntry>(&format!(
            "SELECT {} FROM room_inventory WHERE id = $1",
            ENTRY_COLUMNS
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn find_entry_with_hotel(&self, entry_id: i64) -> LedgerResult<Option<RoomWithHotel>> {
        let row = sqlx::query_as::<_, RoomHotelRow>(&format!(
            "{} WHERE r.id = $1",
            ROOM_WITH_HOTEL_SELECT
        ))
        .bind(entry_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RoomWithHotel::from))
    }

    async fn list_entries_with_hotel(&self) -> LedgerResult<Vec<RoomWithHotel>> {
        let rows = sqlx::query_as::<_, RoomHotelRow>(&format!(
            "{} ORDER BY r.id",
            ROOM_WITH_HOTEL_SELECT
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RoomWithHotel::from).collect())
    }

    async fn current_total(&self, hotel_id: i64) -> LedgerResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM room_inventory WHERE hotel_id = $1",
        )
        .bind(hotel_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
