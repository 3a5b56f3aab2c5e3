//! Booking repository
//!
//! Bookings carry no foreign key; callers confirm the event exists before
//! writing. A repeated (event, email) pair is rejected by `uniq_event_email`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devevent_core::{Booking, NewBooking};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::BookingStore;

#[derive(Debug, Clone, FromRow)]
struct BookingRow {
    id: Uuid,
    event_id: Uuid,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookingRow> for Booking {
    fn from(row: BookingRow) -> Self {
        Self {
            id: row.id,
            event_id: row.event_id,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL-backed [`BookingStore`]
#[derive(Debug, Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, StoreError> {
        let row: BookingRow = sqlx::query_as(
            r#"
            INSERT INTO bookings (id, event_id, email)
            VALUES ($1, $2, $3)
            RETURNING id, event_id, email, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(booking.event_id)
        .bind(&booking.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NewBooking,
    ) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            UPDATE bookings SET event_id = $2, email = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, event_id, email, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(booking.event_id)
        .bind(&booking.email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, event_id, email, created_at, updated_at FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn find_booking(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Booking>, StoreError> {
        let row: Option<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, email, created_at, updated_at
            FROM bookings
            WHERE event_id = $1 AND email = $2
            "#,
        )
        .bind(event_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Booking::from))
    }

    async fn list_recent_bookings(
        &self,
        event_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Booking>, StoreError> {
        // Served by idx_bookings_event_created
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, email, created_at, updated_at
            FROM bookings
            WHERE event_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(event_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn list_bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        let rows: Vec<BookingRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, email, created_at, updated_at
            FROM bookings
            WHERE email = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Booking::from).collect())
    }

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
