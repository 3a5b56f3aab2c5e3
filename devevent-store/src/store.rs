//! Store boundary
//!
//! The persistence operations only need create, read by id or predicate,
//! and writes that fail distinctly on a unique constraint. Both the
//! PostgreSQL repositories and the in-memory store implement these traits.

use async_trait::async_trait;
use devevent_core::{
    Booking, Event, EventFilter, EventRecord, NewBooking, Paginated, Pagination,
};
use uuid::Uuid;

use crate::error::StoreError;

/// Unique index on `events.slug`
pub const EVENT_SLUG_CONSTRAINT: &str = "uniq_event_slug";

/// Unique index on `bookings (event_id, email)`
pub const BOOKING_EVENT_EMAIL_CONSTRAINT: &str = "uniq_event_email";

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Insert a new event; fails with [`EVENT_SLUG_CONSTRAINT`] on a slug clash.
    async fn insert_event(&self, record: &EventRecord) -> Result<Event, StoreError>;

    /// Replace all fields of an event, refreshing `updated_at`.
    ///
    /// Returns `None` when no event has this id.
    async fn update_event(&self, id: Uuid, record: &EventRecord)
        -> Result<Option<Event>, StoreError>;

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError>;

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError>;

    /// Events matching `filter`, ordered by date then time.
    async fn list_events(
        &self,
        filter: &EventFilter,
        page: Pagination,
    ) -> Result<Paginated<Event>, StoreError>;
}

#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Insert a booking; fails with [`BOOKING_EVENT_EMAIL_CONSTRAINT`] on a repeat.
    async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, StoreError>;

    /// Replace a booking's event and email, refreshing `updated_at`.
    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NewBooking,
    ) -> Result<Option<Booking>, StoreError>;

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    async fn find_booking(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Booking>, StoreError>;

    /// Newest bookings for an event first.
    async fn list_recent_bookings(
        &self,
        event_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Booking>, StoreError>;

    async fn list_bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError>;

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, StoreError>;
}
