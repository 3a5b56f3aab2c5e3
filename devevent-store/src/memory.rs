//! In-memory store
//!
//! Implements both store traits over plain vectors, enforcing the same
//! unique constraints as the PostgreSQL schema. Service tests run on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use devevent_core::{
    Booking, Event, EventFilter, EventRecord, NewBooking, Paginated, Pagination,
};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::{
    BookingStore, EventStore, BOOKING_EVENT_EMAIL_CONSTRAINT, EVENT_SLUG_CONSTRAINT,
};

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    bookings: Vec<Booking>,
}

/// Shared in-memory event and booking store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }

    pub async fn event_count(&self) -> usize {
        self.inner.read().await.events.len()
    }

    pub async fn booking_count(&self) -> usize {
        self.inner.read().await.bookings.len()
    }
}

fn unique_violation(constraint: &str) -> StoreError {
    StoreError::UniqueViolation {
        constraint: constraint.to_owned(),
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, record: &EventRecord) -> Result<Event, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;

        if inner.events.iter().any(|e| e.record.slug == record.slug) {
            return Err(unique_violation(EVENT_SLUG_CONSTRAINT));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            record: record.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        record: &EventRecord,
    ) -> Result<Option<Event>, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;

        // Like `UPDATE ... WHERE id = $1`: a missing row is not a conflict.
        let Some(index) = inner.events.iter().position(|e| e.id == id) else {
            return Ok(None);
        };
        if inner
            .events
            .iter()
            .any(|e| e.id != id && e.record.slug == record.slug)
        {
            return Err(unique_violation(EVENT_SLUG_CONSTRAINT));
        }

        let event = &mut inner.events[index];
        event.record = record.clone();
        event.updated_at = Utc::now();
        Ok(Some(event.clone()))
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|e| e.id == id).cloned())
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner.events.iter().find(|e| e.record.slug == slug).cloned())
    }

    async fn list_events(
        &self,
        filter: &EventFilter,
        page: Pagination,
    ) -> Result<Paginated<Event>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;

        let mut matching: Vec<&Event> = inner
            .events
            .iter()
            .filter(|e| filter.matches(&e.record))
            .collect();
        matching.sort_by(|a, b| {
            (&a.record.date, &a.record.time, a.created_at)
                .cmp(&(&b.record.date, &b.record.time, b.created_at))
        });

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn insert_booking(&self, booking: &NewBooking) -> Result<Booking, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;

        if inner
            .bookings
            .iter()
            .any(|b| b.event_id == booking.event_id && b.email == booking.email)
        {
            return Err(unique_violation(BOOKING_EVENT_EMAIL_CONSTRAINT));
        }

        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            event_id: booking.event_id,
            email: booking.email.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking(
        &self,
        id: Uuid,
        booking: &NewBooking,
    ) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        let mut inner = self.inner.write().await;

        let Some(index) = inner.bookings.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        if inner
            .bookings
            .iter()
            .any(|b| b.id != id && b.event_id == booking.event_id && b.email == booking.email)
        {
            return Err(unique_violation(BOOKING_EVENT_EMAIL_CONSTRAINT));
        }

        let stored = &mut inner.bookings[index];
        stored.event_id = booking.event_id;
        stored.email = booking.email.clone();
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn find_booking(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Booking>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.event_id == event_id && b.email == email)
            .cloned())
    }

    async fn list_recent_bookings(
        &self,
        event_id: Uuid,
        limit: u32,
    ) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;

        // Reverse insertion order breaks created_at ties newest-first.
        let mut bookings: Vec<Booking> = inner
            .bookings
            .iter()
            .rev()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings.truncate(limit as usize);
        Ok(bookings)
    }

    async fn list_bookings_for_email(&self, email: &str) -> Result<Vec<Booking>, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;

        let mut bookings: Vec<Booking> = inner
            .bookings
            .iter()
            .rev()
            .filter(|b| b.email == email)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn count_bookings(&self, event_id: Uuid) -> Result<i64, StoreError> {
        self.check_available()?;
        let inner = self.inner.read().await;
        Ok(inner.bookings.iter().filter(|b| b.event_id == event_id).count() as i64)
    }
}
