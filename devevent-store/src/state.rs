//! Services shared across callers

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{PgBookingStore, PgEventStore};
use crate::memory::MemoryStore;
use crate::service::{BookingService, EventService};

/// Event and booking services over one store
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    events: EventService,
    bookings: BookingService,
}

impl AppState {
    /// Services backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        let events = Arc::new(PgEventStore::new(pool.clone()));
        let bookings = Arc::new(PgBookingStore::new(pool));
        Self::from_parts(
            EventService::new(events.clone()),
            BookingService::new(events, bookings),
        )
    }

    /// Services backed by a fresh [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::with_memory(MemoryStore::new())
    }

    pub fn with_memory(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        Self::from_parts(
            EventService::new(store.clone()),
            BookingService::new(store.clone(), store),
        )
    }

    fn from_parts(events: EventService, bookings: BookingService) -> Self {
        Self {
            inner: Arc::new(AppStateInner { events, bookings }),
        }
    }

    pub fn events(&self) -> &EventService {
        &self.inner.events
    }

    pub fn bookings(&self) -> &BookingService {
        &self.inner.bookings
    }
}
