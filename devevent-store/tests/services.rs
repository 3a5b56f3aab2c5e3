use std::sync::Arc;

use async_trait::async_trait;
use devevent_core::{
    BookingInput, Event, EventChanges, EventFilter, EventInput, EventMode, EventRecord, Paginated,
    Pagination,
};
use devevent_store::store::EVENT_SLUG_CONSTRAINT;
use devevent_store::{AppState, Error, ErrorKind, EventService, EventStore, MemoryStore, StoreError};
use uuid::Uuid;

fn workshop() -> EventInput {
    EventInput {
        title: Some("My Workshop!".into()),
        description: Some("Hands-on session".into()),
        overview: Some("Build a parser".into()),
        image: Some("https://example.com/w.png".into()),
        venue: Some("Lab 3".into()),
        location: Some("Lisbon".into()),
        date: Some("March 5, 2026".into()),
        time: Some("2:30 PM".into()),
        mode: Some("hybrid".into()),
        audience: Some("Developers".into()),
        agenda: Some(vec!["Intro".into(), "Hacking".into()]),
        organizer: Some("Rust Lisbon".into()),
        tags: Some(vec!["rust".into(), "parsers".into()]),
    }
}

fn booking(event_id: impl ToString, email: &str) -> BookingInput {
    BookingInput {
        event_id: Some(event_id.to_string()),
        email: Some(email.into()),
    }
}

#[tokio::test]
async fn create_event_normalizes_fields() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();

    assert!(event.record.slug.starts_with("my-workshop-"));
    assert_eq!(event.record.date, "2026-03-05");
    assert_eq!(event.record.time, "14:30");
    assert_eq!(event.record.mode, EventMode::Hybrid);

    let by_slug = state.events().get_by_slug(&event.record.slug).await.unwrap();
    assert_eq!(by_slug.id, event.id);
}

#[tokio::test]
async fn invalid_event_reports_every_field() {
    let state = AppState::in_memory();
    let input = EventInput {
        title: Some("x".repeat(101)),
        agenda: None,
        tags: Some(vec![]),
        ..workshop()
    };

    let err = state.events().create(input).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    let failure = err.validation().unwrap();
    assert!(failure.contains("title"));
    assert!(failure.contains("agenda"));
    assert!(failure.contains("tags"));
}

#[tokio::test]
async fn update_keeps_slug_unless_title_changes() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();

    let moved = state
        .events()
        .update(
            event.id,
            EventInput {
                venue: Some("Lab 4".into()),
                time: Some("9:05".into()),
                ..EventInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.record.slug, event.record.slug);
    assert_eq!(moved.record.venue, "Lab 4");
    assert_eq!(moved.record.time, "09:05");

    let renamed = state
        .events()
        .update(
            event.id,
            EventInput {
                title: Some("Parser Night".into()),
                ..EventInput::default()
            },
        )
        .await
        .unwrap();
    assert!(renamed.record.slug.starts_with("parser-night-"));
}

#[tokio::test]
async fn update_with_no_changes_returns_stored_event() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();

    let same = state
        .events()
        .update_with(event.id, EventInput::default(), EventChanges::none())
        .await
        .unwrap();
    assert_eq!(same, event);
}

#[tokio::test]
async fn stated_changes_cannot_skip_date_and_time_normalization() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();
    let venue_only = EventChanges::none().with("venue");

    let err = state
        .events()
        .update_with(
            event.id,
            EventInput {
                date: Some("someday".into()),
                time: Some("7pm-ish".into()),
                venue: Some("Annex".into()),
                ..EventInput::default()
            },
            venue_only.clone(),
        )
        .await
        .unwrap_err();
    let failure = err.validation().unwrap();
    assert!(failure.contains("date"));
    assert!(failure.contains("time"));

    let stored = state.events().get(event.id).await.unwrap();
    assert_eq!(stored.record.date, "2026-03-05");
    assert_eq!(stored.record.time, "14:30");

    let moved = state
        .events()
        .update_with(
            event.id,
            EventInput {
                time: Some("9:05 am".into()),
                ..EventInput::default()
            },
            EventChanges::none(),
        )
        .await
        .unwrap();
    assert_eq!(moved.record.time, "09:05");
}

#[tokio::test]
async fn update_missing_event_is_not_found() {
    let state = AppState::in_memory();
    let err = state
        .events()
        .update(Uuid::new_v4(), workshop())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn list_filters_by_normalized_date_and_mode() {
    let state = AppState::in_memory();
    state.events().create(workshop()).await.unwrap();
    state
        .events()
        .create(EventInput {
            mode: Some("online".into()),
            date: Some("2026-03-06".into()),
            ..workshop()
        })
        .await
        .unwrap();

    let page = state
        .events()
        .list(
            EventFilter {
                date: Some("03/05/2026".into()),
                mode: Some(EventMode::Hybrid),
            },
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].record.date, "2026-03-05");

    let err = state
        .events()
        .list(
            EventFilter {
                date: Some("someday".into()),
                mode: None,
            },
            Pagination::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[tokio::test]
async fn duplicate_booking_is_case_insensitive_conflict() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();

    let first = state
        .bookings()
        .create(booking(event.id, "  Ada@Example.com "))
        .await
        .unwrap();
    assert_eq!(first.email, "ada@example.com");

    let err = state
        .bookings()
        .create(booking(event.id, "ADA@example.COM"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, Error::DuplicateBooking { .. }));
    assert_eq!(state.bookings().count_for_event(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn booking_for_missing_event_is_referential_and_not_persisted() {
    let store = MemoryStore::new();
    let state = AppState::with_memory(store.clone());
    let missing = Uuid::new_v4();

    let err = state
        .bookings()
        .create(booking(missing, "ada@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Referential);
    assert_eq!(
        err.to_string(),
        format!("Event with ID {} does not exist", missing)
    );
    assert_eq!(store.booking_count().await, 0);
}

#[tokio::test]
async fn malformed_event_reference_is_lookup_error() {
    let state = AppState::in_memory();
    let err = state
        .bookings()
        .create(booking("not-a-uuid", "ada@example.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EventLookup { .. }));
    assert_ne!(err.kind(), ErrorKind::Referential);
}

#[tokio::test]
async fn unavailable_store_is_distinct_from_missing_event() {
    let store = MemoryStore::new();
    let state = AppState::with_memory(store.clone());
    store.set_unavailable(true);

    let err = state
        .bookings()
        .create(booking(Uuid::new_v4(), "ada@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EventUnavailable { .. }));
    assert_eq!(err.kind(), ErrorKind::Store);
}

#[tokio::test]
async fn invalid_booking_fields_fail_before_lookup() {
    let store = MemoryStore::new();
    let state = AppState::with_memory(store.clone());
    store.set_unavailable(true);

    let err = state
        .bookings()
        .create(booking(Uuid::new_v4(), "not-an-email"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert!(err.validation().unwrap().contains("email"));
}

#[tokio::test]
async fn booking_update_rechecks_only_changed_event() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();
    let created = state
        .bookings()
        .create(booking(event.id, "ada@example.com"))
        .await
        .unwrap();

    let renamed = state
        .bookings()
        .update(
            created.id,
            BookingInput {
                email: Some("Grace@Example.com".into()),
                ..BookingInput::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.email, "grace@example.com");
    assert_eq!(renamed.event_id, event.id);

    let err = state
        .bookings()
        .update(created.id, booking(Uuid::new_v4(), "grace@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Referential);
}

#[tokio::test]
async fn booking_reads() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();
    for email in ["a@x.io", "b@x.io", "c@x.io"] {
        state.bookings().create(booking(event.id, email)).await.unwrap();
    }

    let recent = state.bookings().recent_for_event(event.id, 0).await.unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].email, "c@x.io");

    let mine = state.bookings().for_email("  B@X.io").await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(state.bookings().count_for_event(event.id).await.unwrap(), 3);

    let found = state.bookings().find(event.id, " A@X.IO ").await.unwrap();
    assert_eq!(found.email, "a@x.io");
    let err = state
        .bookings()
        .find(event.id, "z@x.io")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// Event store whose slug index rejects every insert.
struct SlugClash;

#[async_trait]
impl EventStore for SlugClash {
    async fn insert_event(&self, _record: &EventRecord) -> Result<Event, StoreError> {
        Err(StoreError::UniqueViolation {
            constraint: EVENT_SLUG_CONSTRAINT.into(),
        })
    }

    async fn update_event(
        &self,
        _id: Uuid,
        _record: &EventRecord,
    ) -> Result<Option<Event>, StoreError> {
        Ok(None)
    }

    async fn find_event_by_id(&self, _id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(None)
    }

    async fn find_event_by_slug(&self, _slug: &str) -> Result<Option<Event>, StoreError> {
        Ok(None)
    }

    async fn list_events(
        &self,
        _filter: &EventFilter,
        page: Pagination,
    ) -> Result<Paginated<Event>, StoreError> {
        Ok(Paginated {
            items: vec![],
            total: 0,
            page: page.page,
            per_page: page.per_page,
        })
    }
}

#[tokio::test]
async fn slug_clash_is_conflict() {
    let events = EventService::new(Arc::new(SlugClash));
    let err = events.create(workshop()).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    match err {
        Error::DuplicateSlug { slug } => assert!(slug.starts_with("my-workshop-")),
        other => panic!("expected DuplicateSlug, got {:?}", other),
    }
}

#[tokio::test]
async fn booking_update_onto_taken_pair_is_conflict() {
    let state = AppState::in_memory();
    let event = state.events().create(workshop()).await.unwrap();
    state
        .bookings()
        .create(booking(event.id, "ada@example.com"))
        .await
        .unwrap();
    let second = state
        .bookings()
        .create(booking(event.id, "grace@example.com"))
        .await
        .unwrap();

    let err = state
        .bookings()
        .update(
            second.id,
            BookingInput {
                email: Some("ADA@example.com".into()),
                ..BookingInput::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(matches!(err, Error::DuplicateBooking { .. }));

    let kept = state
        .bookings()
        .find(event.id, "grace@example.com")
        .await
        .unwrap();
    assert_eq!(kept.id, second.id);
}
