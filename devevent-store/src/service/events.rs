use std::sync::Arc;

use devevent_core::{
    prepare_event, prepare_event_with, Event, EventChanges, EventFilter, EventInput, Paginated,
    Pagination,
};
use uuid::Uuid;

use super::store_error;
use crate::error::{Error, Result, StoreError};
use crate::store::{EventStore, EVENT_SLUG_CONSTRAINT};

/// Create, edit and read events.
#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    /// Validate and persist a new event.
    ///
    /// The slug is derived from the title and the date and time are
    /// normalized. Every field violation is reported together.
    pub async fn create(&self, input: EventInput) -> Result<Event> {
        let record = prepare_event(input, None)?;

        let event = self
            .store
            .insert_event(&record)
            .await
            .map_err(|e| slug_conflict(e, &record.slug, "insert_event"))?;

        tracing::info!(
            event_id = %event.id,
            slug = %event.record.slug,
            date = %event.record.date,
            "event created"
        );
        Ok(event)
    }

    /// Merge `patch` over the stored event, diffing to find changed fields.
    pub async fn update(&self, id: Uuid, patch: EventInput) -> Result<Event> {
        let current = self.get(id).await?;
        let changes = EventChanges::between(&patch, &current.record);
        self.apply_update(current, patch, changes).await
    }

    /// Merge `patch` over the stored event with caller-stated changes.
    ///
    /// Fields the patch supplies with a new value count as changed too.
    pub async fn update_with(
        &self,
        id: Uuid,
        patch: EventInput,
        changes: EventChanges,
    ) -> Result<Event> {
        let current = self.get(id).await?;
        let changes = changes.union(&EventChanges::between(&patch, &current.record));
        self.apply_update(current, patch, changes).await
    }

    async fn apply_update(
        &self,
        current: Event,
        patch: EventInput,
        changes: EventChanges,
    ) -> Result<Event> {
        if changes.is_empty() {
            tracing::debug!(event_id = %current.id, "event update has no changes");
            return Ok(current);
        }

        let record = prepare_event_with(patch, Some(&current.record), &changes)?;

        let updated = self
            .store
            .update_event(current.id, &record)
            .await
            .map_err(|e| slug_conflict(e, &record.slug, "update_event"))?
            .ok_or_else(|| Error::not_found("event", current.id))?;

        tracing::info!(
            event_id = %updated.id,
            changed = ?changes.iter().collect::<Vec<_>>(),
            "event updated"
        );
        Ok(updated)
    }

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        self.store
            .find_event_by_id(id)
            .await
            .map_err(|e| store_error(e, "find_event_by_id"))?
            .ok_or_else(|| Error::not_found("event", id))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Event> {
        let slug = slug.trim();
        self.store
            .find_event_by_slug(slug)
            .await
            .map_err(|e| store_error(e, "find_event_by_slug"))?
            .ok_or_else(|| Error::not_found("event", slug))
    }

    /// Events ordered by date then time; the filter date is normalized first.
    pub async fn list(&self, filter: EventFilter, page: Pagination) -> Result<Paginated<Event>> {
        let filter = filter.normalized()?;
        self.store
            .list_events(&filter, page)
            .await
            .map_err(|e| store_error(e, "list_events"))
    }
}

fn slug_conflict(error: StoreError, slug: &str, operation: &'static str) -> Error {
    if error.is_unique_violation(EVENT_SLUG_CONSTRAINT) {
        tracing::warn!(slug, "slug collision");
        return Error::DuplicateSlug {
            slug: slug.to_owned(),
        };
    }
    store_error(error, operation)
}
