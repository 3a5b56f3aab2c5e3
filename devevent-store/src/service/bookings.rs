use std::sync::Arc;

use devevent_core::email::normalize_email;
use devevent_core::{prepare_booking, Booking, BookingInput, NewBooking};
use uuid::Uuid;

use super::{log_store_error, store_error};
use crate::error::{Error, Result, StoreError};
use crate::store::{BookingStore, EventStore, BOOKING_EVENT_EMAIL_CONSTRAINT};

/// Default number of bookings returned by [`BookingService::recent_for_event`]
pub const DEFAULT_RECENT_LIMIT: u32 = 20;

/// Upper bound for [`BookingService::recent_for_event`]
pub const MAX_RECENT_LIMIT: u32 = 100;

/// Create, edit and read bookings.
///
/// Holds the event store as well, for the referential check.
#[derive(Clone)]
pub struct BookingService {
    events: Arc<dyn EventStore>,
    bookings: Arc<dyn BookingStore>,
}

impl BookingService {
    pub fn new(events: Arc<dyn EventStore>, bookings: Arc<dyn BookingStore>) -> Self {
        Self { events, bookings }
    }

    /// Validate, confirm the event exists, then persist.
    ///
    /// Nothing is written when validation or the referential check fails.
    pub async fn create(&self, input: BookingInput) -> Result<Booking> {
        let draft = prepare_booking(input, None)?;
        let event_id = self.confirm_event(&draft.event_id).await?;

        let booking = NewBooking {
            event_id,
            email: draft.email,
        };
        let created = self
            .bookings
            .insert_booking(&booking)
            .await
            .map_err(|e| duplicate_booking(e, &booking, "insert_booking"))?;

        tracing::info!(booking_id = %created.id, event_id = %created.event_id, "booking created");
        Ok(created)
    }

    /// Merge `patch` over a stored booking.
    ///
    /// The event is looked up again only when the reference changed.
    pub async fn update(&self, id: Uuid, patch: BookingInput) -> Result<Booking> {
        let current = self
            .bookings
            .find_booking_by_id(id)
            .await
            .map_err(|e| store_error(e, "find_booking_by_id"))?
            .ok_or_else(|| Error::not_found("booking", id))?;

        let draft = prepare_booking(patch, Some(&current))?;
        let event_id = if draft.event_changed {
            self.confirm_event(&draft.event_id).await?
        } else {
            current.event_id
        };

        let booking = NewBooking {
            event_id,
            email: draft.email,
        };
        let updated = self
            .bookings
            .update_booking(id, &booking)
            .await
            .map_err(|e| duplicate_booking(e, &booking, "update_booking"))?
            .ok_or_else(|| Error::not_found("booking", id))?;

        tracing::info!(booking_id = %updated.id, event_id = %updated.event_id, "booking updated");
        Ok(updated)
    }

    /// Resolve a raw event reference to an existing event's id.
    ///
    /// A malformed reference is an [`Error::EventLookup`], a store failure
    /// during the lookup is an [`Error::EventUnavailable`], and a well-formed
    /// reference to a missing event is an [`Error::EventNotFound`].
    pub async fn confirm_event(&self, raw: &str) -> Result<Uuid> {
        let id = Uuid::parse_str(raw.trim()).map_err(|e| Error::EventLookup {
            event_id: raw.to_owned(),
            reason: e.to_string(),
        })?;

        match self.events.find_event_by_id(id).await {
            Ok(Some(_)) => Ok(id),
            Ok(None) => {
                tracing::debug!(event_id = %id, "booking references missing event");
                Err(Error::EventNotFound { id })
            }
            Err(e) => {
                log_store_error("find_event_by_id", &e);
                Err(Error::EventUnavailable {
                    event_id: raw.to_owned(),
                    source: e,
                })
            }
        }
    }

    /// Newest bookings for an event, `limit` clamped to 1..=100.
    pub async fn recent_for_event(&self, event_id: Uuid, limit: u32) -> Result<Vec<Booking>> {
        let limit = limit.clamp(1, MAX_RECENT_LIMIT);
        self.bookings
            .list_recent_bookings(event_id, limit)
            .await
            .map_err(|e| store_error(e, "list_recent_bookings"))
    }

    /// The booking `email` holds for an event; the email is normalized first.
    pub async fn find(&self, event_id: Uuid, email: &str) -> Result<Booking> {
        let email = normalize_email(email)?;
        self.bookings
            .find_booking(event_id, &email)
            .await
            .map_err(|e| store_error(e, "find_booking"))?
            .ok_or_else(|| Error::not_found("booking", format!("{}/{}", event_id, email)))
    }

    pub async fn for_email(&self, email: &str) -> Result<Vec<Booking>> {
        let email = normalize_email(email)?;
        self.bookings
            .list_bookings_for_email(&email)
            .await
            .map_err(|e| store_error(e, "list_bookings_for_email"))
    }

    pub async fn count_for_event(&self, event_id: Uuid) -> Result<i64> {
        self.bookings
            .count_bookings(event_id)
            .await
            .map_err(|e| store_error(e, "count_bookings"))
    }
}

fn duplicate_booking(error: StoreError, booking: &NewBooking, operation: &'static str) -> Error {
    if error.is_unique_violation(BOOKING_EVENT_EMAIL_CONSTRAINT) {
        tracing::debug!(event_id = %booking.event_id, "duplicate booking rejected");
        return Error::DuplicateBooking {
            event_id: booking.event_id,
            email: booking.email.clone(),
        };
    }
    store_error(error, operation)
}
