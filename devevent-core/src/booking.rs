//! Booking records
//!
//! A booking ties one email address to one event. Normalization covers the
//! email; the event reference is only checked for presence here, existence
//! is checked against the event store by the persistence layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::email::normalize_email;
use crate::validation::{ValidationError, ValidationFailure};

/// Caller-supplied booking fields (also a patch on edit).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingInput {
    pub event_id: Option<String>,
    pub email: Option<String>,
}

/// Booking fields after normalization; the event reference is unverified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    /// Raw event reference as supplied, trimmed.
    pub event_id: String,
    /// Trimmed, lowercased address.
    pub email: String,
    /// Whether the referential check has to run.
    pub event_changed: bool,
}

/// Booking ready to be written once its event is confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    pub event_id: Uuid,
    pub email: String,
}

/// A persisted booking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Normalize and validate booking fields, merging over `previous` on edit.
///
/// # Example
/// ```
/// use devevent_core::booking::{prepare_booking, BookingInput};
///
/// let draft = prepare_booking(
///     BookingInput {
///         event_id: Some("6f1c4f1e-8c1a-4d4b-9d6e-1f2a3b4c5d6e".into()),
///         email: Some("  User@Example.COM ".into()),
///     },
///     None,
/// )
/// .unwrap();
/// assert_eq!(draft.email, "user@example.com");
/// assert!(draft.event_changed);
/// ```
pub fn prepare_booking(
    input: BookingInput,
    previous: Option<&Booking>,
) -> Result<BookingDraft, ValidationFailure> {
    let mut failure = ValidationFailure::new();

    let supplied_event = input
        .event_id
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty());
    let event_changed = match (&supplied_event, previous) {
        (Some(raw), Some(previous)) => {
            Uuid::parse_str(raw).map_or(true, |id| id != previous.event_id)
        }
        (None, Some(_)) => false,
        (_, None) => true,
    };
    let event_id = supplied_event.or_else(|| previous.map(|p| p.event_id.to_string()));
    if event_id.is_none() {
        failure.push(ValidationError::Required { field: "eventId" });
    }

    let email = match (input.email, previous) {
        (Some(raw), _) => normalize_email(&raw).map_err(|e| failure.push(e)).ok(),
        (None, Some(previous)) => Some(previous.email.clone()),
        (None, None) => {
            failure.push(ValidationError::Required { field: "email" });
            None
        }
    };

    match (event_id, email) {
        (Some(event_id), Some(email)) => failure.into_result(BookingDraft {
            event_id,
            email,
            event_changed,
        }),
        _ => Err(failure),
    }
}
