//! Error types for devevent-store
//!
//! [`StoreError`] is what a store implementation reports. [`Error`] is what
//! a persistence operation reports to its caller; each variant carries a
//! human-readable message and maps to an [`ErrorKind`].

use devevent_core::{ValidationError, ValidationFailure};
use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::connection::ConnectionError;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported at the store boundary
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write
    #[error("unique constraint '{constraint}' violated")]
    UniqueViolation { constraint: String },

    /// Store could not be reached
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored row could not be decoded into a record
    #[error("invalid stored value: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn is_unique_violation(&self, name: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint } if constraint == name)
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                Self::UniqueViolation {
                    constraint: db_err.constraint().unwrap_or_default().to_owned(),
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(e.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// Broad category of an operation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required setting missing or malformed
    Configuration,
    /// Store unreachable while connecting
    Connection,
    /// Required, length, enum or non-empty constraint violated
    Validation,
    /// Malformed date, time or email string, or malformed event reference
    Format,
    /// Booking references an event that does not exist
    Referential,
    /// Duplicate slug or duplicate (event, email) booking
    Conflict,
    /// Record addressed by id or slug does not exist
    NotFound,
    /// Store failed or was unreachable during an operation
    Store,
}

/// Operation-level error
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("Event with ID {id} does not exist")]
    EventNotFound { id: Uuid },

    /// Event reference is not a well-formed id
    #[error("Invalid event ID format '{event_id}': {reason}")]
    EventLookup { event_id: String, reason: String },

    /// Event store failed while checking the reference
    #[error("Could not check event '{event_id}': {source}")]
    EventUnavailable {
        event_id: String,
        #[source]
        source: StoreError,
    },

    #[error("{email} has already booked event {event_id}")]
    DuplicateBooking { event_id: Uuid, email: String },

    #[error("an event with slug '{slug}' already exists")]
    DuplicateSlug { slug: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::Connection(_) => ErrorKind::Connection,
            Self::Validation(failure) if failure.errors().iter().all(ValidationError::is_format) => {
                ErrorKind::Format
            }
            Self::Validation(_) => ErrorKind::Validation,
            Self::EventLookup { .. } => ErrorKind::Format,
            Self::EventUnavailable { .. } => ErrorKind::Store,
            Self::EventNotFound { .. } => ErrorKind::Referential,
            Self::DuplicateBooking { .. } | Self::DuplicateSlug { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(_) => ErrorKind::Store,
        }
    }

    /// Field violations, when this is a validation failure.
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}

impl From<ValidationFailure> for Error {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl From<ValidationError> for Error {
    fn from(error: ValidationError) -> Self {
        Self::Validation(error.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds() {
        let id = Uuid::new_v4();
        assert_eq!(Error::EventNotFound { id }.kind(), ErrorKind::Referential);
        assert_eq!(
            Error::EventLookup {
                event_id: "x".into(),
                reason: "malformed".into()
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(
            Error::DuplicateBooking {
                event_id: id,
                email: "a@b.io".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            Error::from(ConfigError::MissingDatabaseUrl).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(Error::not_found("event", id).kind(), ErrorKind::NotFound);
    }

    #[test]
    fn lookup_failures_are_told_apart() {
        let malformed = Error::EventLookup {
            event_id: "nope".into(),
            reason: "invalid character".into(),
        };
        let unavailable = Error::EventUnavailable {
            event_id: Uuid::new_v4().to_string(),
            source: StoreError::Unavailable("pool timed out".into()),
        };
        assert_eq!(malformed.kind(), ErrorKind::Format);
        assert_eq!(unavailable.kind(), ErrorKind::Store);
        assert!(unavailable.to_string().contains("pool timed out"));
    }

    #[test]
    fn validation_kind_depends_on_contents() {
        let format_only = Error::from(ValidationError::InvalidFormat {
            field: "time",
            reason: "bad",
        });
        assert_eq!(format_only.kind(), ErrorKind::Format);

        let mut mixed = ValidationFailure::new();
        mixed.push(ValidationError::Required { field: "title" });
        mixed.push(ValidationError::InvalidFormat {
            field: "date",
            reason: "bad",
        });
        let mixed = Error::from(mixed);
        assert_eq!(mixed.kind(), ErrorKind::Validation);
        assert_eq!(mixed.validation().map(ValidationFailure::len), Some(2));
    }

    #[test]
    fn referential_message_names_id() {
        let id = Uuid::new_v4();
        let message = Error::EventNotFound { id }.to_string();
        assert_eq!(message, format!("Event with ID {} does not exist", id));
    }

    #[test]
    fn unique_violation_matches_by_name() {
        let err = StoreError::UniqueViolation {
            constraint: "uniq_event_email".into(),
        };
        assert!(err.is_unique_violation("uniq_event_email"));
        assert!(!err.is_unique_violation("uniq_event_slug"));
    }
}
