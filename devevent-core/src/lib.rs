//! devevent-core: event and booking domain model
//!
//! Pure data layer: record shapes, slug derivation, date/time/email
//! normalization and field validation. Nothing here touches the database.

pub mod booking;
pub mod datetime;
pub mod email;
pub mod event;
pub mod pagination;
pub mod slug;
pub mod validation;

pub use booking::{prepare_booking, Booking, BookingDraft, BookingInput, NewBooking};
pub use event::{
    normalize_event, prepare_event, prepare_event_with, validate_event, Event, EventChanges,
    EventDraft, EventFilter, EventInput, EventMode, EventRecord,
};
pub use pagination::{Paginated, Pagination};
pub use validation::{ValidationError, ValidationFailure};
