//! Persistence operations
//!
//! Each operation runs the two-phase pipeline (normalize, then validate),
//! performs the checks that need the store, and maps store failures onto
//! the operation-level [`Error`](crate::error::Error) taxonomy.

mod bookings;
mod events;

pub use bookings::{BookingService, DEFAULT_RECENT_LIMIT, MAX_RECENT_LIMIT};
pub use events::EventService;

use crate::error::{Error, StoreError};

/// Log a store failure before it reaches the caller.
fn log_store_error(operation: &'static str, error: &StoreError) {
    tracing::error!(operation, error = %error, "store operation failed");
}

fn store_error(error: StoreError, operation: &'static str) -> Error {
    log_store_error(operation, &error);
    Error::Store(error)
}
