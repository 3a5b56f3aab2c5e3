//! PostgreSQL layer - connection pool, schema and repositories
//!
//! - Constraints live in the database: unique indexes reject duplicates,
//!   repositories surface the violation instead of checking first
//! - One query per operation, paginated listings use `COUNT(*) OVER()`

pub mod bookings;
pub mod events;
pub mod migrations;
pub mod pool;

pub use bookings::PgBookingStore;
pub use events::PgEventStore;
pub use pool::create_pool;
