//! devevent-store: persistence for events and bookings
//!
//! - [`connection`]: process-wide, coalescing connection cache
//! - [`store`]: store traits, implemented by [`db`] (PostgreSQL) and [`memory`]
//! - [`service`]: create/update/read operations with validation and
//!   referential checks
//!
//! # Example
//!
//! ```ignore
//! let config = Config::from_env()?;
//! let pool = get_connection(&config).await?;
//! let state = AppState::postgres(pool);
//! let event = state.events().create(input).await?;
//! ```

pub mod config;
pub mod connection;
pub mod db;
pub mod error;
pub mod memory;
pub mod service;
pub mod state;
pub mod store;

pub use config::{Config, ConfigError};
pub use connection::{get_connection, ConnectionCache, ConnectionError};
pub use error::{Error, ErrorKind, Result, StoreError};
pub use memory::MemoryStore;
pub use service::{BookingService, EventService};
pub use state::AppState;
pub use store::{BookingStore, EventStore};
