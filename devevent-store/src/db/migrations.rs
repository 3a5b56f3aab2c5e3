//! Schema for events and bookings
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so it runs on each
//! successful connection.

use sqlx::PgPool;

use crate::store::{BOOKING_EVENT_EMAIL_CONSTRAINT, EVENT_SLUG_CONSTRAINT};

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running devevent migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id UUID PRIMARY KEY,
            title TEXT NOT NULL CHECK (char_length(title) <= 100),
            slug TEXT NOT NULL,
            description TEXT NOT NULL CHECK (char_length(description) <= 1000),
            overview TEXT NOT NULL CHECK (char_length(overview) <= 500),
            image TEXT NOT NULL,
            venue TEXT NOT NULL,
            location TEXT NOT NULL,
            "date" TEXT NOT NULL,
            "time" TEXT NOT NULL,
            mode TEXT NOT NULL CHECK (mode IN ('online', 'offline', 'hybrid')),
            audience TEXT NOT NULL,
            agenda TEXT[] NOT NULL CHECK (cardinality(agenda) > 0),
            organizer TEXT NOT NULL,
            tags TEXT[] NOT NULL CHECK (cardinality(tags) > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON events (slug)",
        EVENT_SLUG_CONSTRAINT
    ))
    .execute(pool)
    .await?;

    sqlx::query(r#"CREATE INDEX IF NOT EXISTS idx_events_date_mode ON events ("date", mode)"#)
        .execute(pool)
        .await?;

    // No foreign key: the event reference is checked by the booking service.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS bookings (
            id UUID PRIMARY KEY,
            event_id UUID NOT NULL,
            email TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_event ON bookings (event_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_bookings_event_created ON bookings (event_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_bookings_email ON bookings (email)")
        .execute(pool)
        .await?;

    sqlx::query(&format!(
        "CREATE UNIQUE INDEX IF NOT EXISTS {} ON bookings (event_id, email)",
        BOOKING_EVENT_EMAIL_CONSTRAINT
    ))
    .execute(pool)
    .await?;

    tracing::info!("devevent migrations complete");
    Ok(())
}
