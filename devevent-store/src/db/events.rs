//! Event repository
//!
//! Slug uniqueness is enforced by the `uniq_event_slug` index; a clash
//! surfaces as [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use devevent_core::{Event, EventFilter, EventMode, EventRecord, Paginated, Pagination};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::EventStore;

const EVENT_COLUMNS: &str = r#"id, title, slug, description, overview, image, venue, location,
    "date", "time", mode, audience, agenda, organizer, tags, created_at, updated_at"#;

/// Event row as stored; `mode` is checked on the way out.
#[derive(Debug, Clone, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    slug: String,
    description: String,
    overview: String,
    image: String,
    venue: String,
    location: String,
    date: String,
    time: String,
    mode: String,
    audience: String,
    agenda: Vec<String>,
    organizer: String,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let mode: EventMode = row
            .mode
            .parse()
            .map_err(|e| StoreError::Decode(format!("event {}: {}", row.id, e)))?;

        Ok(Event {
            id: row.id,
            record: EventRecord {
                title: row.title,
                slug: row.slug,
                description: row.description,
                overview: row.overview,
                image: row.image,
                venue: row.venue,
                location: row.location,
                date: row.date,
                time: row.time,
                mode,
                audience: row.audience,
                agenda: row.agenda,
                organizer: row.organizer,
                tags: row.tags,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed [`EventStore`]
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(&self, column: &str, value: &str) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {} FROM events WHERE {} = $1", EVENT_COLUMNS, column);
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Event::try_from).transpose()
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn insert_event(&self, record: &EventRecord) -> Result<Event, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO events (id, title, slug, description, overview, image, venue, location,
                "date", "time", mode, audience, agenda, organizer, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let row: EventRow = sqlx::query_as(&sql)
            .bind(Uuid::new_v4())
            .bind(&record.title)
            .bind(&record.slug)
            .bind(&record.description)
            .bind(&record.overview)
            .bind(&record.image)
            .bind(&record.venue)
            .bind(&record.location)
            .bind(&record.date)
            .bind(&record.time)
            .bind(record.mode.as_str())
            .bind(&record.audience)
            .bind(&record.agenda)
            .bind(&record.organizer)
            .bind(&record.tags)
            .fetch_one(&self.pool)
            .await?;

        row.try_into()
    }

    async fn update_event(
        &self,
        id: Uuid,
        record: &EventRecord,
    ) -> Result<Option<Event>, StoreError> {
        let sql = format!(
            r#"
            UPDATE events SET
                title = $2, slug = $3, description = $4, overview = $5, image = $6,
                venue = $7, location = $8, "date" = $9, "time" = $10, mode = $11,
                audience = $12, agenda = $13, organizer = $14, tags = $15,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            EVENT_COLUMNS
        );

        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&record.title)
            .bind(&record.slug)
            .bind(&record.description)
            .bind(&record.overview)
            .bind(&record.image)
            .bind(&record.venue)
            .bind(&record.location)
            .bind(&record.date)
            .bind(&record.time)
            .bind(record.mode.as_str())
            .bind(&record.audience)
            .bind(&record.agenda)
            .bind(&record.organizer)
            .bind(&record.tags)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Event::try_from).transpose()
    }

    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, StoreError> {
        let sql = format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS);
        let row: Option<EventRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Event::try_from).transpose()
    }

    async fn find_event_by_slug(&self, slug: &str) -> Result<Option<Event>, StoreError> {
        self.fetch_one_by("slug", slug).await
    }

    async fn list_events(
        &self,
        filter: &EventFilter,
        page: Pagination,
    ) -> Result<Paginated<Event>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}, COUNT(*) OVER() AS total
            FROM events
            WHERE ($1::text IS NULL OR "date" = $1)
              AND ($2::text IS NULL OR mode = $2)
            ORDER BY "date", "time", created_at
            LIMIT $3 OFFSET $4
            "#,
            EVENT_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(filter.date.as_deref())
            .bind(filter.mode.map(|m| m.as_str()))
            .bind(i64::from(page.limit()))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let total = rows.first().map(|r| r.get::<i64, _>("total")).unwrap_or(0);
        let items = rows
            .iter()
            .map(|row| EventRow::from_row(row).map_err(StoreError::from).and_then(Event::try_from))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Paginated {
            items,
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }
}
