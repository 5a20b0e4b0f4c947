//! The `events` table.
//!
//! [`PgEventStore`] is the production [`EventStore`]: a full scan ordered by
//! start instant for the map, and a single-row insert for submissions.

use chrono::{DateTime, Utc};
use eventmap_core::{EventStore, StoreError};
use eventmap_types::{Event, EventId, NewEvent};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DbError;
use crate::postgres::PostgresPool;

/// Row type for reading events from `PostgreSQL`.
#[derive(Debug, Clone, sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    start_time: Option<DateTime<Utc>>,
    end_time: Option<DateTime<Utc>>,
    address: Option<String>,
    lat: f64,
    lng: f64,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId::from(row.id),
            title: row.title,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            address: row.address,
            lat: row.lat,
            lng: row.lng,
        }
    }
}

/// Operations on the `events` table.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
}

impl PgEventStore {
    /// Create a store bound to a connection pool.
    pub fn new(pool: &PostgresPool) -> Self {
        Self {
            pool: pool.pool().clone(),
        }
    }

    /// Every event, ascending by start instant. Undated events come last and
    /// ties are broken by id so the order is stable between loads.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn load_all(&self) -> Result<Vec<Event>, DbError> {
        let rows = sqlx::query_as::<_, EventRow>(
            r"SELECT id, title, description, start_time, end_time, address, lat, lng
              FROM events
              ORDER BY start_time ASC NULLS LAST, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = rows.len(), "Loaded events");
        Ok(rows.into_iter().map(Event::from).collect())
    }

    /// Fetch a single event by id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn get(&self, id: EventId) -> Result<Option<Event>, DbError> {
        let row = sqlx::query_as::<_, EventRow>(
            r"SELECT id, title, description, start_time, end_time, address, lat, lng
              FROM events
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Event::from))
    }

    /// Insert a submitted event and return its freshly minted id.
    ///
    /// The submission is expected to be validated already; the table's
    /// check constraints reject anything that slips through.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, event: &NewEvent) -> Result<EventId, DbError> {
        let id = EventId::new();
        sqlx::query(
            r"INSERT INTO events (id, title, description, start_time, end_time, address, lat, lng)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id.into_inner())
        .bind(event.title.trim())
        .bind(event.description.as_deref())
        .bind(event.start_time)
        .bind(event.end_time)
        .bind(event.address.as_deref())
        .bind(event.lat)
        .bind(event.lng)
        .execute(&self.pool)
        .await?;

        tracing::info!(event_id = %id, title = %event.title, "Inserted event");
        Ok(id)
    }
}

impl EventStore for PgEventStore {
    async fn load_all_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.load_all().await?)
    }

    async fn create_event(&self, event: NewEvent) -> Result<EventId, StoreError> {
        Ok(self.insert(&event).await?)
    }
}
