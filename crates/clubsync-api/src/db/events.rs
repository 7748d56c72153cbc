//! `events` table.

use chrono::{DateTime, Utc};
use clubsync_club::Event;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, e: &Event) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO events (id, club_id, title, description, location, starts_at, ends_at, category,
                             created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            location = EXCLUDED.location,
            starts_at = EXCLUDED.starts_at,
            ends_at = EXCLUDED.ends_at,
            category = EXCLUDED.category,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(e.id)
    .bind(e.club_id)
    .bind(&e.title)
    .bind(&e.description)
    .bind(&e.location)
    .bind(e.starts_at)
    .bind(e.ends_at)
    .bind(&e.category)
    .bind(e.created_at)
    .bind(e.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

/// Attendance taken at the event is removed with it.
pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM events WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
    let rows = sqlx::query_as::<_, EventRow>(
        "SELECT id, club_id, title, description, location, starts_at, ends_at, category,
                created_at, updated_at
         FROM events ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(EventRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct EventRow {
    id: Uuid,
    club_id: Uuid,
    title: String,
    description: Option<String>,
    location: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_record(self) -> Event {
        Event {
            id: self.id,
            club_id: self.club_id,
            title: self.title,
            description: self.description,
            location: self.location,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
