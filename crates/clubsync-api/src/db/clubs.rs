//! `clubs` table. Deleting a club cascades to every club-scoped table.

use chrono::{DateTime, Utc};
use clubsync_club::Club;
use clubsync_core::JoinCode;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, club: &Club) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO clubs (id, name, description, join_code, hour_goal, created_by, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            description = EXCLUDED.description,
            join_code = EXCLUDED.join_code,
            hour_goal = EXCLUDED.hour_goal,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(club.id)
    .bind(&club.name)
    .bind(&club.description)
    .bind(club.join_code.as_str())
    .bind(club.hour_goal)
    .bind(club.created_by)
    .bind(club.created_at)
    .bind(club.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM clubs WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Fails on a malformed join code: there is no sensible default for one.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Club>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ClubRow>(
        "SELECT id, name, description, join_code, hour_goal, created_by, created_at, updated_at
         FROM clubs ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ClubRow::into_record).collect()
}

#[derive(sqlx::FromRow)]
struct ClubRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    join_code: String,
    hour_goal: Option<f64>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ClubRow {
    fn into_record(self) -> Result<Club, sqlx::Error> {
        let join_code = JoinCode::parse(&self.join_code).map_err(|e| {
            tracing::error!(id = %self.id, error = %e, "malformed join code in database");
            sqlx::Error::Decode(Box::new(e))
        })?;
        Ok(Club {
            id: self.id,
            name: self.name,
            description: self.description,
            join_code,
            hour_goal: self.hour_goal,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
