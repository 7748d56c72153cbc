//! `hour_entries` table.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_club::HourEntry;
use clubsync_state::HourStatus;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::decode_name;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, h: &HourEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO hour_entries (id, club_id, member_id, date, hours, activity, description, status,
                                   reviewed_by, reviewed_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         ON CONFLICT (id) DO UPDATE SET
            member_id = EXCLUDED.member_id,
            date = EXCLUDED.date,
            hours = EXCLUDED.hours,
            activity = EXCLUDED.activity,
            description = EXCLUDED.description,
            status = EXCLUDED.status,
            reviewed_by = EXCLUDED.reviewed_by,
            reviewed_at = EXCLUDED.reviewed_at,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(h.id)
    .bind(h.club_id)
    .bind(h.member_id)
    .bind(h.date)
    .bind(h.hours)
    .bind(&h.activity)
    .bind(&h.description)
    .bind(h.status.as_str())
    .bind(h.reviewed_by)
    .bind(h.reviewed_at)
    .bind(h.created_at)
    .bind(h.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM hour_entries WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<HourEntry>, sqlx::Error> {
    let rows = sqlx::query_as::<_, HourRow>(
        "SELECT id, club_id, member_id, date, hours, activity, description, status,
                reviewed_by, reviewed_at, created_at, updated_at
         FROM hour_entries ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(HourRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct HourRow {
    id: Uuid,
    club_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
    hours: f64,
    activity: String,
    description: Option<String>,
    status: String,
    reviewed_by: Option<Uuid>,
    reviewed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl HourRow {
    fn into_record(self) -> HourEntry {
        HourEntry {
            // Pending puts a corrupted entry back in front of an officer.
            status: decode_name(
                "hour_entries",
                self.id,
                "status",
                &self.status,
                HourStatus::from_name,
                HourStatus::Pending,
            ),
            id: self.id,
            club_id: self.club_id,
            member_id: self.member_id,
            date: self.date,
            hours: self.hours,
            activity: self.activity,
            description: self.description,
            reviewed_by: self.reviewed_by,
            reviewed_at: self.reviewed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
