//! `attendance` table.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_club::{AttendanceRecord, AttendanceStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::decode_name;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, a: &AttendanceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO attendance (id, club_id, member_id, date, status, event_id, notes, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
         ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            notes = EXCLUDED.notes,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(a.id)
    .bind(a.club_id)
    .bind(a.member_id)
    .bind(a.date)
    .bind(a.status.as_str())
    .bind(a.event_id)
    .bind(&a.notes)
    .bind(a.created_at)
    .bind(a.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, AttendanceRow>(
        "SELECT id, club_id, member_id, date, status, event_id, notes, created_at, updated_at
         FROM attendance ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(AttendanceRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: Uuid,
    club_id: Uuid,
    member_id: Uuid,
    date: NaiveDate,
    status: String,
    event_id: Option<Uuid>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AttendanceRow {
    fn into_record(self) -> AttendanceRecord {
        AttendanceRecord {
            status: decode_name(
                "attendance",
                self.id,
                "status",
                &self.status,
                AttendanceStatus::from_name,
                AttendanceStatus::Absent,
            ),
            id: self.id,
            club_id: self.club_id,
            member_id: self.member_id,
            date: self.date,
            event_id: self.event_id,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
