//! `meeting_notes` table.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_club::MeetingNote;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, n: &MeetingNote) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO meeting_notes (id, club_id, title, meeting_date, content, author, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            meeting_date = EXCLUDED.meeting_date,
            content = EXCLUDED.content,
            author = EXCLUDED.author,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(n.id)
    .bind(n.club_id)
    .bind(&n.title)
    .bind(n.meeting_date)
    .bind(&n.content)
    .bind(&n.author)
    .bind(n.created_at)
    .bind(n.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM meeting_notes WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<MeetingNote>, sqlx::Error> {
    let rows = sqlx::query_as::<_, NoteRow>(
        "SELECT id, club_id, title, meeting_date, content, author, created_at, updated_at
         FROM meeting_notes ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(NoteRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct NoteRow {
    id: Uuid,
    club_id: Uuid,
    title: String,
    meeting_date: NaiveDate,
    content: String,
    author: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoteRow {
    fn into_record(self) -> MeetingNote {
        MeetingNote {
            id: self.id,
            club_id: self.club_id,
            title: self.title,
            meeting_date: self.meeting_date,
            content: self.content,
            author: self.author,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
