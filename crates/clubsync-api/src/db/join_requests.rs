//! `join_requests` table.

use chrono::{DateTime, Utc};
use clubsync_club::JoinRequest;
use clubsync_state::JoinRequestStatus;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::decode_name;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, r: &JoinRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO join_requests (id, club_id, user_id, name, email, message, status,
                                    decided_by, decided_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         ON CONFLICT (id) DO UPDATE SET
            status = EXCLUDED.status,
            decided_by = EXCLUDED.decided_by,
            decided_at = EXCLUDED.decided_at",
    )
    .bind(r.id)
    .bind(r.club_id)
    .bind(r.user_id)
    .bind(&r.name)
    .bind(&r.email)
    .bind(&r.message)
    .bind(r.status.as_str())
    .bind(r.decided_by)
    .bind(r.decided_at)
    .bind(r.created_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<JoinRequest>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JoinRequestRow>(
        "SELECT id, club_id, user_id, name, email, message, status, decided_by, decided_at, created_at
         FROM join_requests ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(JoinRequestRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct JoinRequestRow {
    id: Uuid,
    club_id: Uuid,
    user_id: Uuid,
    name: String,
    email: String,
    message: Option<String>,
    status: String,
    decided_by: Option<Uuid>,
    decided_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl JoinRequestRow {
    fn into_record(self) -> JoinRequest {
        JoinRequest {
            status: decode_name(
                "join_requests",
                self.id,
                "status",
                &self.status,
                JoinRequestStatus::from_name,
                JoinRequestStatus::Pending,
            ),
            id: self.id,
            club_id: self.club_id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            message: self.message,
            decided_by: self.decided_by,
            decided_at: self.decided_at,
            created_at: self.created_at,
        }
    }
}
