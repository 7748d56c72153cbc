//! `members` table.

use chrono::{DateTime, Utc};
use clubsync_club::{Member, MemberStatus};
use clubsync_core::ClubRole;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::decode_name;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, m: &Member) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO members (id, club_id, user_id, name, email, role, position, grade, status,
                              joined_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
         ON CONFLICT (id) DO UPDATE SET
            name = EXCLUDED.name,
            email = EXCLUDED.email,
            role = EXCLUDED.role,
            position = EXCLUDED.position,
            grade = EXCLUDED.grade,
            status = EXCLUDED.status,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(m.id)
    .bind(m.club_id)
    .bind(m.user_id)
    .bind(&m.name)
    .bind(&m.email)
    .bind(m.role.as_str())
    .bind(&m.position)
    .bind(&m.grade)
    .bind(m.status.as_str())
    .bind(m.joined_at)
    .bind(m.created_at)
    .bind(m.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM members WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<Member>, sqlx::Error> {
    let rows = sqlx::query_as::<_, MemberRow>(
        "SELECT id, club_id, user_id, name, email, role, position, grade, status,
                joined_at, created_at, updated_at
         FROM members ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(MemberRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    club_id: Uuid,
    user_id: Option<Uuid>,
    name: String,
    email: Option<String>,
    role: String,
    position: Option<String>,
    grade: Option<String>,
    status: String,
    joined_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl MemberRow {
    fn into_record(self) -> Member {
        Member {
            role: decode_name(
                "members",
                self.id,
                "role",
                &self.role,
                ClubRole::from_name,
                ClubRole::Member,
            ),
            status: decode_name(
                "members",
                self.id,
                "status",
                &self.status,
                MemberStatus::from_name,
                MemberStatus::Active,
            ),
            id: self.id,
            club_id: self.club_id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            position: self.position,
            grade: self.grade,
            joined_at: self.joined_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
