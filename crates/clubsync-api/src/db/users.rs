//! `users` table.

use chrono::{DateTime, Utc};
use clubsync_club::User;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, user: &User) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, email, display_name, password_digest, password_salt, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (id) DO UPDATE SET
            email = EXCLUDED.email,
            display_name = EXCLUDED.display_name,
            password_digest = EXCLUDED.password_digest,
            password_salt = EXCLUDED.password_salt",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(&user.password_digest)
    .bind(&user.password_salt)
    .bind(user.created_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<User>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, display_name, password_digest, password_salt, created_at
         FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(UserRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_digest: String,
    password_salt: String,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_record(self) -> User {
        User {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            password_digest: self.password_digest,
            password_salt: self.password_salt,
            created_at: self.created_at,
        }
    }
}
