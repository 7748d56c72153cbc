//! `tasks` table.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_club::Task;
use clubsync_state::{TaskPriority, TaskStatus};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use super::decode_name;

pub async fn upsert<'e>(ex: impl PgExecutor<'e>, t: &Task) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tasks (id, club_id, title, description, assignee_id, due_date, priority, status,
                            completed_at, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
         ON CONFLICT (id) DO UPDATE SET
            title = EXCLUDED.title,
            description = EXCLUDED.description,
            assignee_id = EXCLUDED.assignee_id,
            due_date = EXCLUDED.due_date,
            priority = EXCLUDED.priority,
            status = EXCLUDED.status,
            completed_at = EXCLUDED.completed_at,
            updated_at = EXCLUDED.updated_at",
    )
    .bind(t.id)
    .bind(t.club_id)
    .bind(&t.title)
    .bind(&t.description)
    .bind(t.assignee_id)
    .bind(t.due_date)
    .bind(t.priority.as_str())
    .bind(t.status.as_str())
    .bind(t.completed_at)
    .bind(t.created_at)
    .bind(t.updated_at)
    .execute(ex)
    .await?;
    Ok(())
}

pub async fn delete<'e>(ex: impl PgExecutor<'e>, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(ex)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn load_all(pool: &PgPool) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT id, club_id, title, description, assignee_id, due_date, priority, status,
                completed_at, created_at, updated_at
         FROM tasks ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(TaskRow::into_record).collect())
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: Uuid,
    club_id: Uuid,
    title: String,
    description: Option<String>,
    assignee_id: Option<Uuid>,
    due_date: Option<NaiveDate>,
    priority: String,
    status: String,
    completed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TaskRow {
    fn into_record(self) -> Task {
        Task {
            priority: decode_name(
                "tasks",
                self.id,
                "priority",
                &self.priority,
                TaskPriority::from_name,
                TaskPriority::default(),
            ),
            status: decode_name(
                "tasks",
                self.id,
                "status",
                &self.status,
                TaskStatus::from_name,
                TaskStatus::Todo,
            ),
            id: self.id,
            club_id: self.club_id,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            due_date: self.due_date,
            completed_at: self.completed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
