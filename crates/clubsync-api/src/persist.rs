//! # Durable Commit
//!
//! Handlers mutate the in-memory stores first and then hand the affected
//! records to [`AppState::commit`], which writes them to every configured
//! backend:
//!
//! - Postgres: all changes of one request in a single transaction.
//! - Snapshot file: the whole state, rewritten atomically. Rewrites are
//!   serialized, and the snapshot is taken after the lock is acquired, so
//!   the last writer always writes the newest state.
//!
//! A failure is reported as [`AppError::Internal`]. The in-memory change is
//! not rolled back and nothing is retried; the next successful snapshot
//! write carries it, a database row does not.

use clubsync_club::{
    AttendanceRecord, Club, Event, HourEntry, JoinRequest, MeetingNote, Member, Task, User,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db;
use crate::error::AppError;
use crate::state::AppState;

/// One row-level effect of a mutation.
#[derive(Debug, Clone)]
pub enum Change {
    User(User),
    Club(Club),
    /// Club-scoped rows go with it (database cascade).
    ClubDeleted(Uuid),
    Member(Member),
    /// Attendance and hour entries of the member go with it; tasks are
    /// unassigned.
    MemberDeleted(Uuid),
    Note(MeetingNote),
    NoteDeleted(Uuid),
    Attendance(AttendanceRecord),
    AttendanceDeleted(Uuid),
    Hours(HourEntry),
    HoursDeleted(Uuid),
    Event(Event),
    /// Attendance taken at the event goes with it.
    EventDeleted(Uuid),
    Task(Task),
    TaskDeleted(Uuid),
    JoinRequest(JoinRequest),
}

impl Change {
    fn label(&self) -> &'static str {
        match self {
            Self::User(_) => "user",
            Self::Club(_) | Self::ClubDeleted(_) => "club",
            Self::Member(_) | Self::MemberDeleted(_) => "member",
            Self::Note(_) | Self::NoteDeleted(_) => "meeting note",
            Self::Attendance(_) | Self::AttendanceDeleted(_) => "attendance record",
            Self::Hours(_) | Self::HoursDeleted(_) => "hour entry",
            Self::Event(_) | Self::EventDeleted(_) => "event",
            Self::Task(_) | Self::TaskDeleted(_) => "task",
            Self::JoinRequest(_) => "join request",
        }
    }
}

async fn write_change(
    conn: &mut sqlx::PgConnection,
    change: &Change,
) -> Result<(), sqlx::Error> {
    match change {
        Change::User(u) => db::users::upsert(conn, u).await,
        Change::Club(c) => db::clubs::upsert(conn, c).await,
        Change::ClubDeleted(id) => db::clubs::delete(conn, *id).await.map(drop),
        Change::Member(m) => db::members::upsert(conn, m).await,
        Change::MemberDeleted(id) => db::members::delete(conn, *id).await.map(drop),
        Change::Note(n) => db::notes::upsert(conn, n).await,
        Change::NoteDeleted(id) => db::notes::delete(conn, *id).await.map(drop),
        Change::Attendance(a) => db::attendance::upsert(conn, a).await,
        Change::AttendanceDeleted(id) => db::attendance::delete(conn, *id).await.map(drop),
        Change::Hours(h) => db::hours::upsert(conn, h).await,
        Change::HoursDeleted(id) => db::hours::delete(conn, *id).await.map(drop),
        Change::Event(e) => db::events::upsert(conn, e).await,
        Change::EventDeleted(id) => db::events::delete(conn, *id).await.map(drop),
        Change::Task(t) => db::tasks::upsert(conn, t).await,
        Change::TaskDeleted(id) => db::tasks::delete(conn, *id).await.map(drop),
        Change::JoinRequest(r) => db::join_requests::upsert(conn, r).await,
    }
}

async fn write_db(pool: &PgPool, changes: &[Change]) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for change in changes {
        write_change(&mut tx, change).await?;
    }
    tx.commit().await
}

impl AppState {
    /// Persist `changes` to every configured backend.
    pub async fn commit(&self, changes: Vec<Change>) -> Result<(), AppError> {
        if changes.is_empty() {
            return Ok(());
        }

        if let Some(pool) = &self.db_pool {
            if let Err(e) = write_db(pool, &changes).await {
                tracing::error!(
                    error = %e,
                    kind = changes[0].label(),
                    count = changes.len(),
                    "failed to persist change to database"
                );
                return Err(AppError::Internal(format!(
                    "change applied in memory but could not be persisted: {e}"
                )));
            }
        }

        if let Some(path) = &self.config.snapshot_path {
            let _guard = self.snapshot_lock.lock().await;
            let snapshot = self.to_snapshot();
            let path = path.clone();
            let written = tokio::task::spawn_blocking(move || snapshot.write_atomic(&path)).await;
            let failure = match written {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(e) => Some(format!("snapshot writer task failed: {e}")),
            };
            if let Some(reason) = failure {
                tracing::error!(
                    error = %reason,
                    kind = changes[0].label(),
                    "failed to write snapshot"
                );
                return Err(AppError::Internal(format!(
                    "change applied in memory but could not be persisted: {reason}"
                )));
            }
        }

        Ok(())
    }
}
