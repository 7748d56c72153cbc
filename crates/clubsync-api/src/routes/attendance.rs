//! # Attendance
//!
//! - `GET /v1/clubs/:club_id/attendance`: newest date first; `member_id`, `date`, `event_id`
//! - `POST /v1/clubs/:club_id/attendance`: one record (officer)
//! - `POST /v1/clubs/:club_id/attendance/batch`: take roll for one meeting (officer)
//! - `PUT /v1/clubs/:club_id/attendance/:id`: change status / notes (officer)
//! - `DELETE /v1/clubs/:club_id/attendance/:id` (officer)
//! - `GET /v1/clubs/:club_id/attendance/stats`: rate, average, per member
//!
//! A member has at most one record per `(date, event)`. Creating a second
//! one is a 409; the batch endpoint instead overwrites the existing record.

use std::collections::HashSet;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use clubsync_club::analytics::{self, MemberAttendance, Percentage};
use clubsync_club::filter::sort_attendance;
use clubsync_club::{AttendanceFilter, AttendanceRecord, AttendanceStatus};
use clubsync_core::text::MAX_BODY_LEN;
use clubsync_core::{optional_text, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::{check_event_ref, check_member_ref, find_in_club};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAttendanceRequest {
    pub member_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub event_id: Option<Uuid>,
    pub notes: Option<String>,
}

impl Validate for CreateAttendanceRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            notes: optional_text("notes", self.notes.as_deref(), MAX_BODY_LEN)?,
            ..self
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchEntry {
    pub member_id: Uuid,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

/// Roll call for one meeting.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BatchAttendanceRequest {
    pub date: NaiveDate,
    pub event_id: Option<Uuid>,
    pub entries: Vec<BatchEntry>,
}

impl Validate for BatchAttendanceRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        if self.entries.is_empty() {
            return Err(ValidationError::Required { field: "entries" });
        }
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.entries.len());
        for entry in self.entries {
            if !seen.insert(entry.member_id) {
                return Err(ValidationError::Invalid(format!(
                    "member {} appears more than once",
                    entry.member_id
                )));
            }
            entries.push(BatchEntry {
                notes: optional_text("notes", entry.notes.as_deref(), MAX_BODY_LEN)?,
                ..entry
            });
        }
        Ok(Self { entries, ..self })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendanceRequest {
    pub status: AttendanceStatus,
    pub notes: Option<String>,
}

impl Validate for UpdateAttendanceRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            notes: optional_text("notes", self.notes.as_deref(), MAX_BODY_LEN)?,
            ..self
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttendanceStats {
    /// Present or late over all non-excused records.
    pub rate: Option<Percentage>,
    /// Mean number of attendees per meeting date.
    pub average_attendance: Option<f64>,
    pub meetings: usize,
    pub members: Vec<MemberAttendance>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/clubs/:club_id/attendance",
            get(list_attendance).post(create_attendance),
        )
        .route("/v1/clubs/:club_id/attendance/batch", post(batch_attendance))
        .route("/v1/clubs/:club_id/attendance/stats", get(attendance_stats))
        .route(
            "/v1/clubs/:club_id/attendance/:id",
            axum::routing::put(update_attendance).delete(delete_attendance),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/clubs/:club_id/attendance: List records.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/attendance",
    params(("club_id" = Uuid, Path, description = "Club ID"), AttendanceFilter),
    responses((status = 200, description = "Records, newest first", body = Vec<AttendanceRecord>)),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn list_attendance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<AttendanceFilter>, QueryRejection>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let filter = extract_query(query)?;
    let mut records = state
        .attendance
        .filter(|a| a.club_id == club_id && filter.matches(a));
    sort_attendance(&mut records);
    Ok(Json(records))
}

/// POST /v1/clubs/:club_id/attendance: Record one member's attendance.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/attendance",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = CreateAttendanceRequest,
    responses(
        (status = 201, description = "Record created", body = AttendanceRecord),
        (status = 409, description = "Already recorded for this meeting", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn create_attendance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<CreateAttendanceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AttendanceRecord>), AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    check_member_ref(&state.members, club_id, req.member_id)?;
    if let Some(event_id) = req.event_id {
        check_event_ref(&state.events, club_id, event_id)?;
    }
    let now = Utc::now();
    let record = AttendanceRecord {
        id: Uuid::new_v4(),
        club_id,
        member_id: req.member_id,
        date: req.date,
        status: req.status,
        event_id: req.event_id,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };
    state
        .attendance
        .insert_unique(record.id, record.clone(), |a, b| a.slot() == b.slot())
        .map_err(|existing| {
            AppError::Conflict(format!(
                "attendance for member {} on {} is already recorded as {}",
                existing.member_id, existing.date, existing.status
            ))
        })?;
    state.commit(vec![Change::Attendance(record.clone())]).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// POST /v1/clubs/:club_id/attendance/batch: Take roll for one meeting.
///
/// Existing records for the same member, date and event are overwritten.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/attendance/batch",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = BatchAttendanceRequest,
    responses(
        (status = 200, description = "Records written", body = Vec<AttendanceRecord>),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn batch_attendance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<BatchAttendanceRequest>, JsonRejection>,
) -> Result<Json<Vec<AttendanceRecord>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    for entry in &req.entries {
        check_member_ref(&state.members, club_id, entry.member_id)?;
    }
    if let Some(event_id) = req.event_id {
        check_event_ref(&state.events, club_id, event_id)?;
    }

    let now = Utc::now();
    let written: Vec<AttendanceRecord> = state.attendance.with_write(|map| {
        req.entries
            .into_iter()
            .map(|entry| {
                let slot = (entry.member_id, req.date, req.event_id);
                let existing = map.values_mut().find(|a| a.slot() == slot);
                match existing {
                    Some(record) => {
                        record.status = entry.status;
                        record.notes = entry.notes;
                        record.updated_at = now;
                        record.clone()
                    }
                    None => {
                        let record = AttendanceRecord {
                            id: Uuid::new_v4(),
                            club_id,
                            member_id: entry.member_id,
                            date: req.date,
                            status: entry.status,
                            event_id: req.event_id,
                            notes: entry.notes,
                            created_at: now,
                            updated_at: now,
                        };
                        map.insert(record.id, record.clone());
                        record
                    }
                }
            })
            .collect()
    });
    state
        .commit(written.iter().cloned().map(Change::Attendance).collect())
        .await?;

    tracing::info!(%club_id, date = %req.date, count = written.len(), "roll call recorded");
    Ok(Json(written))
}

/// PUT /v1/clubs/:club_id/attendance/:id: Correct a record.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/attendance/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Attendance record ID"),
    ),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Record updated", body = AttendanceRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn update_attendance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<UpdateAttendanceRequest>, JsonRejection>,
) -> Result<Json<AttendanceRecord>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    find_in_club(&state.attendance, club_id, id)?;
    let updated = state
        .attendance
        .update(&id, |a| {
            a.status = req.status;
            a.notes = req.notes;
            a.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("attendance record", id))?;
    state.commit(vec![Change::Attendance(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/attendance/:id: Delete a record.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/attendance/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Attendance record ID"),
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 404, description = "Record not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn delete_attendance(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    find_in_club(&state.attendance, club_id, id)?;
    state.attendance.remove(&id);
    state.commit(vec![Change::AttendanceDeleted(id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /v1/clubs/:club_id/attendance/stats: Attendance statistics.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/attendance/stats",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    responses((status = 200, description = "Attendance statistics", body = AttendanceStats)),
    security(("bearer" = [])),
    tag = "attendance"
)]
async fn attendance_stats(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
) -> Result<Json<AttendanceStats>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let records = state.attendance.filter(|a| a.club_id == club_id);
    let meetings = records.iter().map(|a| a.date).collect::<HashSet<_>>().len();
    Ok(Json(AttendanceStats {
        rate: analytics::attendance_rate(&records),
        average_attendance: analytics::average_attendance(&records),
        meetings,
        members: analytics::member_attendance(&records),
    }))
}
