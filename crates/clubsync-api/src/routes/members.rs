//! # Roster
//!
//! - `GET /v1/clubs/:club_id/members`: list, filtered by `query`, `role`, `status`
//! - `POST /v1/clubs/:club_id/members`: add a roster entry (officer)
//! - `GET /v1/clubs/:club_id/members/:id`
//! - `PUT /v1/clubs/:club_id/members/:id`: edit (officer)
//! - `DELETE /v1/clubs/:club_id/members/:id`: remove (officer), or leave (self)
//!
//! A club always keeps at least one officer: demoting or removing the last
//! one is a 409.

use std::collections::HashMap;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use clubsync_club::filter::sort_members;
use clubsync_club::member::officer_count;
use clubsync_club::{Member, MemberFilter, MemberStatus};
use clubsync_core::text::MAX_NAME_LEN;
use clubsync_core::{optional_text, ClubRole, Email, RequiredText, ValidationError};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::find_in_club;
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

/// Body for create and update. On update, an absent `role` or `status`
/// keeps the current value; every other field is replaced.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MemberRequest {
    pub name: String,
    pub email: Option<String>,
    /// Defaults to `member` on create.
    pub role: Option<ClubRole>,
    #[schema(example = "Treasurer")]
    pub position: Option<String>,
    pub grade: Option<String>,
    /// Defaults to `active` on create.
    pub status: Option<MemberStatus>,
}

impl Validate for MemberRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(e) => Some(Email::parse(e)?.into_inner()),
        };
        Ok(Self {
            name: RequiredText::new("name", &self.name, MAX_NAME_LEN)?.into_inner(),
            email,
            role: self.role,
            position: optional_text("position", self.position.as_deref(), MAX_NAME_LEN)?,
            grade: optional_text("grade", self.grade.as_deref(), MAX_NAME_LEN)?,
            status: self.status,
        })
    }
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/clubs/:club_id/members",
            get(list_members).post(create_member),
        )
        .route(
            "/v1/clubs/:club_id/members/:id",
            get(get_member).put(update_member).delete(delete_member),
        )
}

fn last_officer_conflict() -> AppError {
    AppError::Conflict("a club must keep at least one officer".into())
}

fn club_officers(map: &HashMap<Uuid, Member>, club_id: Uuid) -> usize {
    officer_count(map.values().filter(|m| m.club_id == club_id))
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/clubs/:club_id/members: List the roster.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/members",
    params(("club_id" = Uuid, Path, description = "Club ID"), MemberFilter),
    responses((status = 200, description = "Roster, by name", body = Vec<Member>)),
    security(("bearer" = [])),
    tag = "members"
)]
async fn list_members(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<MemberFilter>, QueryRejection>,
) -> Result<Json<Vec<Member>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let filter = extract_query(query)?;
    let mut members = state
        .members
        .filter(|m| m.club_id == club_id && filter.matches(m));
    sort_members(&mut members);
    Ok(Json(members))
}

/// POST /v1/clubs/:club_id/members: Add a roster entry.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/members",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = MemberRequest,
    responses(
        (status = 201, description = "Member added", body = Member),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "members"
)]
async fn create_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Member>), AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    let now = Utc::now();
    let member = Member {
        id: Uuid::new_v4(),
        club_id,
        user_id: None,
        name: req.name,
        email: req.email,
        role: req.role.unwrap_or(ClubRole::Member),
        position: req.position,
        grade: req.grade,
        status: req.status.unwrap_or_default(),
        joined_at: now,
        created_at: now,
        updated_at: now,
    };
    state.members.insert(member.id, member.clone());
    state.commit(vec![Change::Member(member.clone())]).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

/// GET /v1/clubs/:club_id/members/:id: One roster entry.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/members/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Member ID"),
    ),
    responses(
        (status = 200, description = "Member found", body = Member),
        (status = 404, description = "Member not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "members"
)]
async fn get_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Member>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    find_in_club(&state.members, club_id, id).map(Json)
}

/// PUT /v1/clubs/:club_id/members/:id: Edit a roster entry.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/members/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Member ID"),
    ),
    request_body = MemberRequest,
    responses(
        (status = 200, description = "Member updated", body = Member),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Would leave the club without an officer", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "members"
)]
async fn update_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<MemberRequest>, JsonRejection>,
) -> Result<Json<Member>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    let updated = state.members.with_write(|map| {
        let current = map
            .get(&id)
            .filter(|m| m.club_id == club_id)
            .ok_or_else(|| AppError::not_found("member", id))?;
        let role = req.role.unwrap_or(current.role);
        if current.is_officer() && role != ClubRole::Officer && club_officers(map, club_id) <= 1 {
            return Err(last_officer_conflict());
        }
        let member = map
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("member", id))?;
        member.name = req.name;
        member.email = req.email;
        member.role = role;
        member.position = req.position;
        member.grade = req.grade;
        if let Some(status) = req.status {
            member.status = status;
        }
        member.updated_at = Utc::now();
        Ok(member.clone())
    })?;
    state.commit(vec![Change::Member(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/members/:id: Remove a member, or leave.
///
/// The member's attendance and hour entries go with them; tasks assigned
/// to them become unassigned.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/members/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Member ID"),
    ),
    responses(
        (status = 204, description = "Member removed"),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Last officer", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "members"
)]
async fn delete_member(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    if access.member.id != id {
        access.require_officer()?;
    }
    state.members.with_write(|map| {
        let current = map
            .get(&id)
            .filter(|m| m.club_id == club_id)
            .ok_or_else(|| AppError::not_found("member", id))?;
        if current.is_officer() && club_officers(map, club_id) <= 1 {
            return Err(last_officer_conflict());
        }
        map.remove(&id);
        Ok(())
    })?;

    state.attendance.remove_where(|a| a.member_id == id);
    state.hours.remove_where(|h| h.member_id == id);
    let now = Utc::now();
    for task in state.tasks.filter(|t| t.assignee_id == Some(id)) {
        state.tasks.update(&task.id, |t| {
            t.assignee_id = None;
            t.updated_at = now;
        });
    }
    state.commit(vec![Change::MemberDeleted(id)]).await?;

    tracing::info!(%club_id, member_id = %id, by = %caller.user_id, "member removed");
    Ok(StatusCode::NO_CONTENT)
}
