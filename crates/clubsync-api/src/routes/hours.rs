//! # Volunteer Hours
//!
//! - `GET /v1/clubs/:club_id/hours`: newest first; `member_id`, `status`
//! - `POST /v1/clubs/:club_id/hours`: log hours
//! - `PUT /v1/clubs/:club_id/hours/:id`
//! - `DELETE /v1/clubs/:club_id/hours/:id`
//! - `POST /v1/clubs/:club_id/hours/:id/approve` (officer)
//! - `POST /v1/clubs/:club_id/hours/:id/reject` (officer)
//! - `GET /v1/clubs/:club_id/hours/leaderboard`: top volunteers and goal progress
//!
//! Members log hours for themselves and may edit or withdraw an entry until
//! it is approved; editing a rejected entry puts it back in the queue.
//! Officers may log, edit and delete any entry without changing its status.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use clubsync_club::analytics::{self, HourScope, Percentage, VolunteerRank};
use clubsync_club::filter::sort_hours;
use clubsync_club::hours::validate_hours;
use clubsync_club::{HourEntry, HourFilter};
use clubsync_core::text::{MAX_BODY_LEN, MAX_TITLE_LEN};
use clubsync_core::{optional_text, RequiredText, ValidationError};
use clubsync_state::HourStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::{check_member_ref, find_in_club};
use crate::state::AppState;

const DEFAULT_LEADERBOARD_SIZE: usize = 10;
const MAX_LEADERBOARD_SIZE: usize = 100;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct HourRequest {
    /// Defaults to the caller's own roster entry. Only officers may log
    /// hours for someone else.
    pub member_id: Option<Uuid>,
    pub date: NaiveDate,
    #[schema(example = 2.5)]
    pub hours: f64,
    #[schema(example = "Food bank shift")]
    pub activity: String,
    pub description: Option<String>,
}

impl Validate for HourRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            member_id: self.member_id,
            date: self.date,
            hours: validate_hours(self.hours)?,
            activity: RequiredText::new("activity", &self.activity, MAX_TITLE_LEN)?.into_inner(),
            description: optional_text("description", self.description.as_deref(), MAX_BODY_LEN)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaderboardQuery {
    /// Number of members to rank (1 to 100, default 10).
    pub limit: Option<usize>,
    /// `approved` (default) or `all` to include pending entries.
    pub scope: Option<HourScope>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Leaderboard {
    pub scope: HourScope,
    pub total_hours: f64,
    pub hour_goal: Option<f64>,
    pub goal_progress: Option<Percentage>,
    pub leaders: Vec<VolunteerRank>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clubs/:club_id/hours", get(list_hours).post(create_hours))
        .route("/v1/clubs/:club_id/hours/leaderboard", get(leaderboard))
        .route(
            "/v1/clubs/:club_id/hours/:id",
            axum::routing::put(update_hours).delete(delete_hours),
        )
        .route("/v1/clubs/:club_id/hours/:id/approve", post(approve_hours))
        .route("/v1/clubs/:club_id/hours/:id/reject", post(reject_hours))
}

/// Non-officers may only touch their own entries, and only before approval.
fn check_can_modify(access: &ClubAccess, entry: &HourEntry) -> Result<(), AppError> {
    if access.is_officer() {
        return Ok(());
    }
    if entry.member_id != access.member.id {
        return Err(AppError::Forbidden(
            "only officers may change another member's hours".into(),
        ));
    }
    if entry.status == HourStatus::Approved {
        return Err(AppError::Conflict(
            "approved hours can only be changed by an officer".into(),
        ));
    }
    Ok(())
}

// ── Handlers ────────────────────────────────────────────────────────

/// GET /v1/clubs/:club_id/hours: List hour entries.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/hours",
    params(("club_id" = Uuid, Path, description = "Club ID"), HourFilter),
    responses((status = 200, description = "Entries, newest first", body = Vec<HourEntry>)),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn list_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<HourFilter>, QueryRejection>,
) -> Result<Json<Vec<HourEntry>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let filter = extract_query(query)?;
    let mut entries = state
        .hours
        .filter(|h| h.club_id == club_id && filter.matches(h));
    sort_hours(&mut entries);
    Ok(Json(entries))
}

/// POST /v1/clubs/:club_id/hours: Log volunteer hours for review.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/hours",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = HourRequest,
    responses(
        (status = 201, description = "Entry submitted", body = HourEntry),
        (status = 403, description = "Logging for another member requires officer role", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn create_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<HourRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<HourEntry>), AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    let req = extract_validated_json(body)?;
    let member_id = req.member_id.unwrap_or(access.member.id);
    if member_id != access.member.id {
        access.require_officer()?;
        check_member_ref(&state.members, club_id, member_id)?;
    }
    let now = Utc::now();
    let entry = HourEntry {
        id: Uuid::new_v4(),
        club_id,
        member_id,
        date: req.date,
        hours: req.hours,
        activity: req.activity,
        description: req.description,
        status: HourStatus::Pending,
        reviewed_by: None,
        reviewed_at: None,
        created_at: now,
        updated_at: now,
    };
    state.hours.insert(entry.id, entry.clone());
    state.commit(vec![Change::Hours(entry.clone())]).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// PUT /v1/clubs/:club_id/hours/:id: Edit an entry.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/hours/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Hour entry ID"),
    ),
    request_body = HourRequest,
    responses(
        (status = 200, description = "Entry updated", body = HourEntry),
        (status = 403, description = "Not the submitter", body = crate::error::ErrorBody),
        (status = 404, description = "Entry not found", body = crate::error::ErrorBody),
        (status = 409, description = "Entry already approved", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn update_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<HourRequest>, JsonRejection>,
) -> Result<Json<HourEntry>, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    let req = extract_validated_json(body)?;
    if let Some(member_id) = req.member_id {
        if member_id != access.member.id {
            access.require_officer()?;
        }
        check_member_ref(&state.members, club_id, member_id)?;
    }

    let not_found = || AppError::not_found("hour entry", id);
    let updated = state
        .hours
        .try_update(&id, |h| {
            if h.club_id != club_id {
                return Err(not_found());
            }
            check_can_modify(&access, h)?;
            let now = Utc::now();
            if let Some(member_id) = req.member_id {
                h.member_id = member_id;
            }
            h.date = req.date;
            h.hours = req.hours;
            h.activity = req.activity;
            h.description = req.description;
            if access.is_officer() {
                h.updated_at = now;
            } else {
                h.resubmit(now);
            }
            Ok(h.clone())
        })
        .ok_or_else(not_found)??;
    state.commit(vec![Change::Hours(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/hours/:id: Withdraw or delete an entry.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/hours/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Hour entry ID"),
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 403, description = "Not the submitter", body = crate::error::ErrorBody),
        (status = 404, description = "Entry not found", body = crate::error::ErrorBody),
        (status = 409, description = "Entry already approved", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn delete_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    state.hours.with_write(|map| {
        let entry = map
            .get(&id)
            .filter(|h| h.club_id == club_id)
            .ok_or_else(|| AppError::not_found("hour entry", id))?;
        check_can_modify(&access, entry)?;
        map.remove(&id);
        Ok::<_, AppError>(())
    })?;
    state.commit(vec![Change::HoursDeleted(id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/clubs/:club_id/hours/:id/approve: Approve a pending entry.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/hours/{id}/approve",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Hour entry ID"),
    ),
    responses(
        (status = 200, description = "Entry approved", body = HourEntry),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Entry is not pending", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn approve_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HourEntry>, AppError> {
    review(&state, &caller, club_id, id, HourStatus::Approved)
        .await
        .map(Json)
}

/// POST /v1/clubs/:club_id/hours/:id/reject: Reject a pending entry.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/hours/{id}/reject",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Hour entry ID"),
    ),
    responses(
        (status = 200, description = "Entry rejected", body = HourEntry),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Entry is not pending", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn reject_hours(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<HourEntry>, AppError> {
    review(&state, &caller, club_id, id, HourStatus::Rejected)
        .await
        .map(Json)
}

async fn review(
    state: &AppState,
    caller: &CallerIdentity,
    club_id: Uuid,
    id: Uuid,
    decision: HourStatus,
) -> Result<HourEntry, AppError> {
    ClubAccess::resolve(state, caller, club_id)?.require_officer()?;
    let not_found = || AppError::not_found("hour entry", id);
    let reviewed = state
        .hours
        .try_update(&id, |h| {
            if h.club_id != club_id {
                return Err(not_found());
            }
            h.review(decision, caller.user_id, Utc::now())?;
            Ok(h.clone())
        })
        .ok_or_else(not_found)??;
    state.commit(vec![Change::Hours(reviewed.clone())]).await?;

    tracing::info!(%club_id, entry_id = %id, decision = %decision, "hours reviewed");
    Ok(reviewed)
}

/// GET /v1/clubs/:club_id/hours/leaderboard: Top volunteers.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/hours/leaderboard",
    params(("club_id" = Uuid, Path, description = "Club ID"), LeaderboardQuery),
    responses((status = 200, description = "Leaderboard", body = Leaderboard)),
    security(("bearer" = [])),
    tag = "hours"
)]
async fn leaderboard(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> Result<Json<Leaderboard>, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    let query = extract_query(query)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LEADERBOARD_SIZE)
        .clamp(1, MAX_LEADERBOARD_SIZE);
    let scope = query.scope.unwrap_or_default();

    let entries = state.hours.filter(|h| h.club_id == club_id);
    let members = state.members.filter(|m| m.club_id == club_id);
    let total = analytics::total_hours(&entries, scope);
    Ok(Json(Leaderboard {
        scope,
        total_hours: total,
        hour_goal: access.club.hour_goal,
        goal_progress: analytics::hour_goal_progress(total, access.club.hour_goal),
        leaders: analytics::top_volunteers(&entries, &members, limit, scope),
    }))
}
