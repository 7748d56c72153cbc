//! # Join Requests
//!
//! The join-code workflow: a signed-in user submits a club's join code,
//! an officer of that club approves or rejects the request, and approval
//! adds the user to the roster as an active member.
//!
//! - `POST /v1/join-requests`: request to join by code
//! - `GET /v1/join-requests/mine`: the caller's own requests
//! - `GET /v1/clubs/:club_id/join-requests`: a club's requests (officer)
//! - `POST /v1/clubs/:club_id/join-requests/:id/approve` (officer)
//! - `POST /v1/clubs/:club_id/join-requests/:id/reject` (officer)

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use clubsync_club::{JoinRequest, Member, MemberStatus};
use clubsync_core::text::MAX_BODY_LEN;
use clubsync_core::{optional_text, ClubRole, JoinCode, ValidationError};
use clubsync_state::JoinRequestStatus;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::state::AppState;

// ── Request DTOs ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJoinRequest {
    /// Case-insensitive.
    #[schema(example = "K7Q2XM9A")]
    pub join_code: String,
    pub message: Option<String>,
}

/// [`CreateJoinRequest`] after validation.
#[derive(Debug)]
struct ValidJoinRequest {
    join_code: JoinCode,
    message: Option<String>,
}

impl CreateJoinRequest {
    fn into_valid(self) -> Result<ValidJoinRequest, ValidationError> {
        Ok(ValidJoinRequest {
            join_code: JoinCode::parse(&self.join_code)?,
            message: optional_text("message", self.message.as_deref(), MAX_BODY_LEN)?,
        })
    }
}

impl Validate for CreateJoinRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        let valid = self.into_valid()?;
        Ok(Self {
            join_code: valid.join_code.as_str().to_string(),
            message: valid.message,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JoinRequestQuery {
    pub status: Option<JoinRequestStatus>,
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/join-requests", post(create_join_request))
        .route("/v1/join-requests/mine", get(list_my_requests))
        .route("/v1/clubs/:club_id/join-requests", get(list_club_requests))
        .route(
            "/v1/clubs/:club_id/join-requests/:id/approve",
            post(approve_request),
        )
        .route(
            "/v1/clubs/:club_id/join-requests/:id/reject",
            post(reject_request),
        )
}

fn newest_first(requests: &mut [JoinRequest]) {
    requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/join-requests: Ask to join a club by its code.
#[utoipa::path(
    post,
    path = "/v1/join-requests",
    request_body = CreateJoinRequest,
    responses(
        (status = 201, description = "Request submitted", body = JoinRequest),
        (status = 404, description = "No club has this code", body = crate::error::ErrorBody),
        (status = 409, description = "Already a member or request pending", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed code", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "join_requests"
)]
async fn create_join_request(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<CreateJoinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JoinRequest>), AppError> {
    let req = extract_validated_json(body)?.into_valid()?;
    let user = state
        .users
        .get(&caller.user_id)
        .ok_or_else(|| AppError::Unauthorized("unknown or revoked session".into()))?;
    let club = state
        .clubs
        .find(|c| c.join_code == req.join_code)
        .ok_or_else(|| AppError::NotFound("no club uses this join code".into()))?;

    if state
        .members
        .find(|m| m.club_id == club.id && m.user_id == Some(user.id))
        .is_some()
    {
        return Err(AppError::Conflict(format!(
            "already a member of {}",
            club.name
        )));
    }

    let request = JoinRequest {
        id: Uuid::new_v4(),
        club_id: club.id,
        user_id: user.id,
        name: user.display_name.clone(),
        email: user.email.clone(),
        message: req.message,
        status: JoinRequestStatus::Pending,
        decided_by: None,
        decided_at: None,
        created_at: Utc::now(),
    };
    state
        .join_requests
        .insert_unique(request.id, request.clone(), |existing, new| {
            existing.is_pending()
                && existing.club_id == new.club_id
                && existing.user_id == new.user_id
        })
        .map_err(|_| {
            AppError::Conflict(format!("a request to join {} is already pending", club.name))
        })?;
    state.commit(vec![Change::JoinRequest(request.clone())]).await?;

    tracing::info!(club_id = %club.id, user_id = %user.id, "join request submitted");
    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /v1/join-requests/mine: The caller's requests, newest first.
#[utoipa::path(
    get,
    path = "/v1/join-requests/mine",
    responses((status = 200, description = "Caller's join requests", body = Vec<JoinRequest>)),
    security(("bearer" = [])),
    tag = "join_requests"
)]
async fn list_my_requests(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<JoinRequest>> {
    let mut requests = state.join_requests.filter(|r| r.user_id == caller.user_id);
    newest_first(&mut requests);
    Json(requests)
}

/// GET /v1/clubs/:club_id/join-requests: A club's requests (officer).
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/join-requests",
    params(("club_id" = Uuid, Path, description = "Club ID"), JoinRequestQuery),
    responses(
        (status = 200, description = "Join requests", body = Vec<JoinRequest>),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "join_requests"
)]
async fn list_club_requests(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<JoinRequestQuery>, QueryRejection>,
) -> Result<Json<Vec<JoinRequest>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let query = extract_query(query)?;
    let mut requests = state.join_requests.filter(|r| {
        r.club_id == club_id && query.status.map_or(true, |s| r.status == s)
    });
    newest_first(&mut requests);
    Ok(Json(requests))
}

/// POST /v1/clubs/:club_id/join-requests/:id/approve: Admit the requester.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/join-requests/{id}/approve",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Join request ID"),
    ),
    responses(
        (status = 200, description = "Request approved", body = JoinRequest),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Already decided", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "join_requests"
)]
async fn approve_request(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<JoinRequest>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let now = Utc::now();
    let decided = decide(&state, club_id, id, JoinRequestStatus::Approved, caller.user_id)?;

    let member = Member {
        id: Uuid::new_v4(),
        club_id,
        user_id: Some(decided.user_id),
        name: decided.name.clone(),
        email: Some(decided.email.clone()),
        role: ClubRole::Member,
        position: None,
        grade: None,
        status: MemberStatus::Active,
        joined_at: now,
        created_at: now,
        updated_at: now,
    };
    let mut changes = vec![Change::JoinRequest(decided.clone())];
    if let Some(member) = add_to_roster(&state, member)? {
        changes.insert(0, Change::Member(member));
    }
    state.commit(changes).await?;

    tracing::info!(%club_id, request_id = %id, "join request approved");
    Ok(Json(decided))
}

/// POST /v1/clubs/:club_id/join-requests/:id/reject: Turn the request down.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/join-requests/{id}/reject",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Join request ID"),
    ),
    responses(
        (status = 200, description = "Request rejected", body = JoinRequest),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "Already decided", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "join_requests"
)]
async fn reject_request(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<JoinRequest>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let decided = decide(&state, club_id, id, JoinRequestStatus::Rejected, caller.user_id)?;
    state.commit(vec![Change::JoinRequest(decided.clone())]).await?;

    tracing::info!(%club_id, request_id = %id, "join request rejected");
    Ok(Json(decided))
}

/// Put an approved requester on the roster. `None` when they already
/// were. A club deleted while the member was inserted takes the member
/// with it.
fn add_to_roster(state: &AppState, member: Member) -> Result<Option<Member>, AppError> {
    let club_id = member.club_id;
    if let Err(existing) = state.members.insert_unique(member.id, member.clone(), |a, b| {
        a.club_id == b.club_id && a.user_id.is_some() && a.user_id == b.user_id
    }) {
        tracing::info!(member_id = %existing.id, "approved requester was already on the roster");
        return Ok(None);
    }
    if !state.clubs.contains(&club_id) {
        state.members.remove(&member.id);
        return Err(AppError::not_found("club", club_id));
    }
    Ok(Some(member))
}

/// Apply a decision under the store lock so two officers cannot both win.
fn decide(
    state: &AppState,
    club_id: Uuid,
    id: Uuid,
    decision: JoinRequestStatus,
    officer: Uuid,
) -> Result<JoinRequest, AppError> {
    let not_found = || AppError::not_found("join request", id);
    state
        .join_requests
        .try_update(&id, |r| {
            if r.club_id != club_id {
                return Err(not_found());
            }
            r.decide(decision, officer, Utc::now())?;
            Ok(r.clone())
        })
        .ok_or_else(not_found)?
}
