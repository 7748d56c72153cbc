//! # Clubs
//!
//! - `POST /v1/clubs`: create a club; the caller becomes its first officer
//! - `GET /v1/clubs`: clubs the caller belongs to
//! - `GET /v1/clubs/:club_id`: one club with the caller's role
//! - `PUT /v1/clubs/:club_id`: update name, description, hour goal (officer)
//! - `DELETE /v1/clubs/:club_id`: delete the club and all its data (officer)
//! - `POST /v1/clubs/:club_id/join-code/rotate`: issue a new join code (officer)

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use clubsync_club::club::validate_hour_goal;
use clubsync_club::{Club, Member, MemberStatus};
use clubsync_core::text::{MAX_BODY_LEN, MAX_NAME_LEN};
use clubsync_core::{optional_text, ClubRole, JoinCode, RequiredText, ValidationError};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::persist::Change;
use crate::state::AppState;

/// Join-code draws before giving up on finding an unused one.
pub const JOIN_CODE_ATTEMPTS: usize = 16;

// ── Request/Response DTOs ───────────────────────────────────────────

/// Body for both create and update. Update replaces every field.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ClubRequest {
    pub name: String,
    pub description: Option<String>,
    /// Target total of approved volunteer hours.
    pub hour_goal: Option<f64>,
}

impl Validate for ClubRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: RequiredText::new("name", &self.name, MAX_NAME_LEN)?.into_inner(),
            description: optional_text("description", self.description.as_deref(), MAX_BODY_LEN)?,
            hour_goal: validate_hour_goal(self.hour_goal)?,
        })
    }
}

/// A club as seen by one of its members.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClubMembership {
    pub club: Club,
    pub role: ClubRole,
    /// The caller's roster entry in the club.
    pub member_id: Uuid,
}

impl From<ClubAccess> for ClubMembership {
    fn from(access: ClubAccess) -> Self {
        Self {
            role: access.member.role,
            member_id: access.member.id,
            club: access.club,
        }
    }
}

/// Every club `user_id` belongs to, by club name.
pub fn memberships_of(state: &AppState, user_id: Uuid) -> Vec<ClubMembership> {
    let mut out: Vec<ClubMembership> = state
        .members
        .filter(|m| m.user_id == Some(user_id))
        .into_iter()
        .filter_map(|m| {
            state.clubs.get(&m.club_id).map(|club| ClubMembership {
                club,
                role: m.role,
                member_id: m.id,
            })
        })
        .collect();
    out.sort_by(|a, b| {
        a.club
            .name
            .to_lowercase()
            .cmp(&b.club.name.to_lowercase())
            .then(a.club.id.cmp(&b.club.id))
    });
    out
}

// ── Router ──────────────────────────────────────────────────────────

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clubs", get(list_clubs).post(create_club))
        .route(
            "/v1/clubs/:club_id",
            get(get_club).put(update_club).delete(delete_club),
        )
        .route("/v1/clubs/:club_id/join-code/rotate", post(rotate_join_code))
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /v1/clubs: Create a club.
#[utoipa::path(
    post,
    path = "/v1/clubs",
    request_body = ClubRequest,
    responses(
        (status = 201, description = "Club created", body = ClubMembership),
        (status = 409, description = "No unused join code found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn create_club(
    State(state): State<AppState>,
    caller: CallerIdentity,
    body: Result<Json<ClubRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ClubMembership>), AppError> {
    let req = extract_validated_json(body)?;
    let user = state
        .users
        .get(&caller.user_id)
        .ok_or_else(|| AppError::Unauthorized("unknown or revoked session".into()))?;
    let now = Utc::now();
    let club_id = Uuid::new_v4();

    let mut club = None;
    for _ in 0..JOIN_CODE_ATTEMPTS {
        let candidate = Club {
            id: club_id,
            name: req.name.clone(),
            description: req.description.clone(),
            join_code: JoinCode::generate(&mut OsRng),
            hour_goal: req.hour_goal,
            created_by: user.id,
            created_at: now,
            updated_at: now,
        };
        if state
            .clubs
            .insert_unique(club_id, candidate.clone(), |a, b| a.join_code == b.join_code)
            .is_ok()
        {
            club = Some(candidate);
            break;
        }
    }
    let club = club.ok_or_else(|| {
        tracing::error!("join code space exhausted after {JOIN_CODE_ATTEMPTS} attempts");
        AppError::Conflict("could not allocate a unique join code, try again".into())
    })?;

    let officer = Member {
        id: Uuid::new_v4(),
        club_id,
        user_id: Some(user.id),
        name: user.display_name.clone(),
        email: Some(user.email.clone()),
        role: ClubRole::Officer,
        position: None,
        grade: None,
        status: MemberStatus::Active,
        joined_at: now,
        created_at: now,
        updated_at: now,
    };
    state.members.insert(officer.id, officer.clone());
    state
        .commit(vec![Change::Club(club.clone()), Change::Member(officer.clone())])
        .await?;

    tracing::info!(%club_id, user_id = %user.id, "club created");
    Ok((
        StatusCode::CREATED,
        Json(ClubMembership {
            club,
            role: officer.role,
            member_id: officer.id,
        }),
    ))
}

/// GET /v1/clubs: Clubs the caller belongs to.
#[utoipa::path(
    get,
    path = "/v1/clubs",
    responses((status = 200, description = "Caller's clubs", body = Vec<ClubMembership>)),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn list_clubs(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Json<Vec<ClubMembership>> {
    Json(memberships_of(&state, caller.user_id))
}

/// GET /v1/clubs/:club_id: One club.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club found", body = ClubMembership),
        (status = 404, description = "Unknown club or not a member", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn get_club(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
) -> Result<Json<ClubMembership>, AppError> {
    Ok(Json(ClubAccess::resolve(&state, &caller, club_id)?.into()))
}

/// PUT /v1/clubs/:club_id: Update a club.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = ClubRequest,
    responses(
        (status = 200, description = "Club updated", body = Club),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown club or not a member", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn update_club(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<ClubRequest>, JsonRejection>,
) -> Result<Json<Club>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    let updated = state
        .clubs
        .update(&club_id, |c| {
            c.name = req.name;
            c.description = req.description;
            c.hour_goal = req.hour_goal;
            c.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("club", club_id))?;
    state.commit(vec![Change::Club(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id: Delete a club and everything in it.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 204, description = "Club deleted"),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown club or not a member", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn delete_club(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    state
        .clubs
        .remove(&club_id)
        .ok_or_else(|| AppError::not_found("club", club_id))?;
    let members = state.members.remove_where(|m| m.club_id == club_id).len();
    state.notes.remove_where(|n| n.club_id == club_id);
    state.attendance.remove_where(|a| a.club_id == club_id);
    state.hours.remove_where(|h| h.club_id == club_id);
    state.events.remove_where(|e| e.club_id == club_id);
    state.tasks.remove_where(|t| t.club_id == club_id);
    state.join_requests.remove_where(|r| r.club_id == club_id);
    state.commit(vec![Change::ClubDeleted(club_id)]).await?;

    tracing::info!(%club_id, user_id = %caller.user_id, members, "club deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/clubs/:club_id/join-code/rotate: Replace the join code.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/join-code/rotate",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "New join code issued", body = Club),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 409, description = "No unused join code found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "clubs"
)]
async fn rotate_join_code(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
) -> Result<Json<Club>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let rotated = state.clubs.with_write(|clubs| {
        let fresh = (0..JOIN_CODE_ATTEMPTS)
            .map(|_| JoinCode::generate(&mut OsRng))
            .find(|code| clubs.values().all(|c| &c.join_code != code))
            .ok_or_else(|| {
                AppError::Conflict("could not allocate a unique join code, try again".into())
            })?;
        let club = clubs
            .get_mut(&club_id)
            .ok_or_else(|| AppError::not_found("club", club_id))?;
        club.join_code = fresh;
        club.updated_at = Utc::now();
        Ok::<_, AppError>(club.clone())
    })?;
    state.commit(vec![Change::Club(rotated.clone())]).await?;

    tracing::info!(%club_id, "join code rotated");
    Ok(Json(rotated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn club_request_validation() {
        let req = ClubRequest {
            name: "  Chess Club ".into(),
            description: Some("   ".into()),
            hour_goal: Some(50.0),
        }
        .validate()
        .unwrap();
        assert_eq!(req.name, "Chess Club");
        assert_eq!(req.description, None);

        let err = ClubRequest {
            name: "Chess".into(),
            description: None,
            hour_goal: Some(-1.0),
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "hour_goal", .. }));
    }

    #[test]
    fn memberships_sorted_by_club_name() {
        let state = AppState::new();
        let user_id = Uuid::new_v4();
        let now = Utc::now();
        for (name, code) in [("Zoology", "ZOOL0001"), ("art", "ARTS0001")] {
            let club = Club {
                id: Uuid::new_v4(),
                name: name.into(),
                description: None,
                join_code: JoinCode::parse(code).unwrap(),
                hour_goal: None,
                created_by: user_id,
                created_at: now,
                updated_at: now,
            };
            let member = Member {
                id: Uuid::new_v4(),
                club_id: club.id,
                user_id: Some(user_id),
                name: "Jo".into(),
                email: None,
                role: ClubRole::Member,
                position: None,
                grade: None,
                status: MemberStatus::Active,
                joined_at: now,
                created_at: now,
                updated_at: now,
            };
            state.clubs.insert(club.id, club);
            state.members.insert(member.id, member);
        }
        let names: Vec<String> = memberships_of(&state, user_id)
            .into_iter()
            .map(|m| m.club.name)
            .collect();
        assert_eq!(names, ["art", "Zoology"]);
    }
}
