//! # Dashboard
//!
//! `GET /v1/clubs/:club_id/dashboard`: roster counts, attendance, hours,
//! tasks and upcoming events for one club, computed on request.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use clubsync_club::ClubSummary;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/clubs/:club_id/dashboard", get(dashboard))
}

/// GET /v1/clubs/:club_id/dashboard: Club summary.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/dashboard",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    responses(
        (status = 200, description = "Club summary", body = ClubSummary),
        (status = 404, description = "Club not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "dashboard"
)]
async fn dashboard(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
) -> Result<Json<ClubSummary>, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    let data = state.club_data(club_id);
    Ok(Json(ClubSummary::compute(&access.club, &data, Utc::now())))
}
