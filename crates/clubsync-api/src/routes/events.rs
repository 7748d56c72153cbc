//! # Events
//!
//! - `GET /v1/clubs/:club_id/events?window=upcoming|past|all&category=`
//! - `POST /v1/clubs/:club_id/events` (officer)
//! - `GET /v1/clubs/:club_id/events/:id`
//! - `PUT /v1/clubs/:club_id/events/:id` (officer)
//! - `DELETE /v1/clubs/:club_id/events/:id` (officer)

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use clubsync_club::event::validate_schedule;
use clubsync_club::{Event, EventWindow};
use clubsync_core::text::{MAX_BODY_LEN, MAX_NAME_LEN, MAX_TITLE_LEN};
use clubsync_core::{optional_text, RequiredText, ValidationError};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::find_in_club;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct EventRequest {
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// Must not be before `starts_at`.
    pub ends_at: Option<DateTime<Utc>>,
    #[schema(example = "fundraiser")]
    pub category: Option<String>,
}

impl Validate for EventRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        validate_schedule(self.starts_at, self.ends_at)?;
        Ok(Self {
            title: RequiredText::new("title", &self.title, MAX_TITLE_LEN)?.into_inner(),
            description: optional_text("description", self.description.as_deref(), MAX_BODY_LEN)?,
            location: optional_text("location", self.location.as_deref(), MAX_TITLE_LEN)?,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            category: optional_text("category", self.category.as_deref(), MAX_NAME_LEN)?,
        })
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// `upcoming`, `past` or `all` (default).
    pub window: Option<EventWindow>,
    /// Case-insensitive exact match.
    pub category: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clubs/:club_id/events", get(list_events).post(create_event))
        .route(
            "/v1/clubs/:club_id/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

/// GET /v1/clubs/:club_id/events: The club calendar.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/events",
    params(("club_id" = Uuid, Path, description = "Club ID"), EventQuery),
    responses((status = 200, description = "Events in window order", body = Vec<Event>)),
    security(("bearer" = [])),
    tag = "events"
)]
async fn list_events(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let query = extract_query(query)?;
    let window = query.window.unwrap_or_default();
    let category = query.category.as_deref().map(str::trim);
    let now = Utc::now();
    let mut events = state.events.filter(|e| {
        e.club_id == club_id
            && window.matches(e, now)
            && category.map_or(true, |c| {
                e.category
                    .as_deref()
                    .is_some_and(|ec| ec.eq_ignore_ascii_case(c))
            })
    });
    window.sort(&mut events);
    Ok(Json(events))
}

/// POST /v1/clubs/:club_id/events: Schedule an event.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/events",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = EventRequest,
    responses(
        (status = 201, description = "Event created", body = Event),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
async fn create_event(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4(),
        club_id,
        title: req.title,
        description: req.description,
        location: req.location,
        starts_at: req.starts_at,
        ends_at: req.ends_at,
        category: req.category,
        created_at: now,
        updated_at: now,
    };
    state.events.insert(event.id, event.clone());
    state.commit(vec![Change::Event(event.clone())]).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// GET /v1/clubs/:club_id/events/:id: One event.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/events/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Event ID"),
    ),
    responses(
        (status = 200, description = "Event found", body = Event),
        (status = 404, description = "Event not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
async fn get_event(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Event>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    find_in_club(&state.events, club_id, id).map(Json)
}

/// PUT /v1/clubs/:club_id/events/:id: Reschedule or edit an event.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/events/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Event ID"),
    ),
    request_body = EventRequest,
    responses(
        (status = 200, description = "Event updated", body = Event),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Event not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
async fn update_event(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<EventRequest>, JsonRejection>,
) -> Result<Json<Event>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    find_in_club(&state.events, club_id, id)?;
    let updated = state
        .events
        .update(&id, |e| {
            e.title = req.title;
            e.description = req.description;
            e.location = req.location;
            e.starts_at = req.starts_at;
            e.ends_at = req.ends_at;
            e.category = req.category;
            e.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("event", id))?;
    state.commit(vec![Change::Event(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/events/:id: Cancel an event.
///
/// Attendance taken at the event is deleted with it.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/events/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Event ID"),
    ),
    responses(
        (status = 204, description = "Event deleted"),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Event not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "events"
)]
async fn delete_event(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    find_in_club(&state.events, club_id, id)?;
    state.events.remove(&id);
    let dropped = state.attendance.remove_where(|a| a.event_id == Some(id));
    state.commit(vec![Change::EventDeleted(id)]).await?;

    tracing::info!(%club_id, event_id = %id, attendance_removed = dropped.len(), "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
