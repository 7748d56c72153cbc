//! # Meeting Notes
//!
//! - `GET /v1/clubs/:club_id/notes`: newest meeting first; `query`, `from`, `to`
//! - `POST /v1/clubs/:club_id/notes` (officer)
//! - `GET /v1/clubs/:club_id/notes/:id`
//! - `PUT /v1/clubs/:club_id/notes/:id` (officer)
//! - `DELETE /v1/clubs/:club_id/notes/:id` (officer)

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use clubsync_club::filter::sort_notes;
use clubsync_club::{MeetingNote, NoteFilter};
use clubsync_core::text::{MAX_BODY_LEN, MAX_NAME_LEN, MAX_TITLE_LEN};
use clubsync_core::{optional_text, RequiredText, ValidationError};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::find_in_club;
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NoteRequest {
    pub title: String,
    pub meeting_date: NaiveDate,
    #[serde(default)]
    pub content: String,
    /// Defaults to the caller's roster name.
    pub author: Option<String>,
}

impl Validate for NoteRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        let content = self.content.trim().to_string();
        if content.chars().count() > MAX_BODY_LEN {
            return Err(ValidationError::TooLong {
                field: "content",
                max: MAX_BODY_LEN,
            });
        }
        Ok(Self {
            title: RequiredText::new("title", &self.title, MAX_TITLE_LEN)?.into_inner(),
            meeting_date: self.meeting_date,
            content,
            author: optional_text("author", self.author.as_deref(), MAX_NAME_LEN)?,
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clubs/:club_id/notes", get(list_notes).post(create_note))
        .route(
            "/v1/clubs/:club_id/notes/:id",
            get(get_note).put(update_note).delete(delete_note),
        )
}

/// GET /v1/clubs/:club_id/notes: Search meeting notes.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/notes",
    params(("club_id" = Uuid, Path, description = "Club ID"), NoteFilter),
    responses((status = 200, description = "Notes, newest meeting first", body = Vec<MeetingNote>)),
    security(("bearer" = [])),
    tag = "notes"
)]
async fn list_notes(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<NoteFilter>, QueryRejection>,
) -> Result<Json<Vec<MeetingNote>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let filter = extract_query(query)?;
    let mut notes = state
        .notes
        .filter(|n| n.club_id == club_id && filter.matches(n));
    sort_notes(&mut notes);
    Ok(Json(notes))
}

/// POST /v1/clubs/:club_id/notes: Record a meeting.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/notes",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created", body = MeetingNote),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
async fn create_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MeetingNote>), AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    access.require_officer()?;
    let req = extract_validated_json(body)?;
    let now = Utc::now();
    let note = MeetingNote {
        id: Uuid::new_v4(),
        club_id,
        title: req.title,
        meeting_date: req.meeting_date,
        content: req.content,
        author: req.author.or(Some(access.member.name)),
        created_at: now,
        updated_at: now,
    };
    state.notes.insert(note.id, note.clone());
    state.commit(vec![Change::Note(note.clone())]).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// GET /v1/clubs/:club_id/notes/:id: One note.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/notes/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Note ID"),
    ),
    responses(
        (status = 200, description = "Note found", body = MeetingNote),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
async fn get_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MeetingNote>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    find_in_club(&state.notes, club_id, id).map(Json)
}

/// PUT /v1/clubs/:club_id/notes/:id: Replace a note.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/notes/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Note ID"),
    ),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated", body = MeetingNote),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
async fn update_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<Json<MeetingNote>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    find_in_club(&state.notes, club_id, id)?;
    let updated = state
        .notes
        .update(&id, |n| {
            n.title = req.title;
            n.meeting_date = req.meeting_date;
            n.content = req.content;
            n.author = req.author;
            n.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("meeting note", id))?;
    state.commit(vec![Change::Note(updated.clone())]).await?;
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/notes/:id: Delete a note.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/notes/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Note ID"),
    ),
    responses(
        (status = 204, description = "Note deleted"),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Note not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "notes"
)]
async fn delete_note(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    find_in_club(&state.notes, club_id, id)?;
    state.notes.remove(&id);
    state.commit(vec![Change::NoteDeleted(id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}
