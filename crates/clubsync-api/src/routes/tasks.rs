//! # Tasks
//!
//! - `GET /v1/clubs/:club_id/tasks`: open work first; `status`, `assignee_id`, `priority`
//! - `POST /v1/clubs/:club_id/tasks` (officer)
//! - `GET /v1/clubs/:club_id/tasks/:id`
//! - `PUT /v1/clubs/:club_id/tasks/:id`: edit details (officer)
//! - `PUT /v1/clubs/:club_id/tasks/:id/status`: officer or assignee
//! - `DELETE /v1/clubs/:club_id/tasks/:id` (officer)
//!
//! Status only changes through the status endpoint, so `completed_at` is
//! always set by the lifecycle.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use clubsync_club::filter::sort_tasks;
use clubsync_club::{Task, TaskFilter};
use clubsync_core::text::{MAX_BODY_LEN, MAX_TITLE_LEN};
use clubsync_core::{optional_text, RequiredText, ValidationError};
use clubsync_state::{TaskPriority, TaskStatus};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{CallerIdentity, ClubAccess};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_query, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::{check_member_ref, find_in_club};
use crate::state::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskRequest {
    pub title: String,
    pub description: Option<String>,
    /// Member id.
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    /// Defaults to `medium`.
    pub priority: Option<TaskPriority>,
}

impl Validate for TaskRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: RequiredText::new("title", &self.title, MAX_TITLE_LEN)?.into_inner(),
            description: optional_text("description", self.description.as_deref(), MAX_BODY_LEN)?,
            ..self
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TaskStatusRequest {
    pub status: TaskStatus,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/clubs/:club_id/tasks", get(list_tasks).post(create_task))
        .route(
            "/v1/clubs/:club_id/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route("/v1/clubs/:club_id/tasks/:id/status", put(set_task_status))
}

/// GET /v1/clubs/:club_id/tasks: List tasks.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/tasks",
    params(("club_id" = Uuid, Path, description = "Club ID"), TaskFilter),
    responses((status = 200, description = "Tasks, open work first", body = Vec<Task>)),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn list_tasks(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    query: Result<Query<TaskFilter>, QueryRejection>,
) -> Result<Json<Vec<Task>>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    let filter = extract_query(query)?;
    let mut tasks = state
        .tasks
        .filter(|t| t.club_id == club_id && filter.matches(t));
    sort_tasks(&mut tasks);
    Ok(Json(tasks))
}

/// POST /v1/clubs/:club_id/tasks: Create a task.
#[utoipa::path(
    post,
    path = "/v1/clubs/{club_id}/tasks",
    params(("club_id" = Uuid, Path, description = "Club ID")),
    request_body = TaskRequest,
    responses(
        (status = 201, description = "Task created", body = Task),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn create_task(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path(club_id): Path<Uuid>,
    body: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Task>), AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    if let Some(assignee) = req.assignee_id {
        check_member_ref(&state.members, club_id, assignee)?;
    }
    let now = Utc::now();
    let task = Task {
        id: Uuid::new_v4(),
        club_id,
        title: req.title,
        description: req.description,
        assignee_id: req.assignee_id,
        due_date: req.due_date,
        priority: req.priority.unwrap_or_default(),
        status: TaskStatus::Todo,
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    state.tasks.insert(task.id, task.clone());
    state.commit(vec![Change::Task(task.clone())]).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /v1/clubs/:club_id/tasks/:id: One task.
#[utoipa::path(
    get,
    path = "/v1/clubs/{club_id}/tasks/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    responses(
        (status = 200, description = "Task found", body = Task),
        (status = 404, description = "Task not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn get_task(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Task>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?;
    find_in_club(&state.tasks, club_id, id).map(Json)
}

/// PUT /v1/clubs/:club_id/tasks/:id: Edit a task's details.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/tasks/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated", body = Task),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Task not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn update_task(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    let req = extract_validated_json(body)?;
    if let Some(assignee) = req.assignee_id {
        check_member_ref(&state.members, club_id, assignee)?;
    }
    let current = find_in_club(&state.tasks, club_id, id)?;
    let updated = state
        .tasks
        .update(&id, |t| {
            t.title = req.title;
            t.description = req.description;
            t.assignee_id = req.assignee_id;
            t.due_date = req.due_date;
            t.priority = req.priority.unwrap_or(current.priority);
            t.updated_at = Utc::now();
        })
        .ok_or_else(|| AppError::not_found("task", id))?;
    state.commit(vec![Change::Task(updated.clone())]).await?;
    Ok(Json(updated))
}

/// PUT /v1/clubs/:club_id/tasks/:id/status: Move a task along.
#[utoipa::path(
    put,
    path = "/v1/clubs/{club_id}/tasks/{id}/status",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    request_body = TaskStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = Task),
        (status = 403, description = "Neither officer nor assignee", body = crate::error::ErrorBody),
        (status = 409, description = "Transition not allowed", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn set_task_status(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
    body: Result<Json<TaskStatusRequest>, JsonRejection>,
) -> Result<Json<Task>, AppError> {
    let access = ClubAccess::resolve(&state, &caller, club_id)?;
    let req = extract_json(body)?;
    let not_found = || AppError::not_found("task", id);
    let updated = state
        .tasks
        .try_update(&id, |t| {
            if t.club_id != club_id {
                return Err(not_found());
            }
            if !access.is_officer() && t.assignee_id != Some(access.member.id) {
                return Err(AppError::Forbidden(
                    "only officers and the assignee may change a task's status".into(),
                ));
            }
            t.set_status(req.status, Utc::now())?;
            Ok(t.clone())
        })
        .ok_or_else(not_found)??;
    state.commit(vec![Change::Task(updated.clone())]).await?;

    tracing::debug!(%club_id, task_id = %id, status = %updated.status, "task status changed");
    Ok(Json(updated))
}

/// DELETE /v1/clubs/:club_id/tasks/:id: Delete a task.
#[utoipa::path(
    delete,
    path = "/v1/clubs/{club_id}/tasks/{id}",
    params(
        ("club_id" = Uuid, Path, description = "Club ID"),
        ("id" = Uuid, Path, description = "Task ID"),
    ),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 403, description = "Officer role required", body = crate::error::ErrorBody),
        (status = 404, description = "Task not found", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "tasks"
)]
async fn delete_task(
    State(state): State<AppState>,
    caller: CallerIdentity,
    Path((club_id, id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    ClubAccess::resolve(&state, &caller, club_id)?.require_officer()?;
    find_in_club(&state.tasks, club_id, id)?;
    state.tasks.remove(&id);
    state.commit(vec![Change::TaskDeleted(id)]).await?;
    Ok(StatusCode::NO_CONTENT)
}
