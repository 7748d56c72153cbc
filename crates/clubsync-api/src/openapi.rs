//! # OpenAPI Document
//!
//! Collects every `#[utoipa::path]` handler and the schemas they mention
//! into one OpenAPI document, served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Registers the session token scheme referenced by `security(("bearer" = []))`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "Session token returned by POST /v1/auth/sign-in.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ClubSync API",
        version = "0.3.0",
        description = "Club management for student organizations: rosters, meeting notes, attendance, volunteer hours, events, tasks and join-code membership requests.\n\nAuthentication: `Authorization: Bearer <token>` with a token from `POST /v1/auth/sign-in`. Every `/v1/*` route except sign-up and sign-in requires it. Health probes are unauthenticated.",
        license(name = "AGPL-3.0-or-later")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Auth
        crate::routes::auth::sign_up,
        crate::routes::auth::sign_in,
        crate::routes::auth::sign_out,
        crate::routes::auth::current_session,
        // Clubs
        crate::routes::clubs::create_club,
        crate::routes::clubs::list_clubs,
        crate::routes::clubs::get_club,
        crate::routes::clubs::update_club,
        crate::routes::clubs::delete_club,
        crate::routes::clubs::rotate_join_code,
        // Join requests
        crate::routes::join_requests::create_join_request,
        crate::routes::join_requests::list_my_requests,
        crate::routes::join_requests::list_club_requests,
        crate::routes::join_requests::approve_request,
        crate::routes::join_requests::reject_request,
        // Members
        crate::routes::members::list_members,
        crate::routes::members::create_member,
        crate::routes::members::get_member,
        crate::routes::members::update_member,
        crate::routes::members::delete_member,
        // Notes
        crate::routes::notes::list_notes,
        crate::routes::notes::create_note,
        crate::routes::notes::get_note,
        crate::routes::notes::update_note,
        crate::routes::notes::delete_note,
        // Attendance
        crate::routes::attendance::list_attendance,
        crate::routes::attendance::create_attendance,
        crate::routes::attendance::batch_attendance,
        crate::routes::attendance::update_attendance,
        crate::routes::attendance::delete_attendance,
        crate::routes::attendance::attendance_stats,
        // Hours
        crate::routes::hours::list_hours,
        crate::routes::hours::create_hours,
        crate::routes::hours::update_hours,
        crate::routes::hours::delete_hours,
        crate::routes::hours::approve_hours,
        crate::routes::hours::reject_hours,
        crate::routes::hours::leaderboard,
        // Events
        crate::routes::events::list_events,
        crate::routes::events::create_event,
        crate::routes::events::get_event,
        crate::routes::events::update_event,
        crate::routes::events::delete_event,
        // Tasks
        crate::routes::tasks::list_tasks,
        crate::routes::tasks::create_task,
        crate::routes::tasks::get_task,
        crate::routes::tasks::update_task,
        crate::routes::tasks::set_task_status,
        crate::routes::tasks::delete_task,
        // Dashboard
        crate::routes::dashboard::dashboard,
    ),
    components(schemas(
        // Records
        clubsync_club::UserProfile,
        clubsync_club::Club,
        clubsync_club::Member,
        clubsync_club::MemberStatus,
        clubsync_club::MeetingNote,
        clubsync_club::AttendanceRecord,
        clubsync_club::AttendanceStatus,
        clubsync_club::HourEntry,
        clubsync_club::Event,
        clubsync_club::EventWindow,
        clubsync_club::Task,
        clubsync_club::JoinRequest,
        clubsync_core::ClubRole,
        clubsync_core::JoinCode,
        clubsync_state::HourStatus,
        clubsync_state::JoinRequestStatus,
        clubsync_state::TaskStatus,
        clubsync_state::TaskPriority,
        // Analytics
        clubsync_club::ClubSummary,
        clubsync_club::MemberCounts,
        clubsync_club::Completion,
        clubsync_club::HourScope,
        clubsync_club::MemberAttendance,
        clubsync_club::Percentage,
        clubsync_club::VolunteerRank,
        // Errors
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        // DTOs
        crate::routes::auth::SignUpRequest,
        crate::routes::auth::SignInRequest,
        crate::routes::auth::SignInResponse,
        crate::routes::auth::SessionResponse,
        crate::routes::clubs::ClubRequest,
        crate::routes::clubs::ClubMembership,
        crate::routes::join_requests::CreateJoinRequest,
        crate::routes::members::MemberRequest,
        crate::routes::notes::NoteRequest,
        crate::routes::attendance::CreateAttendanceRequest,
        crate::routes::attendance::BatchAttendanceRequest,
        crate::routes::attendance::BatchEntry,
        crate::routes::attendance::UpdateAttendanceRequest,
        crate::routes::attendance::AttendanceStats,
        crate::routes::hours::HourRequest,
        crate::routes::hours::Leaderboard,
        crate::routes::events::EventRequest,
        crate::routes::tasks::TaskRequest,
        crate::routes::tasks::TaskStatusRequest,
        crate::middleware::metrics::MetricsSnapshot,
    )),
    tags(
        (name = "auth", description = "Accounts and sessions"),
        (name = "clubs", description = "Clubs and join codes"),
        (name = "join_requests", description = "Joining a club by code"),
        (name = "members", description = "Club roster"),
        (name = "notes", description = "Meeting notes"),
        (name = "attendance", description = "Attendance records and statistics"),
        (name = "hours", description = "Volunteer hours and review"),
        (name = "events", description = "Club calendar"),
        (name = "tasks", description = "Task assignment and progress"),
        (name = "dashboard", description = "Per-club summary"),
    )
)]
pub struct ApiDoc;

/// Serves the document at `/openapi.json`.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
