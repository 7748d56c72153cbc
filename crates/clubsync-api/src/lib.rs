//! # clubsync-api: HTTP Service for ClubSync
//!
//! Accounts and sessions, per-club authorization, CRUD for everything a
//! club tracks, the join-code membership workflow and the per-club
//! dashboard, persisted to Postgres and/or a JSON snapshot file.
//!
//! ## API Surface
//!
//! | Prefix                               | Module                     |
//! |--------------------------------------|----------------------------|
//! | `/v1/auth/*`                         | [`routes::auth`]           |
//! | `/v1/clubs`, `/v1/clubs/:club_id`    | [`routes::clubs`]          |
//! | `/v1/join-requests/*`                | [`routes::join_requests`]  |
//! | `/v1/clubs/:club_id/members/*`       | [`routes::members`]        |
//! | `/v1/clubs/:club_id/notes/*`         | [`routes::notes`]          |
//! | `/v1/clubs/:club_id/attendance/*`    | [`routes::attendance`]     |
//! | `/v1/clubs/:club_id/hours/*`         | [`routes::hours`]          |
//! | `/v1/clubs/:club_id/events/*`        | [`routes::events`]         |
//! | `/v1/clubs/:club_id/tasks/*`         | [`routes::tasks`]          |
//! | `/v1/clubs/:club_id/dashboard`       | [`routes::dashboard`]      |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → AuthMiddleware → RateLimitMiddleware → Handler
//! ```
//!
//! Sign-up, sign-in and `/openapi.json` skip the auth layer and are rate
//! limited under the shared `anonymous` key. Protected requests the auth
//! layer rejects are charged to the same key. Health probes and `/metrics`
//! sit outside everything but tracing.

pub mod auth;
pub mod db;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod persist;
pub mod routes;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::get;
use axum::{Extension, Json, Router};

use crate::middleware::metrics::{ApiMetrics, MetricsSnapshot};
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};
use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let limiter = RateLimiter::new(RateLimitConfig::per_minute(
        state.config.rate_limit_per_minute,
    ));

    // Routes that need a session.
    let protected = Router::new()
        .merge(routes::auth::router())
        .merge(routes::clubs::router())
        .merge(routes::join_requests::router())
        .merge(routes::members::router())
        .merge(routes::notes::router())
        .merge(routes::attendance::router())
        .merge(routes::hours::router())
        .merge(routes::events::router())
        .merge(routes::tasks::router())
        .merge(routes::dashboard::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), auth::auth_middleware));

    let public = Router::new()
        .merge(routes::auth::public_router())
        .merge(openapi::router())
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware));

    let mut api = Router::new()
        .merge(public)
        .merge(protected)
        .layer(Extension(limiter));

    let mut ops = Router::new()
        .route("/health/liveness", get(liveness))
        .route("/health/readiness", get(readiness));

    if state.config.metrics_enabled {
        let metrics = ApiMetrics::new();
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
        ops = ops.route("/metrics", get(metrics_json).layer(Extension(metrics)));
    }

    Router::new()
        .merge(ops)
        .merge(api)
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Liveness probe: 200 while the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 once the database (if any) answers.
async fn readiness(State(state): State<AppState>) -> (StatusCode, &'static str) {
    let Some(pool) = state.db_pool.as_ref() else {
        return (StatusCode::OK, "ready");
    };
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => (StatusCode::OK, "ready"),
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed: database unreachable");
            (StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
        }
    }
}

/// GET /metrics: request counters since startup.
async fn metrics_json(Extension(metrics): Extension<ApiMetrics>) -> Json<MetricsSnapshot> {
    Json(metrics.snapshot())
}
