//! # Accounts & Sessions
//!
//! - `POST /v1/auth/sign-up`: create an account (public)
//! - `POST /v1/auth/sign-in`: exchange credentials for a session token (public)
//! - `POST /v1/auth/sign-out`: revoke the presented session
//! - `GET /v1/auth/session`: current user and the clubs they belong to

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use clubsync_club::{User, UserProfile};
use clubsync_core::text::MAX_NAME_LEN;
use clubsync_core::{Email, RequiredText, ValidationError};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{self, CallerIdentity, MAX_PASSWORD_LEN, MIN_PASSWORD_LEN};
use crate::error::AppError;
use crate::extractors::{extract_json, extract_validated_json, Validate};
use crate::persist::Change;
use crate::routes::clubs::{memberships_of, ClubMembership};
use crate::state::AppState;

// ── Request/Response DTOs ───────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpRequest {
    pub email: String,
    /// At least 8 characters.
    pub password: String,
    pub display_name: String,
}

impl Validate for SignUpRequest {
    fn validate(self) -> Result<Self, ValidationError> {
        let email = Email::parse(&self.email)?.into_inner();
        let display_name =
            RequiredText::new("display_name", &self.display_name, MAX_NAME_LEN)?.into_inner();
        let len = self.password.chars().count();
        if self.password.trim().is_empty() {
            return Err(ValidationError::Required { field: "password" });
        }
        if len < MIN_PASSWORD_LEN {
            return Err(ValidationError::OutOfRange {
                field: "password",
                reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }
        if len > MAX_PASSWORD_LEN {
            return Err(ValidationError::TooLong {
                field: "password",
                max: MAX_PASSWORD_LEN,
            });
        }
        Ok(Self {
            email,
            password: self.password,
            display_name,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SignInResponse {
    /// Present as `Authorization: Bearer {token}`.
    pub token: String,
    pub user: UserProfile,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub user: UserProfile,
    pub session_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub clubs: Vec<ClubMembership>,
}

// ── Router ──────────────────────────────────────────────────────────

/// Routes reachable without a session.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/sign-up", post(sign_up))
        .route("/v1/auth/sign-in", post(sign_in))
}

/// Routes that need a session.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/sign-out", post(sign_out))
        .route("/v1/auth/session", get(current_session))
}

// ── Handlers ────────────────────────────────────────────────────────

const BAD_CREDENTIALS: &str = "invalid email or password";

/// POST /v1/auth/sign-up: Create an account.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 409, description = "Email already registered", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let req = extract_validated_json(body)?;
    let salt = auth::new_salt();
    let password_digest = auth::hash_password(salt.clone(), req.password).await?;
    let user = User {
        id: Uuid::new_v4(),
        password_digest,
        password_salt: salt,
        email: req.email,
        display_name: req.display_name,
        created_at: Utc::now(),
    };

    state
        .users
        .insert_unique(user.id, user.clone(), |a, b| a.email == b.email)
        .map_err(|_| AppError::Conflict(format!("email {} is already registered", user.email)))?;
    state.commit(vec![Change::User(user.clone())]).await?;

    tracing::info!(user_id = %user.id, "account created");
    Ok((StatusCode::CREATED, Json(user.profile())))
}

/// POST /v1/auth/sign-in: Start a session.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 401, description = "Bad credentials", body = crate::error::ErrorBody),
    ),
    tag = "auth"
)]
async fn sign_in(
    State(state): State<AppState>,
    body: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>, AppError> {
    let req = extract_json(body)?;
    // No account can hold a longer password; refuse before hashing it.
    if req.password.chars().count() > MAX_PASSWORD_LEN {
        tracing::warn!("sign-in failed: oversized password");
        return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
    }
    let email = Email::parse(&req.email).ok();
    let user = email
        .as_ref()
        .and_then(|e| state.users.find(|u| u.email == e.as_str()));

    let matched = auth::check_password(user.clone(), req.password).await?;
    let user = match user {
        Some(u) if matched => u,
        Some(u) => {
            tracing::warn!(user_id = %u.id, "sign-in failed: wrong password");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        }
        None => {
            tracing::warn!("sign-in failed: unknown email");
            return Err(AppError::Unauthorized(BAD_CREDENTIALS.into()));
        }
    };

    let now = Utc::now();
    let expired = state.sessions.remove_where(|s| s.is_expired(now));
    if !expired.is_empty() {
        tracing::debug!(count = expired.len(), "pruned expired sessions");
    }

    let (token, session) = auth::issue_session(user.id, state.config.session_ttl, now);
    let expires_at = session.expires_at;
    state.sessions.insert(session.id, session);

    tracing::info!(user_id = %user.id, "signed in");
    Ok(Json(SignInResponse {
        token: token.to_string(),
        user: user.profile(),
        expires_at,
    }))
}

/// POST /v1/auth/sign-out: Revoke the current session.
#[utoipa::path(
    post,
    path = "/v1/auth/sign-out",
    responses((status = 204, description = "Signed out")),
    security(("bearer" = [])),
    tag = "auth"
)]
async fn sign_out(State(state): State<AppState>, caller: CallerIdentity) -> StatusCode {
    state.sessions.remove(&caller.session_id);
    tracing::info!(user_id = %caller.user_id, "signed out");
    StatusCode::NO_CONTENT
}

/// GET /v1/auth/session: Current user and club memberships.
#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "No valid session", body = crate::error::ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
async fn current_session(
    State(state): State<AppState>,
    caller: CallerIdentity,
) -> Result<Json<SessionResponse>, AppError> {
    let user = state
        .users
        .get(&caller.user_id)
        .ok_or_else(|| AppError::Unauthorized("unknown or revoked session".into()))?;
    let session = state
        .sessions
        .get(&caller.session_id)
        .ok_or_else(|| AppError::Unauthorized("unknown or revoked session".into()))?;
    Ok(Json(SessionResponse {
        user: user.profile(),
        session_id: session.id,
        expires_at: session.expires_at,
        clubs: memberships_of(&state, caller.user_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(email: &str, password: &str, name: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: password.into(),
            display_name: name.into(),
        }
    }

    #[test]
    fn sign_up_normalizes_email_and_name() {
        let req = sign_up("  Riley@Example.ORG ", "long enough", "  Riley  ")
            .validate()
            .unwrap();
        assert_eq!(req.email, "riley@example.org");
        assert_eq!(req.display_name, "Riley");
        assert_eq!(req.password, "long enough");
    }

    #[test]
    fn sign_up_rejects_short_password() {
        let err = sign_up("r@example.org", "short", "Riley")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { field: "password", .. }));
    }

    #[test]
    fn sign_up_requires_fields() {
        assert_eq!(
            sign_up("r@example.org", "long enough", " ").validate().unwrap_err(),
            ValidationError::Required { field: "display_name" }
        );
        assert!(matches!(
            sign_up("not-an-email", "long enough", "Riley").validate(),
            Err(ValidationError::InvalidEmail(_))
        ));
    }
}
