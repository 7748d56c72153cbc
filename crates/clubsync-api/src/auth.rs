//! # Authentication & Club Authorization
//!
//! Password accounts with bearer session tokens, plus the per-club access
//! check every club-scoped handler runs first.
//!
//! ## Token Format
//!
//! ```text
//! Bearer {session_uuid}.{secret_hex}
//! ```
//!
//! The secret is 32 random bytes. Only its SHA-256 digest is kept in the
//! session store, and the presented secret is compared against it in
//! constant time. Sessions expire after `AppConfig::session_ttl`.
//!
//! ## CallerIdentity
//!
//! The auth middleware injects a [`CallerIdentity`] into the request
//! extensions. Handlers extract it via the `FromRequestParts` impl and then
//! call [`ClubAccess::resolve`] to learn the caller's role in the addressed
//! club.

use axum::extract::{Request, State};
use axum::http::request::Parts;
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use clubsync_club::{Club, Member, User};
use clubsync_core::ClubRole;
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::AppError;
use crate::middleware::rate_limit::{charge, ClientKey};
use crate::state::AppState;

/// SHA-256 rounds applied to `salt || password`.
pub const PASSWORD_ROUNDS: u32 = 10_000;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Upper bound on password length, to keep hashing cost bounded.
pub const MAX_PASSWORD_LEN: usize = 256;

const SECRET_LEN: usize = 32;
const SALT_LEN: usize = 16;

// ── Hashing ─────────────────────────────────────────────────────────────────

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn from_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(s.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Fresh random salt, hex-encoded.
pub fn new_salt() -> String {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    to_hex(&salt)
}

/// Iterated, salted SHA-256 of a password, hex-encoded.
pub fn password_digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = Zeroizing::new([0u8; 32]);
    digest.copy_from_slice(&hasher.finalize());
    for _ in 1..PASSWORD_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(&digest[..]);
        hasher.update(password.as_bytes());
        digest.copy_from_slice(&hasher.finalize());
    }
    to_hex(&digest[..])
}

/// Check a password against a user's stored digest in constant time.
pub fn verify_password(user: &User, password: &str) -> bool {
    let computed = password_digest(&user.password_salt, password);
    computed
        .as_bytes()
        .ct_eq(user.password_digest.as_bytes())
        .into()
}

/// Burn the same hashing cost as [`verify_password`] for an unknown email,
/// so response timing does not reveal which addresses are registered.
pub fn verify_password_dummy(password: &str) {
    let _ = password_digest("00000000000000000000000000000000", password);
}

/// [`password_digest`] on the blocking pool.
pub async fn hash_password(salt: String, password: String) -> Result<String, AppError> {
    let password = Zeroizing::new(password);
    tokio::task::spawn_blocking(move || password_digest(&salt, &password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))
}

/// [`verify_password`] on the blocking pool. `None` pays the dummy cost
/// and never matches.
pub async fn check_password(user: Option<User>, password: String) -> Result<bool, AppError> {
    let password = Zeroizing::new(password);
    tokio::task::spawn_blocking(move || match &user {
        Some(user) => verify_password(user, &password),
        None => {
            verify_password_dummy(&password);
            false
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("password check task failed: {e}")))
}

// ── Sessions ────────────────────────────────────────────────────────────────

/// A signed-in session. Lives only in memory.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Hex SHA-256 of the token secret.
    pub secret_digest: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

fn secret_digest(secret: &[u8]) -> String {
    to_hex(&Sha256::digest(secret))
}

/// Create a session for `user_id`. Returns the bearer token, which is not
/// stored anywhere, together with the session record to store.
pub fn issue_session(
    user_id: Uuid,
    ttl: chrono::Duration,
    now: DateTime<Utc>,
) -> (Zeroizing<String>, Session) {
    let mut secret = Zeroizing::new([0u8; SECRET_LEN]);
    OsRng.fill_bytes(&mut secret[..]);
    let session = Session {
        id: Uuid::new_v4(),
        user_id,
        secret_digest: secret_digest(&secret[..]),
        created_at: now,
        expires_at: now + ttl,
    };
    let token = Zeroizing::new(format!("{}.{}", session.id, to_hex(&secret[..])));
    (token, session)
}

/// Split a bearer token into session id and raw secret bytes.
pub fn parse_token(token: &str) -> Option<(Uuid, Zeroizing<Vec<u8>>)> {
    let (id, secret_hex) = token.split_once('.')?;
    let id = id.parse::<Uuid>().ok()?;
    let secret = from_hex(secret_hex).filter(|s| s.len() == SECRET_LEN)?;
    Some((id, Zeroizing::new(secret)))
}

/// Resolve a bearer token to a caller. Expired sessions are removed.
pub fn authenticate(
    state: &AppState,
    token: &str,
    now: DateTime<Utc>,
) -> Result<CallerIdentity, &'static str> {
    let (session_id, secret) = parse_token(token).ok_or("malformed session token")?;
    let session = state
        .sessions
        .get(&session_id)
        .ok_or("unknown or revoked session")?;
    let presented = secret_digest(&secret);
    if !bool::from(presented.as_bytes().ct_eq(session.secret_digest.as_bytes())) {
        return Err("unknown or revoked session");
    }
    if session.is_expired(now) {
        state.sessions.remove(&session_id);
        return Err("session expired");
    }
    if !state.users.contains(&session.user_id) {
        return Err("unknown or revoked session");
    }
    Ok(CallerIdentity {
        user_id: session.user_id,
        session_id,
    })
}

// ── CallerIdentity ──────────────────────────────────────────────────────────

/// The authenticated caller, injected by [`auth_middleware`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub user_id: Uuid,
    pub session_id: Uuid,
}

#[axum::async_trait]
impl<S: Send + Sync> axum::extract::FromRequestParts<S> for CallerIdentity {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CallerIdentity>()
            .copied()
            .ok_or_else(|| AppError::Unauthorized("no caller identity in request context".into()))
    }
}

// ── Club Access ─────────────────────────────────────────────────────────────

/// The caller's standing in one club.
#[derive(Debug, Clone)]
pub struct ClubAccess {
    pub club: Club,
    /// The caller's own roster entry.
    pub member: Member,
}

impl ClubAccess {
    /// Look up the club and the caller's membership in it.
    ///
    /// Unknown clubs and clubs the caller does not belong to are both 404,
    /// so club ids cannot be probed.
    pub fn resolve(
        state: &AppState,
        caller: &CallerIdentity,
        club_id: Uuid,
    ) -> Result<Self, AppError> {
        let not_found = || AppError::not_found("club", club_id);
        let club = state.clubs.get(&club_id).ok_or_else(not_found)?;
        let member = state
            .members
            .find(|m| m.club_id == club_id && m.user_id == Some(caller.user_id))
            .ok_or_else(not_found)?;
        Ok(Self { club, member })
    }

    pub fn role(&self) -> ClubRole {
        self.member.role
    }

    pub fn is_officer(&self) -> bool {
        self.member.role.has_role(ClubRole::Officer)
    }

    /// 403 unless the caller is an officer of the club.
    pub fn require_officer(&self) -> Result<(), AppError> {
        if self.is_officer() {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "role '{}' required, caller has '{}'",
                ClubRole::Officer.as_str(),
                self.member.role.as_str()
            )))
        }
    }
}

// ── Middleware ───────────────────────────────────────────────────────────────

/// Validate the Bearer session token and inject [`CallerIdentity`].
///
/// Rejected requests are charged to the anonymous rate-limit window, so
/// guessing tokens is throttled like the public routes.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let outcome = match request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        Some(header_value) if header_value.starts_with("Bearer ") => {
            authenticate(&state, header_value[7..].trim(), Utc::now()).map_err(|msg| {
                tracing::warn!(reason = %msg, "authentication failed: invalid session token");
                msg
            })
        }
        Some(_) => {
            tracing::warn!("authentication failed: non-Bearer authorization scheme");
            Err("authorization header must use Bearer scheme")
        }
        None => {
            tracing::warn!("authentication failed: missing authorization header");
            Err("missing authorization header")
        }
    };

    match outcome {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(msg) => match charge(&request, ClientKey::Anonymous) {
            Some(refused) => refused,
            None => AppError::Unauthorized(msg.to_string()).into_response(),
        },
    }
}
