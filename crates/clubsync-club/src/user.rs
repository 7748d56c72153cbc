//! Accounts that can sign in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored account, including its credential digest.
///
/// This is the persisted shape. Anything sent to a client goes through
/// [`User::profile`], which drops the credential fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Lowercased; unique across the service.
    pub email: String,
    pub display_name: String,
    /// Hex-encoded SHA-256 of `salt || password`.
    pub password_digest: String,
    /// Hex-encoded random salt.
    pub password_salt: String,
    pub created_at: DateTime<Utc>,
}

/// Public view of a [`User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Strip credentials for API output.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            created_at: self.created_at,
        }
    }
}
