//! Roster entries.

use chrono::{DateTime, Utc};
use clubsync_core::ClubRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a roster entry is currently participating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    #[default]
    Active,
    Inactive,
}

impl MemberStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person on a club's roster.
///
/// `user_id` links the entry to a sign-in account. Officers may also add
/// people who never sign in (guests, alumni), in which case it is `None`.
/// A club has at most one member per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Member {
    pub id: Uuid,
    pub club_id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub email: Option<String>,
    pub role: ClubRole,
    /// Free-form title such as "Treasurer".
    pub position: Option<String>,
    pub grade: Option<String>,
    pub status: MemberStatus,
    pub joined_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Whether this entry grants officer privileges.
    pub fn is_officer(&self) -> bool {
        self.role == ClubRole::Officer
    }
}

/// Number of officers on a roster.
pub fn officer_count<'a>(members: impl IntoIterator<Item = &'a Member>) -> usize {
    members.into_iter().filter(|m| m.is_officer()).count()
}
