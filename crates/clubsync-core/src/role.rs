//! # Club Roles
//!
//! A user's standing inside one club. Officers have full read/write access
//! to the club's data; members can read and contribute their own records.

use serde::{Deserialize, Serialize};

/// Role of a roster member within a club, ordered by privilege.
///
/// The `Ord` derivation follows declaration order, `Member < Officer`, so
/// `>=` expresses "at least this role".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ClubRole {
    /// Regular member.
    Member,
    /// Club officer with full access.
    Officer,
}

impl ClubRole {
    /// Return the string representation of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Officer => "officer",
        }
    }

    /// Parse a role from its string representation.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "member" => Some(Self::Member),
            "officer" => Some(Self::Officer),
            _ => None,
        }
    }

    /// Whether this role is at least `minimum`.
    pub fn has_role(&self, minimum: ClubRole) -> bool {
        *self >= minimum
    }
}

impl std::fmt::Display for ClubRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn officer_outranks_member() {
        assert!(ClubRole::Member < ClubRole::Officer);
        assert!(ClubRole::Officer.has_role(ClubRole::Member));
        assert!(!ClubRole::Member.has_role(ClubRole::Officer));
    }

    #[test]
    fn names_round_trip() {
        for role in [ClubRole::Member, ClubRole::Officer] {
            assert_eq!(ClubRole::from_name(role.as_str()), Some(role));
        }
        assert_eq!(ClubRole::from_name("president"), None);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClubRole::Officer).unwrap(),
            "\"officer\""
        );
    }
}
