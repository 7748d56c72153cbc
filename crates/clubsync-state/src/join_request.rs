//! # Join Request Lifecycle
//!
//! A join request is created `Pending` when a user submits a valid join
//! code. An officer then approves or rejects it exactly once; both outcomes
//! are terminal.

use clubsync_core::TransitionError;
use serde::{Deserialize, Serialize};

/// Status of a request to join a club.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    /// Awaiting an officer decision.
    Pending,
    /// Accepted; the requester is now on the roster. Terminal.
    Approved,
    /// Declined. Terminal.
    Rejected,
}

impl JoinRequestStatus {
    /// The canonical string name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Convert a canonical name back to a status.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    /// States reachable in one step.
    pub fn valid_transitions(&self) -> &'static [JoinRequestStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Move to `target`, or explain why that is not allowed.
    pub fn transition_to(self, target: JoinRequestStatus) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyDecided {
                kind: "join request",
                state: self.as_str().to_string(),
            });
        }
        if !self.valid_transitions().contains(&target) {
            return Err(TransitionError::InvalidTransition {
                kind: "join request",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        Ok(target)
    }
}

impl std::fmt::Display for JoinRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
