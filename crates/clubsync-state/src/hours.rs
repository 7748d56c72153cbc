//! # Volunteer-Hour Review
//!
//! Members log hours as `Pending`; an officer approves or rejects them.
//! Editing an entry sends it back to `Pending` for another review, which is
//! modelled by [`HourStatus::resubmit`] rather than as a table edge so that
//! officers cannot "un-decide" an entry directly.

use clubsync_core::TransitionError;
use serde::{Deserialize, Serialize};

/// Review status of a volunteer-hour entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HourStatus {
    /// Logged, awaiting review.
    Pending,
    /// Counted toward totals.
    Approved,
    /// Not counted.
    Rejected,
}

impl HourStatus {
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

    /// Review decisions available from this status.
    pub fn valid_transitions(&self) -> &'static [HourStatus] {
        match self {
            Self::Pending => &[Self::Approved, Self::Rejected],
            Self::Approved | Self::Rejected => &[],
        }
    }

    /// Whether the entry has been reviewed.
    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Apply a review decision.
    pub fn transition_to(self, target: HourStatus) -> Result<Self, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError::AlreadyDecided {
                kind: "hour entry",
                state: self.as_str().to_string(),
            });
        }
        if !self.valid_transitions().contains(&target) {
            return Err(TransitionError::InvalidTransition {
                kind: "hour entry",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            });
        }
        Ok(target)
    }

    /// Status after the submitter edits the entry.
    pub fn resubmit(self) -> Self {
        Self::Pending
    }

    /// Whether hours in this status count toward totals under `include_pending`.
    pub fn counts(&self, include_pending: bool) -> bool {
        match self {
            Self::Approved => true,
            Self::Pending => include_pending,
            Self::Rejected => false,
        }
    }
}

impl std::fmt::Display for HourStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
