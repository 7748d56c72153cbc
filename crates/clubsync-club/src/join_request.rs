//! # Join Requests
//!
//! A signed-in user who knows a club's join code files a request. The
//! request carries a copy of the user's name and email so officers can
//! review it without access to the account store. Approval is what puts the
//! user on the roster; the HTTP layer creates the member record.

use chrono::{DateTime, Utc};
use clubsync_core::TransitionError;
use clubsync_state::JoinRequestStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's request to join a club.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct JoinRequest {
    pub id: Uuid,
    pub club_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub message: Option<String>,
    pub status: JoinRequestStatus,
    /// User id of the deciding officer.
    pub decided_by: Option<Uuid>,
    pub decided_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl JoinRequest {
    /// Apply an officer's decision. Fails if the request was already decided.
    pub fn decide(
        &mut self,
        decision: JoinRequestStatus,
        officer: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = self.status.transition_to(decision)?;
        self.decided_by = Some(officer);
        self.decided_at = Some(at);
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}
