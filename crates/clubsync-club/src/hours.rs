//! # Volunteer Hours
//!
//! A member logs hours against an activity; an officer reviews the entry.
//! Editing a reviewed entry puts it back in the review queue.

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_core::{TransitionError, ValidationError};
use clubsync_state::HourStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Most hours a single entry may claim.
pub const MAX_HOURS_PER_ENTRY: f64 = 24.0;

/// A block of volunteer time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HourEntry {
    pub id: Uuid,
    pub club_id: Uuid,
    pub member_id: Uuid,
    pub date: NaiveDate,
    pub hours: f64,
    pub activity: String,
    pub description: Option<String>,
    pub status: HourStatus,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HourEntry {
    /// Record an officer's decision.
    pub fn review(
        &mut self,
        decision: HourStatus,
        reviewer: Uuid,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.status = self.status.transition_to(decision)?;
        self.reviewed_by = Some(reviewer);
        self.reviewed_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Return the entry to the review queue after an edit.
    pub fn resubmit(&mut self, at: DateTime<Utc>) {
        self.status = self.status.resubmit();
        self.reviewed_by = None;
        self.reviewed_at = None;
        self.updated_at = at;
    }
}

/// Check an hour amount: finite, positive, at most a day.
pub fn validate_hours(hours: f64) -> Result<f64, ValidationError> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "hours",
            reason: "must be greater than zero".to_string(),
        });
    }
    if hours > MAX_HOURS_PER_ENTRY {
        return Err(ValidationError::OutOfRange {
            field: "hours",
            reason: format!("must not exceed {MAX_HOURS_PER_ENTRY}"),
        });
    }
    Ok(hours)
}
