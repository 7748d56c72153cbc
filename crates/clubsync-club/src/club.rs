//! The club record: the tenant that owns every other record.

use chrono::{DateTime, Utc};
use clubsync_core::{JoinCode, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound accepted for a club's volunteer-hour goal.
pub const MAX_HOUR_GOAL: f64 = 100_000.0;

/// A club (student organization).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Club {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Unique across all clubs; compared case-insensitively.
    pub join_code: JoinCode,
    /// Target total of approved volunteer hours, if the club tracks one.
    pub hour_goal: Option<f64>,
    /// User who created the club.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validate an optional hour goal. `None` clears the goal.
pub fn validate_hour_goal(goal: Option<f64>) -> Result<Option<f64>, ValidationError> {
    match goal {
        None => Ok(None),
        Some(g) if !g.is_finite() || g <= 0.0 => Err(ValidationError::OutOfRange {
            field: "hour_goal",
            reason: "must be a positive number".to_string(),
        }),
        Some(g) if g > MAX_HOUR_GOAL => Err(ValidationError::OutOfRange {
            field: "hour_goal",
            reason: format!("must not exceed {MAX_HOUR_GOAL}"),
        }),
        Some(g) => Ok(Some(g)),
    }
}
