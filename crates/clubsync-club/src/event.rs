//! Scheduled club events.

use chrono::{DateTime, Utc};
use clubsync_core::ValidationError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An event on the club calendar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Event {
    pub id: Uuid,
    pub club_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    /// Never earlier than `starts_at`.
    pub ends_at: Option<DateTime<Utc>>,
    /// Free-form grouping such as "meeting" or "fundraiser".
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// An event is upcoming until it has finished. Events without an end
    /// time finish when they start.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.ends_at.unwrap_or(self.starts_at) >= now
    }
}

/// Reject an end time before the start time.
pub fn validate_schedule(
    starts_at: DateTime<Utc>,
    ends_at: Option<DateTime<Utc>>,
) -> Result<(), ValidationError> {
    match ends_at {
        Some(end) if end < starts_at => Err(ValidationError::OutOfRange {
            field: "ends_at",
            reason: "must not be before starts_at".to_string(),
        }),
        _ => Ok(()),
    }
}
