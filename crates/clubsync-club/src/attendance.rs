//! Attendance records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How a member was marked for a meeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::Excused => "excused",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            "excused" => Some(Self::Excused),
            _ => None,
        }
    }

    /// Present or late.
    pub fn attended(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }

    /// Excused absences are left out of attendance rates entirely.
    pub fn counted(&self) -> bool {
        !matches!(self, Self::Excused)
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One member's attendance on one date, optionally tied to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub club_id: Uuid,
    pub member_id: Uuid,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub event_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Uniqueness key: a member has at most one record per (date, event).
pub type AttendanceSlot = (Uuid, NaiveDate, Option<Uuid>);

impl AttendanceRecord {
    pub fn slot(&self) -> AttendanceSlot {
        (self.member_id, self.date, self.event_id)
    }
}
