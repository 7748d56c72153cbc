//! # Club Dashboard
//!
//! [`ClubSummary`] is the one-screen overview of a club. It is computed on
//! demand from the club's record lists; nothing here is stored.

use chrono::{DateTime, Utc};
use clubsync_core::ClubRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analytics::{self, Completion, HourScope, Percentage, VolunteerRank};
use crate::attendance::AttendanceRecord;
use crate::club::Club;
use crate::event::Event;
use crate::hours::HourEntry;
use crate::join_request::JoinRequest;
use crate::member::{Member, MemberStatus};
use crate::note::MeetingNote;
use crate::task::Task;

/// How many volunteers the dashboard ranks.
pub const DASHBOARD_TOP_VOLUNTEERS: usize = 5;

/// Every record list belonging to one club.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubData {
    pub members: Vec<Member>,
    pub notes: Vec<MeetingNote>,
    pub attendance: Vec<AttendanceRecord>,
    pub hours: Vec<HourEntry>,
    pub events: Vec<Event>,
    pub tasks: Vec<Task>,
    pub join_requests: Vec<JoinRequest>,
}

/// Roster head-counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MemberCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub officers: usize,
}

impl MemberCounts {
    pub fn tally(members: &[Member]) -> Self {
        members.iter().fold(Self::default(), |mut c, m| {
            c.total += 1;
            match m.status {
                MemberStatus::Active => c.active += 1,
                MemberStatus::Inactive => c.inactive += 1,
            }
            if m.role == ClubRole::Officer {
                c.officers += 1;
            }
            c
        })
    }
}

/// Dashboard aggregate for one club.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ClubSummary {
    pub club_id: Uuid,
    pub club_name: String,
    pub members: MemberCounts,
    pub attendance_rate: Option<Percentage>,
    pub average_attendance: Option<f64>,
    pub meeting_notes: usize,
    pub total_approved_hours: f64,
    pub pending_hour_entries: usize,
    pub hour_goal: Option<f64>,
    pub hour_goal_progress: Option<Percentage>,
    pub top_volunteers: Vec<VolunteerRank>,
    pub tasks: Completion,
    pub overdue_tasks: usize,
    pub upcoming_events: usize,
    pub pending_join_requests: usize,
    pub generated_at: DateTime<Utc>,
}

impl ClubSummary {
    pub fn compute(club: &Club, data: &ClubData, now: DateTime<Utc>) -> Self {
        let total_approved_hours = analytics::total_hours(&data.hours, HourScope::Approved);
        let today = now.date_naive();
        Self {
            club_id: club.id,
            club_name: club.name.clone(),
            members: MemberCounts::tally(&data.members),
            attendance_rate: analytics::attendance_rate(&data.attendance),
            average_attendance: analytics::average_attendance(&data.attendance),
            meeting_notes: data.notes.len(),
            total_approved_hours,
            pending_hour_entries: data
                .hours
                .iter()
                .filter(|h| !h.status.is_terminal())
                .count(),
            hour_goal: club.hour_goal,
            hour_goal_progress: analytics::hour_goal_progress(total_approved_hours, club.hour_goal),
            top_volunteers: analytics::top_volunteers(
                &data.hours,
                &data.members,
                DASHBOARD_TOP_VOLUNTEERS,
                HourScope::Approved,
            ),
            tasks: analytics::task_completion(&data.tasks),
            overdue_tasks: data.tasks.iter().filter(|t| t.is_overdue(today)).count(),
            upcoming_events: data.events.iter().filter(|e| e.is_upcoming(now)).count(),
            pending_join_requests: data.join_requests.iter().filter(|r| r.is_pending()).count(),
            generated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use clubsync_core::JoinCode;
    use clubsync_state::{HourStatus, JoinRequestStatus, TaskPriority, TaskStatus};

    fn club(goal: Option<f64>) -> Club {
        let now = Utc::now();
        Club {
            id: Uuid::new_v4(),
            name: "Key Club".into(),
            description: None,
            join_code: JoinCode::parse("KEYCLUB1").unwrap(),
            hour_goal: goal,
            created_by: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        }
    }

    fn member(club_id: Uuid, name: &str, role: ClubRole, status: MemberStatus) -> Member {
        let now = Utc::now();
        Member {
            id: Uuid::new_v4(),
            club_id,
            user_id: None,
            name: name.into(),
            email: None,
            role,
            position: None,
            grade: None,
            status,
            joined_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn empty_club_summary() {
        let c = club(None);
        let s = ClubSummary::compute(&c, &ClubData::default(), Utc::now());
        assert_eq!(s.members, MemberCounts::default());
        assert_eq!(s.attendance_rate, None);
        assert_eq!(s.average_attendance, None);
        assert_eq!(s.total_approved_hours, 0.0);
        assert_eq!(s.hour_goal_progress, None);
        assert!(s.top_volunteers.is_empty());
        assert_eq!(s.tasks.percent.value(), 0.0);
    }

    #[test]
    fn summary_aggregates_lists() {
        let c = club(Some(10.0));
        let now = Utc::now();
        let lead = member(c.id, "Priya", ClubRole::Officer, MemberStatus::Active);
        let alum = member(c.id, "Omar", ClubRole::Member, MemberStatus::Inactive);
        let hour = |member_id, hours, status| HourEntry {
            id: Uuid::new_v4(),
            club_id: c.id,
            member_id,
            date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            hours,
            activity: "Park cleanup".into(),
            description: None,
            status,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        let data = ClubData {
            hours: vec![
                hour(lead.id, 4.0, HourStatus::Approved),
                hour(alum.id, 3.0, HourStatus::Pending),
            ],
            events: vec![Event {
                id: Uuid::new_v4(),
                club_id: c.id,
                title: "Car wash".into(),
                description: None,
                location: None,
                starts_at: now + Duration::days(3),
                ends_at: None,
                category: None,
                created_at: now,
                updated_at: now,
            }],
            tasks: vec![Task {
                id: Uuid::new_v4(),
                club_id: c.id,
                title: "Book venue".into(),
                description: None,
                assignee_id: Some(lead.id),
                due_date: Some(now.date_naive() - Duration::days(1)),
                priority: TaskPriority::High,
                status: TaskStatus::Todo,
                completed_at: None,
                created_at: now,
                updated_at: now,
            }],
            join_requests: vec![JoinRequest {
                id: Uuid::new_v4(),
                club_id: c.id,
                user_id: Uuid::new_v4(),
                name: "Sam".into(),
                email: "sam@example.org".into(),
                message: None,
                status: JoinRequestStatus::Pending,
                decided_by: None,
                decided_at: None,
                created_at: now,
            }],
            members: vec![lead.clone(), alum],
            ..Default::default()
        };

        let s = ClubSummary::compute(&c, &data, now);
        assert_eq!(
            s.members,
            MemberCounts {
                total: 2,
                active: 1,
                inactive: 1,
                officers: 1
            }
        );
        assert_eq!(s.total_approved_hours, 4.0);
        assert_eq!(s.pending_hour_entries, 1);
        assert_eq!(s.hour_goal_progress.unwrap().value(), 40.0);
        assert_eq!(s.top_volunteers.len(), 1);
        assert_eq!(s.top_volunteers[0].member_id, lead.id);
        assert_eq!(s.upcoming_events, 1);
        assert_eq!(s.overdue_tasks, 1);
        assert_eq!(s.pending_join_requests, 1);
    }
}
