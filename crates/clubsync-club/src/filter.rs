//! # List Filters
//!
//! Query-string filters for the list endpoints, and the canonical ordering
//! of each list. Every filter field is optional; an absent field matches
//! everything. Text queries are case-insensitive substring matches.

use std::cmp::Reverse;

use chrono::{DateTime, NaiveDate, Utc};
use clubsync_core::ClubRole;
use clubsync_state::{HourStatus, TaskPriority, TaskStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::event::Event;
use crate::hours::HourEntry;
use crate::member::{Member, MemberStatus};
use crate::note::MeetingNote;
use crate::task::Task;

/// `needle` must already be lowercase.
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn normalized_query(query: &Option<String>) -> Option<String> {
    query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
}

// -- Members ------------------------------------------------------------------

/// Roster filter. `query` searches name, email and position.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct MemberFilter {
    pub query: Option<String>,
    pub role: Option<ClubRole>,
    pub status: Option<MemberStatus>,
}

impl MemberFilter {
    pub fn matches(&self, m: &Member) -> bool {
        if self.role.is_some_and(|r| r != m.role) {
            return false;
        }
        if self.status.is_some_and(|s| s != m.status) {
            return false;
        }
        match normalized_query(&self.query) {
            None => true,
            Some(q) => {
                contains_ci(&m.name, &q)
                    || m.email.as_deref().is_some_and(|e| contains_ci(e, &q))
                    || m.position.as_deref().is_some_and(|p| contains_ci(p, &q))
            }
        }
    }
}

/// Alphabetical by name, then id.
pub fn sort_members(members: &mut [Member]) {
    members.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

// -- Notes --------------------------------------------------------------------

/// Meeting-note filter over a date range (inclusive) and title/content text.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct NoteFilter {
    pub query: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl NoteFilter {
    pub fn matches(&self, n: &MeetingNote) -> bool {
        if self.from.is_some_and(|from| n.meeting_date < from) {
            return false;
        }
        if self.to.is_some_and(|to| n.meeting_date > to) {
            return false;
        }
        match normalized_query(&self.query) {
            None => true,
            Some(q) => {
                contains_ci(&n.title, &q)
                    || contains_ci(&n.content, &q)
                    || n.author.as_deref().is_some_and(|a| contains_ci(a, &q))
            }
        }
    }
}

/// Newest meeting first.
pub fn sort_notes(notes: &mut [MeetingNote]) {
    notes.sort_by(|a, b| {
        b.meeting_date
            .cmp(&a.meeting_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

// -- Attendance ---------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AttendanceFilter {
    pub member_id: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub event_id: Option<Uuid>,
}

impl AttendanceFilter {
    pub fn matches(&self, r: &AttendanceRecord) -> bool {
        self.member_id.map_or(true, |m| m == r.member_id)
            && self.date.map_or(true, |d| d == r.date)
            && self.event_id.map_or(true, |e| Some(e) == r.event_id)
    }
}

/// Newest date first, then by member.
pub fn sort_attendance(records: &mut [AttendanceRecord]) {
    records.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| a.member_id.cmp(&b.member_id))
            .then_with(|| a.event_id.cmp(&b.event_id))
    });
}

// -- Hours --------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct HourFilter {
    pub member_id: Option<Uuid>,
    pub status: Option<HourStatus>,
}

impl HourFilter {
    pub fn matches(&self, e: &HourEntry) -> bool {
        self.member_id.map_or(true, |m| m == e.member_id)
            && self.status.map_or(true, |s| s == e.status)
    }
}

/// Newest first.
pub fn sort_hours(entries: &mut [HourEntry]) {
    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

// -- Events -------------------------------------------------------------------

/// Which part of the calendar to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum EventWindow {
    /// Not yet finished, soonest first.
    Upcoming,
    /// Finished, most recent first.
    Past,
    /// Everything, in start order.
    #[default]
    All,
}

impl EventWindow {
    pub fn matches(&self, e: &Event, now: DateTime<Utc>) -> bool {
        match self {
            Self::Upcoming => e.is_upcoming(now),
            Self::Past => !e.is_upcoming(now),
            Self::All => true,
        }
    }

    /// Order events for this window.
    pub fn sort(&self, events: &mut [Event]) {
        let by_start = |a: &Event, b: &Event| {
            a.starts_at
                .cmp(&b.starts_at)
                .then_with(|| a.id.cmp(&b.id))
        };
        match self {
            Self::Past => events.sort_by(|a, b| by_start(b, a)),
            Self::Upcoming | Self::All => events.sort_by(by_start),
        }
    }
}

// -- Tasks --------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    /// Member id.
    pub assignee_id: Option<Uuid>,
    pub priority: Option<TaskPriority>,
}

impl TaskFilter {
    pub fn matches(&self, t: &Task) -> bool {
        self.status.map_or(true, |s| s == t.status)
            && self.assignee_id.map_or(true, |a| Some(a) == t.assignee_id)
            && self.priority.map_or(true, |p| p == t.priority)
    }
}

/// Open work first: status, then due date (undated last), then highest
/// priority, then oldest.
pub fn sort_tasks(tasks: &mut [Task]) {
    fn due_key(d: Option<NaiveDate>) -> (bool, Option<NaiveDate>) {
        (d.is_none(), d)
    }
    tasks.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| due_key(a.due_date).cmp(&due_key(b.due_date)))
            .then_with(|| Reverse(a.priority).cmp(&Reverse(b.priority)))
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn member(name: &str, email: Option<&str>, position: Option<&str>) -> Member {
        let now = Utc::now();
        Member {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            user_id: None,
            name: name.into(),
            email: email.map(Into::into),
            role: ClubRole::Member,
            position: position.map(Into::into),
            grade: None,
            status: MemberStatus::Active,
            joined_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn task(status: TaskStatus, due: Option<u32>, priority: TaskPriority) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            title: format!("{status}-{due:?}-{}", priority.as_str()),
            description: None,
            assignee_id: None,
            due_date: due.and_then(|d| NaiveDate::from_ymd_opt(2024, 10, d)),
            priority,
            status,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn member_query_searches_email_and_position() {
        let m = member("Lin", Some("LIN@school.edu"), Some("Treasurer"));
        let by = |q: &str| MemberFilter {
            query: Some(q.into()),
            ..Default::default()
        };
        assert!(by("lin@").matches(&m));
        assert!(by("treas").matches(&m));
        assert!(by("  ").matches(&m));
        assert!(!by("secretary").matches(&m));
    }

    #[test]
    fn member_role_and_status_filters() {
        let mut m = member("Kai", None, None);
        m.status = MemberStatus::Inactive;
        let f = MemberFilter {
            status: Some(MemberStatus::Active),
            ..Default::default()
        };
        assert!(!f.matches(&m));
        let f = MemberFilter {
            role: Some(ClubRole::Member),
            ..Default::default()
        };
        assert!(f.matches(&m));
    }

    #[test]
    fn note_date_range_is_inclusive() {
        let now = Utc::now();
        let note = MeetingNote {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            title: "Kickoff".into(),
            meeting_date: NaiveDate::from_ymd_opt(2024, 9, 5).unwrap(),
            content: "Elected officers".into(),
            author: None,
            created_at: now,
            updated_at: now,
        };
        let f = NoteFilter {
            query: Some("ELECTED".into()),
            from: NaiveDate::from_ymd_opt(2024, 9, 5),
            to: NaiveDate::from_ymd_opt(2024, 9, 5),
        };
        assert!(f.matches(&note));
        let f = NoteFilter {
            from: NaiveDate::from_ymd_opt(2024, 9, 6),
            ..Default::default()
        };
        assert!(!f.matches(&note));
    }

    #[test]
    fn event_windows_split_on_now() {
        let now = Utc::now();
        let mk = |offset_h: i64| Event {
            id: Uuid::new_v4(),
            club_id: Uuid::nil(),
            title: format!("{offset_h}"),
            description: None,
            location: None,
            starts_at: now + Duration::hours(offset_h),
            ends_at: None,
            category: None,
            created_at: now,
            updated_at: now,
        };
        let all = vec![mk(-48), mk(24), mk(-2), mk(2)];

        let mut upcoming: Vec<Event> = all
            .iter()
            .filter(|e| EventWindow::Upcoming.matches(e, now))
            .cloned()
            .collect();
        EventWindow::Upcoming.sort(&mut upcoming);
        let titles: Vec<&str> = upcoming.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["2", "24"]);

        let mut past: Vec<Event> = all
            .iter()
            .filter(|e| EventWindow::Past.matches(e, now))
            .cloned()
            .collect();
        EventWindow::Past.sort(&mut past);
        let titles: Vec<&str> = past.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["-2", "-48"]);
    }

    #[test]
    fn task_order() {
        let mut tasks = vec![
            task(TaskStatus::Done, Some(1), TaskPriority::High),
            task(TaskStatus::Todo, None, TaskPriority::High),
            task(TaskStatus::Todo, Some(9), TaskPriority::Low),
            task(TaskStatus::Todo, Some(9), TaskPriority::High),
            task(TaskStatus::InProgress, Some(2), TaskPriority::Low),
        ];
        sort_tasks(&mut tasks);
        let order: Vec<(TaskStatus, Option<u32>, TaskPriority)> = tasks
            .iter()
            .map(|t| {
                (
                    t.status,
                    t.due_date.map(|d| chrono::Datelike::day(&d)),
                    t.priority,
                )
            })
            .collect();
        assert_eq!(
            order,
            vec![
                (TaskStatus::Todo, Some(9), TaskPriority::High),
                (TaskStatus::Todo, Some(9), TaskPriority::Low),
                (TaskStatus::Todo, None, TaskPriority::High),
                (TaskStatus::InProgress, Some(2), TaskPriority::Low),
                (TaskStatus::Done, Some(1), TaskPriority::High),
            ]
        );
    }

    #[test]
    fn task_filter_by_assignee() {
        let mut t = task(TaskStatus::Todo, None, TaskPriority::Medium);
        let who = Uuid::new_v4();
        t.assignee_id = Some(who);
        assert!(TaskFilter {
            assignee_id: Some(who),
            ..Default::default()
        }
        .matches(&t));
        assert!(!TaskFilter {
            assignee_id: Some(Uuid::new_v4()),
            ..Default::default()
        }
        .matches(&t));
    }
}
