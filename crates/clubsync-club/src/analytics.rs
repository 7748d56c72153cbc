//! # Club Statistics
//!
//! One-pass reductions over a club's record lists. All functions are pure
//! and deterministic: results that group by member come back sorted by
//! member id, and rankings break ties by name and then id, so the same input
//! always yields the same output regardless of store iteration order.
//!
//! ## Attendance
//!
//! `present` and `late` count as attended. `excused` is removed from both
//! numerator and denominator, so an excused absence neither helps nor hurts
//! a rate. A rate over zero counted records is `None`, not 0%.
//!
//! ## Hours
//!
//! Rejected entries never count. [`HourScope::Approved`] counts only
//! approved entries; [`HourScope::All`] adds pending ones, which is what a
//! member sees as "hours logged so far".

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::NaiveDate;
use clubsync_state::{HourStatus, TaskStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::hours::HourEntry;
use crate::member::Member;
use crate::task::Task;

/// A percentage in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = f64, example = 87.5))]
#[serde(transparent)]
pub struct Percentage(f64);

impl Percentage {
    /// `part / whole` as a percentage, clamped to 100. `None` when `whole`
    /// is not positive.
    pub fn of(part: f64, whole: f64) -> Option<Self> {
        if whole.is_nan() || whole <= 0.0 || !part.is_finite() {
            return None;
        }
        Some(Self((part / whole * 100.0).clamp(0.0, 100.0)))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Value rounded to one decimal place, for display.
    pub fn rounded(self) -> f64 {
        (self.0 * 10.0).round() / 10.0
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}

// -- Attendance ---------------------------------------------------------------

/// Attendance totals for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MemberAttendance {
    pub member_id: Uuid,
    /// Present or late.
    pub attended: usize,
    /// Every record except excused ones.
    pub counted: usize,
    pub excused: usize,
    pub rate: Option<Percentage>,
}

/// Attended over counted, across all records.
pub fn attendance_rate(records: &[AttendanceRecord]) -> Option<Percentage> {
    let (attended, counted) = records
        .iter()
        .filter(|r| r.status.counted())
        .fold((0usize, 0usize), |(a, c), r| {
            (a + usize::from(r.status.attended()), c + 1)
        });
    Percentage::of(attended as f64, counted as f64)
}

/// Per-member totals, sorted by member id.
pub fn member_attendance(records: &[AttendanceRecord]) -> Vec<MemberAttendance> {
    let mut by_member: BTreeMap<Uuid, (usize, usize, usize)> = BTreeMap::new();
    for r in records {
        let slot = by_member.entry(r.member_id).or_default();
        if r.status.counted() {
            slot.1 += 1;
            if r.status.attended() {
                slot.0 += 1;
            }
        } else {
            slot.2 += 1;
        }
    }
    by_member
        .into_iter()
        .map(|(member_id, (attended, counted, excused))| MemberAttendance {
            member_id,
            attended,
            counted,
            excused,
            rate: Percentage::of(attended as f64, counted as f64),
        })
        .collect()
}

/// Mean number of members who attended, per distinct meeting date.
///
/// Dates on which every record was an absence still count as meetings with
/// zero attendance. `None` when there are no records.
pub fn average_attendance(records: &[AttendanceRecord]) -> Option<f64> {
    let mut per_date: BTreeMap<NaiveDate, BTreeSet<Uuid>> = BTreeMap::new();
    for r in records {
        let attendees = per_date.entry(r.date).or_default();
        if r.status.attended() {
            attendees.insert(r.member_id);
        }
    }
    if per_date.is_empty() {
        return None;
    }
    let total: usize = per_date.values().map(BTreeSet::len).sum();
    Some(total as f64 / per_date.len() as f64)
}

// -- Hours --------------------------------------------------------------------

/// Which hour entries count toward a total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum HourScope {
    /// Approved entries only.
    #[default]
    Approved,
    /// Approved and pending entries.
    All,
}

impl HourScope {
    fn includes(self, status: HourStatus) -> bool {
        status.counts(self == Self::All)
    }
}

/// Sum of hours in scope.
pub fn total_hours(entries: &[HourEntry], scope: HourScope) -> f64 {
    entries
        .iter()
        .filter(|e| scope.includes(e.status))
        .map(|e| e.hours)
        .sum()
}

/// Hours in scope per member id. Members with no counted hours are absent.
pub fn hours_by_member(entries: &[HourEntry], scope: HourScope) -> BTreeMap<Uuid, f64> {
    let mut totals = BTreeMap::new();
    for e in entries.iter().filter(|e| scope.includes(e.status)) {
        *totals.entry(e.member_id).or_insert(0.0) += e.hours;
    }
    totals
}

/// One row of the volunteer leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct VolunteerRank {
    pub member_id: Uuid,
    pub name: String,
    pub hours: f64,
}

/// The `n` members with the most hours in scope.
///
/// Entries whose member is not in `members` are skipped.
pub fn top_volunteers(
    entries: &[HourEntry],
    members: &[Member],
    n: usize,
    scope: HourScope,
) -> Vec<VolunteerRank> {
    let names: HashMap<Uuid, &str> = members.iter().map(|m| (m.id, m.name.as_str())).collect();
    let mut ranks: Vec<VolunteerRank> = hours_by_member(entries, scope)
        .into_iter()
        .filter_map(|(member_id, hours)| {
            names.get(&member_id).map(|name| VolunteerRank {
                member_id,
                name: (*name).to_string(),
                hours,
            })
        })
        .collect();
    ranks.sort_by(|a, b| {
        b.hours
            .total_cmp(&a.hours)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.member_id.cmp(&b.member_id))
    });
    ranks.truncate(n);
    ranks
}

/// Progress toward a club's hour goal, capped at 100%.
pub fn hour_goal_progress(total: f64, goal: Option<f64>) -> Option<Percentage> {
    goal.and_then(|g| Percentage::of(total, g))
}

// -- Tasks --------------------------------------------------------------------

/// Done-over-total for a task list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Completion {
    pub done: usize,
    pub total: usize,
    pub percent: Percentage,
}

/// Share of tasks that are done. An empty list is 0% complete.
pub fn task_completion(tasks: &[Task]) -> Completion {
    let total = tasks.len();
    let done = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Done)
        .count();
    Completion {
        done,
        total,
        percent: Percentage::of(done as f64, total as f64).unwrap_or(Percentage(0.0)),
    }
}
