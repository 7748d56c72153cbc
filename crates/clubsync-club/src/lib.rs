//! # clubsync-club: Club Domain
//!
//! Records for everything a club keeps track of, plus the pure functions
//! that derive statistics from them. Nothing in this crate performs I/O
//! except [`snapshot`], which reads and writes the JSON document used as a
//! file-backed store.
//!
//! ## Layout
//!
//! - Records: [`user`], [`club`], [`member`], [`note`], [`attendance`],
//!   [`hours`], [`event`], [`task`], [`join_request`].
//! - [`analytics`]: attendance rates, hour totals, leaderboards, task completion.
//! - [`filter`]: list predicates and orderings used by the HTTP list endpoints.
//! - [`summary`]: the per-club dashboard aggregate.
//! - [`snapshot`]: versioned full-state JSON document with integrity checks.
//!
//! Every record carries its `club_id`. Cross-record references (a task's
//! assignee, an attendance record's member) are plain ids; the service
//! checks them against the owning club, and [`snapshot::Snapshot::check`]
//! reports any that dangle.

pub mod analytics;
pub mod attendance;
pub mod club;
pub mod event;
pub mod filter;
pub mod hours;
pub mod join_request;
pub mod member;
pub mod note;
pub mod snapshot;
pub mod summary;
pub mod task;
pub mod user;

pub use analytics::{Completion, HourScope, MemberAttendance, Percentage, VolunteerRank};
pub use attendance::{AttendanceRecord, AttendanceStatus};
pub use club::Club;
pub use event::Event;
pub use filter::{
    AttendanceFilter, EventWindow, HourFilter, MemberFilter, NoteFilter, TaskFilter,
};
pub use hours::HourEntry;
pub use join_request::JoinRequest;
pub use member::{Member, MemberStatus};
pub use note::MeetingNote;
pub use snapshot::{Snapshot, SnapshotError, SnapshotIssue};
pub use summary::{ClubData, ClubSummary, MemberCounts};
pub use task::Task;
pub use user::{User, UserProfile};
