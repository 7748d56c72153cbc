//! # API Route Modules
//!
//! - `auth`: sign-up, sign-in, sign-out, current session.
//! - `clubs`: club CRUD and join-code rotation.
//! - `join_requests`: requesting membership by join code; officer review.
//! - `members`, `notes`, `attendance`, `hours`, `events`, `tasks`: the
//!   club-scoped feature areas under `/v1/clubs/:club_id/...`.
//! - `dashboard`: the per-club summary.
//!
//! Every club-scoped handler starts with [`crate::auth::ClubAccess::resolve`]
//! and looks records up through [`find_in_club`], so a record id from
//! another club is indistinguishable from an unknown one.

pub mod attendance;
pub mod auth;
pub mod clubs;
pub mod dashboard;
pub mod events;
pub mod hours;
pub mod join_requests;
pub mod members;
pub mod notes;
pub mod tasks;

use clubsync_club::{
    AttendanceRecord, Event, HourEntry, JoinRequest, MeetingNote, Member, Task,
};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::Store;

/// Records owned by a club.
pub trait ClubScoped: Clone + Send + Sync {
    /// Name used in error messages.
    const KIND: &'static str;
    fn club_id(&self) -> Uuid;
}

macro_rules! club_scoped {
    ($($ty:ty => $kind:literal),* $(,)?) => {
        $(impl ClubScoped for $ty {
            const KIND: &'static str = $kind;
            fn club_id(&self) -> Uuid {
                self.club_id
            }
        })*
    };
}

club_scoped! {
    Member => "member",
    MeetingNote => "meeting note",
    AttendanceRecord => "attendance record",
    HourEntry => "hour entry",
    Event => "event",
    Task => "task",
    JoinRequest => "join request",
}

/// Fetch `id` from `store`, 404 unless it belongs to `club_id`.
pub fn find_in_club<T: ClubScoped>(
    store: &Store<T>,
    club_id: Uuid,
    id: Uuid,
) -> Result<T, AppError> {
    store
        .get(&id)
        .filter(|r| r.club_id() == club_id)
        .ok_or_else(|| AppError::not_found(T::KIND, id))
}

/// Check that an optional member reference points into `club_id`.
pub fn check_member_ref(
    members: &Store<Member>,
    club_id: Uuid,
    member_id: Uuid,
) -> Result<Member, AppError> {
    members
        .get(&member_id)
        .filter(|m| m.club_id == club_id)
        .ok_or_else(|| {
            AppError::Validation(format!("member {member_id} does not belong to this club"))
        })
}

/// Check that an event reference points into `club_id`.
pub fn check_event_ref(events: &Store<Event>, club_id: Uuid, event_id: Uuid) -> Result<(), AppError> {
    if events.get(&event_id).is_some_and(|e| e.club_id == club_id) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "event {event_id} does not belong to this club"
        )))
    }
}
