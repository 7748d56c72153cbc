//! # clubsync-state: Lifecycle State Machines
//!
//! Three records in ClubSync have a status that only moves along fixed
//! edges:
//!
//! - [`JoinRequestStatus`]: `pending → approved | rejected`, both terminal.
//! - [`HourStatus`]: officer review of logged volunteer hours.
//! - [`TaskStatus`]: assignment progress, with reopen.
//!
//! Each enum exposes its transition table through `valid_transitions()` and
//! applies it through `transition_to()`, which returns a
//! [`clubsync_core::TransitionError`] for any edge not in the table.
//! Statuses serialize as `snake_case` strings, the same strings stored in
//! Postgres and in snapshot files.

#![deny(missing_docs)]

pub mod hours;
pub mod join_request;
pub mod task;

pub use hours::HourStatus;
pub use join_request::JoinRequestStatus;
pub use task::{TaskPriority, TaskStatus};
