#![deny(missing_docs)]

//! # clubsync-core: Foundational Types for ClubSync
//!
//! Every other crate in the workspace depends on this one. It has no internal
//! crate dependencies: only `serde`, `serde_json`, `thiserror` and `rand_core`
//! from the external ecosystem (plus `utoipa` behind the `openapi` feature).
//!
//! ## Design Principles
//!
//! 1. **Validate at construction.** [`JoinCode`], [`Email`] and
//!    [`RequiredText`] can only be built through constructors that enforce
//!    their format, so a value of the type is always well-formed.
//!
//! 2. **One role enum.** [`ClubRole`] is ordered `Member < Officer` so access
//!    checks are a single comparison.
//!
//! 3. **[`ClubSyncError`] hierarchy.** Structured errors with `thiserror`: no
//!    `Box<dyn Error>`, no `.unwrap()` outside tests.

pub mod error;
pub mod join_code;
pub mod role;
pub mod text;

pub use error::{ClubSyncError, TransitionError, ValidationError};
pub use join_code::JoinCode;
pub use role::ClubRole;
pub use text::{optional_text, Email, RequiredText};
