//! # clubsync-cli: Offline Operator Tool
//!
//! Provides the `clubsync` command-line interface for work that does not
//! need a running server.
//!
//! ## Subcommands
//!
//! - `clubsync join-code [--count N]`: print fresh random join codes.
//! - `clubsync check <SNAPSHOT>`: report integrity issues in a snapshot file.
//! - `clubsync report <SNAPSHOT> [--club ID] [--json]`: per-club dashboards.
//!
//! Each subcommand writes to a caller-supplied writer and returns a process
//! exit code: 0 on success, 1 when a check finds problems. Operational
//! failures (unreadable file, unknown club) are `Err`.

pub mod check;
pub mod join_code;
pub mod report;
