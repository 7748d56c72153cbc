//! # Snapshot Documents
//!
//! A snapshot is the entire service state as one JSON document. The API
//! server can use it as its durable store (load at startup, rewrite after
//! every mutation), and the CLI reads it for offline checks and reports.
//!
//! ## Format
//!
//! ```json
//! { "version": 1, "users": [...], "clubs": [...], "members": [...], ... }
//! ```
//!
//! Missing lists deserialize as empty. Documents with a `version` newer
//! than [`SNAPSHOT_VERSION`] are refused rather than partially read.
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a crash mid-write leaves the previous snapshot intact.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::club::Club;
use crate::event::Event;
use crate::hours::HourEntry;
use crate::join_request::JoinRequest;
use crate::member::Member;
use crate::note::MeetingNote;
use crate::summary::ClubData;
use crate::task::Task;
use crate::user::User;

/// Format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot at {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot version {found} is newer than supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError {
    let path = path.to_path_buf();
    move |source| SnapshotError::Io { path, source }
}

/// The full service state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub clubs: Vec<Club>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub notes: Vec<MeetingNote>,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub hours: Vec<HourEntry>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub join_requests: Vec<JoinRequest>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            users: Vec::new(),
            clubs: Vec::new(),
            members: Vec::new(),
            notes: Vec::new(),
            attendance: Vec::new(),
            hours: Vec::new(),
            events: Vec::new(),
            tasks: Vec::new(),
            join_requests: Vec::new(),
        }
    }
}

/// An integrity problem found by [`Snapshot::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotIssue {
    /// A record names a club that is not in the snapshot.
    UnknownClub {
        kind: &'static str,
        id: Uuid,
        club_id: Uuid,
    },
    /// A record names a member that does not exist in its club.
    UnknownMember {
        kind: &'static str,
        id: Uuid,
        member_id: Uuid,
    },
    /// A record names a user that is not in the snapshot.
    UnknownUser {
        kind: &'static str,
        id: Uuid,
        user_id: Uuid,
    },
    /// An attendance record names an event that does not exist in its club.
    UnknownEvent { id: Uuid, event_id: Uuid },
    /// Two or more clubs share a join code.
    DuplicateJoinCode { code: String, clubs: Vec<Uuid> },
    /// Two or more users share an email address.
    DuplicateEmail { email: String, users: Vec<Uuid> },
    /// A club has no officer left.
    NoOfficer { club_id: Uuid },
}

impl std::fmt::Display for SnapshotIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownClub { kind, id, club_id } => {
                write!(f, "{kind} {id} references unknown club {club_id}")
            }
            Self::UnknownMember { kind, id, member_id } => {
                write!(f, "{kind} {id} references unknown member {member_id}")
            }
            Self::UnknownUser { kind, id, user_id } => {
                write!(f, "{kind} {id} references unknown user {user_id}")
            }
            Self::UnknownEvent { id, event_id } => {
                write!(f, "attendance record {id} references unknown event {event_id}")
            }
            Self::DuplicateJoinCode { code, clubs } => {
                write!(f, "join code {code} is shared by {} clubs", clubs.len())
            }
            Self::DuplicateEmail { email, users } => {
                write!(f, "email {email} is shared by {} users", users.len())
            }
            Self::NoOfficer { club_id } => write!(f, "club {club_id} has no officer"),
        }
    }
}

impl Snapshot {
    /// Read and parse a snapshot file.
    pub fn read(path: &Path) -> Result<Self, SnapshotError> {
        let bytes = fs::read(path).map_err(io_error(path))?;
        let snapshot: Self =
            serde_json::from_slice(&bytes).map_err(|source| SnapshotError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Like [`Snapshot::read`], but a missing file yields an empty snapshot.
    pub fn read_or_default(path: &Path) -> Result<Self, SnapshotError> {
        if path.exists() {
            Self::read(path)
        } else {
            tracing::info!(path = %path.display(), "snapshot file not found, starting empty");
            Ok(Self::default())
        }
    }

    /// Write the snapshot via a temporary sibling file and rename.
    pub fn write_atomic(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        let json = serde_json::to_vec_pretty(self).map_err(SnapshotError::Serialize)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(io_error(&tmp_path))?;
        fs::rename(&tmp_path, path).map_err(io_error(path))?;
        tracing::debug!(path = %path.display(), "snapshot written");
        Ok(())
    }

    /// Every record belonging to `club_id`.
    pub fn club_data(&self, club_id: Uuid) -> ClubData {
        fn owned<T: Clone>(items: &[T], club_id: Uuid, key: impl Fn(&T) -> Uuid) -> Vec<T> {
            items.iter().filter(|i| key(i) == club_id).cloned().collect()
        }
        ClubData {
            members: owned(&self.members, club_id, |m| m.club_id),
            notes: owned(&self.notes, club_id, |n| n.club_id),
            attendance: owned(&self.attendance, club_id, |a| a.club_id),
            hours: owned(&self.hours, club_id, |h| h.club_id),
            events: owned(&self.events, club_id, |e| e.club_id),
            tasks: owned(&self.tasks, club_id, |t| t.club_id),
            join_requests: owned(&self.join_requests, club_id, |r| r.club_id),
        }
    }

    /// Look for dangling references and broken uniqueness.
    ///
    /// Issues are returned in a stable order: reference problems grouped by
    /// record kind, then duplicates, then officer-less clubs.
    pub fn check(&self) -> Vec<SnapshotIssue> {
        let mut issues = Vec::new();
        let users: HashSet<Uuid> = self.users.iter().map(|u| u.id).collect();
        let clubs: HashSet<Uuid> = self.clubs.iter().map(|c| c.id).collect();
        // member id -> owning club
        let members: HashMap<Uuid, Uuid> =
            self.members.iter().map(|m| (m.id, m.club_id)).collect();
        let events: HashMap<Uuid, Uuid> = self.events.iter().map(|e| (e.id, e.club_id)).collect();

        let mut check_club = |kind: &'static str, id: Uuid, club_id: Uuid| {
            if !clubs.contains(&club_id) {
                issues.push(SnapshotIssue::UnknownClub { kind, id, club_id });
            }
        };
        for m in &self.members {
            check_club("member", m.id, m.club_id);
        }
        for n in &self.notes {
            check_club("meeting note", n.id, n.club_id);
        }
        for a in &self.attendance {
            check_club("attendance record", a.id, a.club_id);
        }
        for h in &self.hours {
            check_club("hour entry", h.id, h.club_id);
        }
        for e in &self.events {
            check_club("event", e.id, e.club_id);
        }
        for t in &self.tasks {
            check_club("task", t.id, t.club_id);
        }
        for r in &self.join_requests {
            check_club("join request", r.id, r.club_id);
        }

        let in_club = |member_id: Uuid, club_id: Uuid| members.get(&member_id) == Some(&club_id);
        for a in &self.attendance {
            if !in_club(a.member_id, a.club_id) {
                issues.push(SnapshotIssue::UnknownMember {
                    kind: "attendance record",
                    id: a.id,
                    member_id: a.member_id,
                });
            }
            if let Some(event_id) = a.event_id {
                if events.get(&event_id) != Some(&a.club_id) {
                    issues.push(SnapshotIssue::UnknownEvent { id: a.id, event_id });
                }
            }
        }
        for h in &self.hours {
            if !in_club(h.member_id, h.club_id) {
                issues.push(SnapshotIssue::UnknownMember {
                    kind: "hour entry",
                    id: h.id,
                    member_id: h.member_id,
                });
            }
        }
        for t in &self.tasks {
            if let Some(assignee) = t.assignee_id {
                if !in_club(assignee, t.club_id) {
                    issues.push(SnapshotIssue::UnknownMember {
                        kind: "task",
                        id: t.id,
                        member_id: assignee,
                    });
                }
            }
        }

        for c in &self.clubs {
            if !users.contains(&c.created_by) {
                issues.push(SnapshotIssue::UnknownUser {
                    kind: "club",
                    id: c.id,
                    user_id: c.created_by,
                });
            }
        }
        for m in &self.members {
            if let Some(user_id) = m.user_id {
                if !users.contains(&user_id) {
                    issues.push(SnapshotIssue::UnknownUser {
                        kind: "member",
                        id: m.id,
                        user_id,
                    });
                }
            }
        }
        for r in &self.join_requests {
            if !users.contains(&r.user_id) {
                issues.push(SnapshotIssue::UnknownUser {
                    kind: "join request",
                    id: r.id,
                    user_id: r.user_id,
                });
            }
        }

        let mut codes: BTreeMap<&str, Vec<Uuid>> = BTreeMap::new();
        for c in &self.clubs {
            codes.entry(c.join_code.as_str()).or_default().push(c.id);
        }
        for (code, clubs) in codes.into_iter().filter(|(_, ids)| ids.len() > 1) {
            issues.push(SnapshotIssue::DuplicateJoinCode {
                code: code.to_string(),
                clubs,
            });
        }

        let mut emails: BTreeMap<String, Vec<Uuid>> = BTreeMap::new();
        for u in &self.users {
            emails.entry(u.email.to_lowercase()).or_default().push(u.id);
        }
        for (email, users) in emails.into_iter().filter(|(_, ids)| ids.len() > 1) {
            issues.push(SnapshotIssue::DuplicateEmail { email, users });
        }

        for c in &self.clubs {
            let has_officer = self
                .members
                .iter()
                .any(|m| m.club_id == c.id && m.is_officer());
            if !has_officer {
                issues.push(SnapshotIssue::NoOfficer { club_id: c.id });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use clubsync_core::{ClubRole, JoinCode};
    use clubsync_state::HourStatus;

    use crate::member::MemberStatus;

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.into(),
            display_name: email.into(),
            password_digest: String::new(),
            password_salt: String::new(),
            created_at: Utc::now(),
        }
    }

    fn club(code: &str, created_by: Uuid) -> Club {
        let now = Utc::now();
        Club {
            id: Uuid::new_v4(),
            name: format!("Club {code}"),
            description: None,
            join_code: JoinCode::parse(code).unwrap(),
            hour_goal: None,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    fn officer(club_id: Uuid, user_id: Uuid) -> Member {
        let now = Utc::now();
        Member {
            id: Uuid::new_v4(),
            club_id,
            user_id: Some(user_id),
            name: "Officer".into(),
            email: None,
            role: ClubRole::Officer,
            position: None,
            grade: None,
            status: MemberStatus::Active,
            joined_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    fn healthy() -> Snapshot {
        let u = user("lead@example.org");
        let c = club("AAAA1111", u.id);
        let m = officer(c.id, u.id);
        Snapshot {
            users: vec![u],
            clubs: vec![c],
            members: vec![m],
            ..Default::default()
        }
    }

    #[test]
    fn healthy_snapshot_has_no_issues() {
        assert!(healthy().check().is_empty());
    }

    #[test]
    fn write_then_read_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");
        let snap = healthy();
        snap.write_atomic(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        let back = Snapshot::read(&path).unwrap();
        assert_eq!(back.clubs.len(), 1);
        assert_eq!(back.clubs[0].join_code, snap.clubs[0].join_code);
        assert_eq!(back.members[0].role, ClubRole::Officer);
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snap = Snapshot::read_or_default(&dir.path().join("absent.json")).unwrap();
        assert_eq!(snap.version, SNAPSHOT_VERSION);
        assert!(snap.clubs.is_empty());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("min.json");
        fs::write(&path, r#"{"version":1}"#).unwrap();
        let snap = Snapshot::read(&path).unwrap();
        assert!(snap.users.is_empty());
    }

    #[test]
    fn future_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        fs::write(&path, r#"{"version":99}"#).unwrap();
        assert!(matches!(
            Snapshot::read(&path),
            Err(SnapshotError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            Snapshot::read(&path),
            Err(SnapshotError::Parse { .. })
        ));
    }

    #[test]
    fn check_reports_dangling_member_and_duplicate_code() {
        let mut snap = healthy();
        let owner = snap.users[0].id;
        let twin = club("aaaa1111", owner);
        snap.members.push(officer(twin.id, owner));
        snap.clubs.push(twin);

        let club_id = snap.clubs[0].id;
        let ghost = Uuid::new_v4();
        let now = Utc::now();
        snap.hours.push(HourEntry {
            id: Uuid::new_v4(),
            club_id,
            member_id: ghost,
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            hours: 1.0,
            activity: "x".into(),
            description: None,
            status: HourStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        });

        let issues = snap.check();
        assert!(issues.contains(&SnapshotIssue::UnknownMember {
            kind: "hour entry",
            id: snap.hours[0].id,
            member_id: ghost,
        }));
        assert!(issues
            .iter()
            .any(|i| matches!(i, SnapshotIssue::DuplicateJoinCode { code, .. } if code == "AAAA1111")));
    }

    #[test]
    fn check_reports_club_without_officer() {
        let mut snap = healthy();
        snap.members.clear();
        let issues = snap.check();
        assert_eq!(
            issues,
            vec![SnapshotIssue::NoOfficer {
                club_id: snap.clubs[0].id
            }]
        );
    }

    #[test]
    fn club_data_selects_one_club() {
        let mut snap = healthy();
        let other = club("BBBB2222", snap.users[0].id);
        snap.members.push(officer(other.id, snap.users[0].id));
        snap.clubs.push(other);
        let data = snap.club_data(snap.clubs[0].id);
        assert_eq!(data.members.len(), 1);
        assert_eq!(data.members[0].club_id, snap.clubs[0].id);
    }
}
