//! # Check Subcommand
//!
//! Loads a snapshot and lists every integrity issue
//! [`Snapshot::check`](clubsync_club::Snapshot::check) finds. Exit code 1
//! when there is at least one.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use clubsync_club::Snapshot;

/// Arguments for `clubsync check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Snapshot file to inspect.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,
}

/// Execute the check subcommand.
pub fn run_check(args: &CheckArgs, out: &mut impl Write) -> Result<u8> {
    let snapshot = load(&args.snapshot)?;
    let issues = snapshot.check();

    writeln!(
        out,
        "{}: {} users, {} clubs, {} members, {} hour entries",
        args.snapshot.display(),
        snapshot.users.len(),
        snapshot.clubs.len(),
        snapshot.members.len(),
        snapshot.hours.len(),
    )?;
    if issues.is_empty() {
        writeln!(out, "OK: no issues found")?;
        return Ok(0);
    }
    for issue in &issues {
        writeln!(out, "  FAIL: {issue}")?;
    }
    writeln!(out, "\n{} issue(s) found.", issues.len())?;
    Ok(1)
}

pub(crate) fn load(path: &Path) -> Result<Snapshot> {
    Snapshot::read(path).with_context(|| format!("failed to load snapshot {}", path.display()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_snapshot_passes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        fixtures::snapshot().write_atomic(&path).unwrap();

        let mut out = Vec::new();
        let code = run_check(&CheckArgs { snapshot: path }, &mut out).unwrap();
        assert_eq!(code, 0);
        assert!(String::from_utf8(out).unwrap().contains("OK: no issues found"));
    }

    #[test]
    fn dangling_member_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut snapshot = fixtures::snapshot();
        snapshot.members.retain(|m| m.name != "Ben");
        snapshot.write_atomic(&path).unwrap();

        let mut out = Vec::new();
        let code = run_check(&CheckArgs { snapshot: path }, &mut out).unwrap();
        assert_eq!(code, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("FAIL: hour entry"));
        assert!(text.contains("1 issue(s) found."));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = CheckArgs {
            snapshot: dir.path().join("absent.json"),
        };
        let err = run_check(&args, &mut Vec::new()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load snapshot"));
    }
}
