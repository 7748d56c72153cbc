//! # Report Subcommand
//!
//! Computes the dashboard summary for each club in a snapshot, the same
//! aggregate the server returns from `GET /v1/clubs/:club_id/dashboard`.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use clubsync_club::{ClubSummary, Percentage, Snapshot};
use uuid::Uuid;

use crate::check::load;

/// Arguments for `clubsync report`.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Snapshot file to read.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Only report on this club.
    #[arg(long, value_name = "ID")]
    pub club: Option<Uuid>,

    /// Print the summaries as a JSON array instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the report subcommand.
pub fn run_report(args: &ReportArgs, out: &mut impl Write) -> Result<u8> {
    let snapshot = load(&args.snapshot)?;
    let summaries = summarize(&snapshot, args.club, Utc::now())?;

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &summaries)?;
        writeln!(out)?;
    } else if summaries.is_empty() {
        writeln!(out, "no clubs in {}", args.snapshot.display())?;
    } else {
        for summary in &summaries {
            write_text(summary, out)?;
        }
    }
    Ok(0)
}

/// Summaries for every club (by name), or for the one club asked for.
fn summarize(
    snapshot: &Snapshot,
    club: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Vec<ClubSummary>> {
    let mut clubs: Vec<_> = match club {
        Some(id) => match snapshot.clubs.iter().find(|c| c.id == id) {
            Some(c) => vec![c],
            None => bail!("club {id} not found in snapshot"),
        },
        None => snapshot.clubs.iter().collect(),
    };
    clubs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(clubs
        .into_iter()
        .map(|c| ClubSummary::compute(c, &snapshot.club_data(c.id), now))
        .collect())
}

fn percent(p: Option<Percentage>) -> String {
    p.map_or_else(|| "n/a".to_string(), |p| format!("{:.1}%", p.rounded()))
}

fn write_text(s: &ClubSummary, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{} ({})", s.club_name, s.club_id)?;
    writeln!(
        out,
        "  members:     {} total, {} active, {} inactive, {} officers",
        s.members.total, s.members.active, s.members.inactive, s.members.officers
    )?;
    writeln!(
        out,
        "  attendance:  {} rate, {} average per meeting",
        percent(s.attendance_rate),
        s.average_attendance
            .map_or_else(|| "n/a".to_string(), |a| format!("{a:.1}"))
    )?;
    match s.hour_goal {
        Some(goal) => writeln!(
            out,
            "  hours:       {:.1} approved of {goal:.1} goal ({}), {} pending",
            s.total_approved_hours,
            percent(s.hour_goal_progress),
            s.pending_hour_entries
        )?,
        None => writeln!(
            out,
            "  hours:       {:.1} approved, {} pending",
            s.total_approved_hours, s.pending_hour_entries
        )?,
    }
    writeln!(
        out,
        "  tasks:       {}/{} done ({}), {} overdue",
        s.tasks.done,
        s.tasks.total,
        percent(Some(s.tasks.percent)),
        s.overdue_tasks
    )?;
    writeln!(
        out,
        "  calendar:    {} upcoming events, {} meeting notes",
        s.upcoming_events, s.meeting_notes
    )?;
    if s.pending_join_requests > 0 {
        writeln!(out, "  join queue:  {} pending", s.pending_join_requests)?;
    }
    for (rank, v) in s.top_volunteers.iter().enumerate() {
        writeln!(out, "  #{:<2} {:<24} {:>6.1} h", rank + 1, v.name, v.hours)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::fixtures;

    fn write_fixture() -> (tempfile::TempDir, PathBuf, Uuid) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let snapshot = fixtures::snapshot();
        let club_id = snapshot.clubs[0].id;
        snapshot.write_atomic(&path).unwrap();
        (dir, path, club_id)
    }

    #[test]
    fn text_report_shows_goal_progress_and_leaders() {
        let (_dir, path, _) = write_fixture();
        let mut out = Vec::new();
        let args = ReportArgs {
            snapshot: path,
            club: None,
            json: false,
        };
        assert_eq!(run_report(&args, &mut out).unwrap(), 0);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Math Club"));
        assert!(text.contains("5.0 approved of 10.0 goal (50.0%)"));
        assert!(text.contains("#1  Ben"));
    }

    #[test]
    fn json_report_for_one_club() {
        let (_dir, path, club_id) = write_fixture();
        let mut out = Vec::new();
        let args = ReportArgs {
            snapshot: path,
            club: Some(club_id),
            json: true,
        };
        run_report(&args, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["club_name"], "Math Club");
        assert_eq!(value[0]["members"]["officers"], 1);
    }

    #[test]
    fn unknown_club_is_an_error() {
        let (_dir, path, _) = write_fixture();
        let args = ReportArgs {
            snapshot: path,
            club: Some(Uuid::new_v4()),
            json: false,
        };
        assert!(run_report(&args, &mut Vec::new()).is_err());
    }
}
