//! # clubsync CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use clubsync_cli::check::{run_check, CheckArgs};
use clubsync_cli::join_code::{run_join_code, JoinCodeArgs};
use clubsync_cli::report::{run_report, ReportArgs};

/// ClubSync operator tool.
///
/// Generates join codes and inspects snapshot files without a running
/// server.
#[derive(Parser, Debug)]
#[command(name = "clubsync", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print random join codes.
    JoinCode(JoinCodeArgs),

    /// Check a snapshot file for dangling references and duplicates.
    Check(CheckArgs),

    /// Print per-club dashboard summaries from a snapshot file.
    Report(ReportArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::JoinCode(args) => run_join_code(&args, &mut stdout),
        Commands::Check(args) => run_check(&args, &mut stdout),
        Commands::Report(args) => run_report(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
