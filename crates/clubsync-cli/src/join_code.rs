//! # Join-Code Subcommand
//!
//! Prints codes from the same generator the server uses. Useful for
//! pre-printing codes or seeding test data; uniqueness against existing
//! clubs is not checked here.

use std::io::Write;

use anyhow::{bail, Result};
use clap::Args;
use clubsync_core::JoinCode;
use rand_core::{OsRng, RngCore};

/// Upper bound on `--count`.
pub const MAX_COUNT: usize = 1000;

/// Arguments for `clubsync join-code`.
#[derive(Args, Debug)]
pub struct JoinCodeArgs {
    /// Number of codes to print.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub count: usize,
}

/// Execute the join-code subcommand with the system RNG.
pub fn run_join_code(args: &JoinCodeArgs, out: &mut impl Write) -> Result<u8> {
    write_codes(args.count, &mut OsRng, out)
}

fn write_codes<R: RngCore>(count: usize, rng: &mut R, out: &mut impl Write) -> Result<u8> {
    if count == 0 || count > MAX_COUNT {
        bail!("--count must be between 1 and {MAX_COUNT}, got {count}");
    }
    for _ in 0..count {
        writeln!(out, "{}", JoinCode::generate(rng))?;
    }
    tracing::debug!(count, "join codes generated");
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prints_requested_number_of_valid_codes() {
        let mut out = Vec::new();
        let code = run_join_code(&JoinCodeArgs { count: 5 }, &mut out).unwrap();
        assert_eq!(code, 0);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        for line in lines {
            assert!(JoinCode::parse(line).is_ok(), "bad code {line}");
        }
    }

    #[test]
    fn rejects_zero_and_oversized_counts() {
        let mut out = Vec::new();
        assert!(run_join_code(&JoinCodeArgs { count: 0 }, &mut out).is_err());
        assert!(run_join_code(&JoinCodeArgs { count: MAX_COUNT + 1 }, &mut out).is_err());
        assert!(out.is_empty());
    }
}
