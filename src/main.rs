//! Skill Update CLI
//!
//! Checks an installed skill directory against its upstream repository
//! and, on request, replaces the installation with the newest copy.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skillup::metadata;
use skillup::remote;
use skillup::update;
use skillup::version;

/// Check an installed skill for updates and optionally apply them.
#[derive(Parser, Debug)]
#[command(
    name = "skillup",
    version,
    about = "Check an installed skill for updates and optionally apply them"
)]
struct Cli {
    /// Root directory of the skill installation
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Apply an available update without asking
    #[arg(long, short = 'a')]
    auto: bool,

    /// Suppress output when no update is available
    #[arg(long, short = 'q')]
    quiet: bool,
}

// ---- Update Check -----------------------------------------------------------

/// Run one check-and-maybe-update pass. Soft outcomes (up to date, local
/// ahead, remote unreachable) return `Ok`; only broken metadata or a
/// failed update propagate an error.
fn run(cli: &Cli) -> Result<()> {
    let meta = metadata::read_skill_metadata(&cli.path)?;

    let remote_version = match remote::fetch_remote_version(&meta.repo)? {
        Some(v) => v,
        None => {
            if !cli.quiet {
                println!(
                    "{}",
                    format!("Could not determine the remote version for {}.", meta.repo)
                        .yellow()
                );
            }
            return Ok(());
        }
    };

    match version::compare_versions(&meta.version, &remote_version) {
        Ordering::Equal => {
            if !cli.quiet {
                println!(
                    "{}",
                    format!("{} v{} is up to date.", meta.name, meta.version).green()
                );
            }
        }
        Ordering::Greater => {
            if !cli.quiet {
                println!(
                    "{}",
                    format!(
                        "{} v{} is ahead of the remote (v{}).",
                        meta.name, meta.version, remote_version
                    )
                    .yellow()
                );
            }
        }
        Ordering::Less => {
            // Actionable, so never silenced by --quiet.
            println!(
                "{}",
                format!(
                    "Update available for {}: v{} -> v{}",
                    meta.name, meta.version, remote_version
                )
                .cyan()
            );

            if cli.auto {
                update::update_skill(&meta.repo, &cli.path)?;
                println!(
                    "{}",
                    format!(
                        "{} updated: v{} -> v{}",
                        meta.name, meta.version, remote_version
                    )
                    .green()
                );
            } else {
                println!();
                println!("Run again with --auto to apply:");
                println!("  skillup --auto");
            }
        }
    }

    Ok(())
}

// ---- Entry Point ------------------------------------------------------------

fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::from_default_env())
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
