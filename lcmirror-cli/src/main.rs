//! lcmirror: mirror accepted LeetCode solutions into a git repository.
//!
//! # Usage
//!
//! ```text
//! lcmirror init --repo <path> [--username <u>] [--push] [--force]
//! lcmirror login [--force]
//! lcmirror sync [--force-login] [--force-update] [--dry-run] [--repo <path>] [-v...]
//! lcmirror status [--json]
//! lcmirror reset --yes
//! ```

mod commands;
mod lock;
mod logging;
mod prompt;
mod reporter;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};

use commands::{
    init::InitArgs, login::LoginArgs, reset::ResetArgs, status::StatusArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "lcmirror",
    version,
    about = "Mirror accepted LeetCode submissions into a git repository, one commit per solution",
    long_about = None,
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write ~/.lcmirror/config.yaml pointing at the solutions repository.
    Init(InitArgs),

    /// Check the stored session and log in again if it is no longer accepted.
    Login(LoginArgs),

    /// Fetch accepted submissions and commit the ones not yet mirrored.
    Sync(SyncArgs),

    /// Show what has been mirrored so far.
    Status(StatusArgs),

    /// Forget every mirrored pair so the next sync starts over.
    Reset(ResetArgs),
}

pub(crate) fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let home = home_dir()?;
    logging::init(&home, cli.verbose);

    match cli.command {
        Commands::Init(args) => args.run(&home),
        Commands::Login(args) => args.run(&home),
        Commands::Sync(args) => args.run(&home),
        Commands::Status(args) => args.run(&home),
        Commands::Reset(args) => args.run(&home),
    }
}
