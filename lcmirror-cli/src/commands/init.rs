//! `lcmirror init --repo <path> [--username <u>] [--push] [--force]`

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use lcmirror_core::{config, paths, Config};
use lcmirror_sync::CommitEngine;

/// Write `~/.lcmirror/config.yaml`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Working tree of the git repository solutions are committed to.
    #[arg(long, short = 'r')]
    pub repo: PathBuf,

    /// LeetCode username, shown in status output.
    #[arg(long, short = 'u')]
    pub username: Option<String>,

    /// Run `git push` after every sync that created commits.
    #[arg(long)]
    pub push: bool,

    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        let config_path = paths::config_path(home);
        if config_path.exists() && !self.force {
            bail!(
                "{} already exists; pass --force to overwrite it",
                config_path.display()
            );
        }

        let repo = self
            .repo
            .canonicalize()
            .with_context(|| format!("cannot resolve path '{}'", self.repo.display()))?;

        let mut config = Config::new(repo.clone());
        config.username = self.username;
        config.push = self.push;
        config::save_at(home, &config)
            .with_context(|| format!("failed to write {}", config_path.display()))?;

        if let Err(err) = CommitEngine::from_config(&config).and_then(|e| e.verify_repository()) {
            println!("{} {err}", "!".yellow().bold());
        }

        println!(
            "{} Solutions will be committed to {}",
            "✓".green().bold(),
            repo.display()
        );
        println!("  Saved to: {}", config_path.display());
        Ok(())
    }
}
