//! `lcmirror login [--force]`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use lcmirror_core::config;
use lcmirror_remote::{ApiClient, SessionManager};

use crate::prompt::CookiePrompt;

/// Validate the stored session, prompting for new cookies when it is stale.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Ask for new cookies even if the stored session still works.
    #[arg(long)]
    pub force: bool,
}

impl LoginArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        let config = config::load_at(home).context("failed to load config")?;
        let client = ApiClient::from_config(&config);
        let prompt = CookiePrompt::new(&config.base_url);
        let manager = SessionManager::new(&client, &prompt, home);

        manager.authenticate(self.force).context("login failed")?;
        println!("{} Logged in to {}", "✓".green().bold(), config.base_url);
        Ok(())
    }
}
