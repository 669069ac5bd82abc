//! `lcmirror sync`: run one reconciliation pass.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use lcmirror_core::{config, StateStore};
use lcmirror_remote::{ApiClient, SessionManager};
use lcmirror_renderer::{ExtensionTable, FilenameBuilder};
use lcmirror_sync::{CommitEngine, RemoteFeed, SyncOptions, SyncOrchestrator};

use crate::lock;
use crate::prompt::CookiePrompt;
use crate::reporter::{print_summary, ConsoleReporter};

/// Arguments for `lcmirror sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Ask for new cookies even if the stored session still works.
    #[arg(long)]
    pub force_login: bool,

    /// Refetch the problem catalog instead of using the cached copy.
    #[arg(long)]
    pub force_update: bool,

    /// Show what would be committed without touching the repository or state.
    #[arg(long)]
    pub dry_run: bool,

    /// Commit into this repository instead of the configured one.
    #[arg(long)]
    pub repo: Option<PathBuf>,
}

impl SyncArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        let _lock = lock::acquire(home)?;

        let mut config = config::load_at(home)
            .context("failed to load config; run `lcmirror init --repo <path>` first")?;
        if let Some(repo) = self.repo {
            config.repo_path = repo;
        }
        info!(repo = %config.repo_path.display(), dry_run = self.dry_run, "starting sync");

        let mut store = StateStore::open_at(home).context("failed to open state store")?;
        let client = ApiClient::from_config(&config);
        let prompt = CookiePrompt::new(&config.base_url);
        let session = SessionManager::new(&client, &prompt, home);
        let feed = RemoteFeed::new(&client, home);
        let committer = CommitEngine::from_config(&config).context("invalid commit template")?;
        let paths = FilenameBuilder::new(ExtensionTable::with_extra(&config.extra_extensions));

        let options = SyncOptions {
            force_login: self.force_login,
            force_update: self.force_update,
            dry_run: self.dry_run,
            push: config.push,
        };
        let result = SyncOrchestrator::new(
            &session,
            &feed,
            &committer,
            &mut store,
            &paths,
            &ConsoleReporter,
        )
        .run(options);

        match result {
            Ok(summary) => {
                print_summary(&summary);
                if !summary.is_clean() {
                    bail!("{} solution(s) could not be committed", summary.failed());
                }
                Ok(())
            }
            Err(aborted) => {
                print_summary(&aborted.summary);
                Err(aborted.into())
            }
        }
    }
}
