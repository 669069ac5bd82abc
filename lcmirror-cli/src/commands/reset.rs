//! `lcmirror reset --yes`

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use lcmirror_core::StateStore;

use crate::lock;

/// Forget every committed pair; the next sync re-mirrors everything.
#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm the reset.
    #[arg(long)]
    pub yes: bool,
}

impl ResetArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        if !self.yes {
            bail!("reset forgets every mirrored solution; pass --yes to confirm");
        }
        let _lock = lock::acquire(home)?;
        let mut store = StateStore::open_at(home).context("failed to open state store")?;
        let cleared = store.len();
        store.reset().context("failed to reset state store")?;
        println!(
            "{} Cleared {cleared} mirrored solution(s)",
            "✓".green().bold()
        );
        Ok(())
    }
}
