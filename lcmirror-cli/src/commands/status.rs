//! `lcmirror status`: what has been mirrored so far.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use lcmirror_core::{config, StateStore, StoreError};

/// Arguments for `lcmirror status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self, home: &Path) -> Result<()> {
        let report = build_report(home)?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        print_table(&report);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct StatusReport {
    repo: Option<PathBuf>,
    username: Option<String>,
    total: usize,
    updated_at: Option<String>,
    languages: Vec<LanguageCount>,
}

#[derive(Debug, Serialize, Tabled)]
struct LanguageCount {
    #[tabled(rename = "language")]
    language: String,
    #[tabled(rename = "solutions")]
    count: usize,
}

fn build_report(home: &Path) -> Result<StatusReport> {
    let config = match config::load_at(home) {
        Ok(config) => Some(config),
        Err(StoreError::ConfigNotFound { .. }) => None,
        Err(err) => return Err(err).context("failed to load config"),
    };
    let store = StateStore::open_at(home).context("failed to open state store")?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for (_, language, _) in store.records() {
        *counts.entry(language.0).or_default() += 1;
    }

    Ok(StatusReport {
        repo: config.as_ref().map(|c| c.repo_path.clone()),
        username: config.and_then(|c| c.username),
        total: store.len(),
        updated_at: store.updated_at().map(|t| t.to_rfc3339()),
        languages: counts
            .into_iter()
            .map(|(language, count)| LanguageCount { language, count })
            .collect(),
    })
}

fn print_table(report: &StatusReport) {
    match &report.repo {
        Some(repo) => println!("{} {}", "repository:".bold(), repo.display()),
        None => println!(
            "{} not configured; run `lcmirror init --repo <path>`",
            "repository:".bold()
        ),
    }
    if let Some(user) = &report.username {
        println!("{} {user}", "user:".bold());
    }

    if report.total == 0 {
        println!("{}", "No solutions mirrored yet.".bright_black());
        return;
    }

    let mut table = Table::new(&report.languages);
    table.with(Style::rounded());
    println!("{table}");

    let last = report.updated_at.as_deref().unwrap_or("never");
    println!(
        "{} {} solution(s), last recorded {last}",
        "■".green().bold(),
        report.total
    );
}
