//! Console output for a sync pass.

use colored::Colorize;

use lcmirror_sync::{CommitError, ItemOutcome, ItemReport, PassState, PassSummary, SyncReporter};

pub struct ConsoleReporter;

impl SyncReporter for ConsoleReporter {
    fn state_changed(&self, state: PassState) {
        let line = match state {
            PassState::SessionCheck => "Checking session...",
            PassState::Fetching => "Fetching accepted submissions...",
            PassState::Reconciling => "Comparing with mirrored solutions...",
            PassState::Committing(1) => "Committing new solutions...",
            _ => return,
        };
        println!("{}", line.bright_black());
    }

    fn item(&self, report: &ItemReport) {
        let what = format!("{}. {} [{}]", report.problem_id, report.title, report.language);
        let path = report
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        match &report.outcome {
            ItemOutcome::Committed { commit } => {
                println!("{} {what} → {path} ({})", "✓".green().bold(), short(commit))
            }
            ItemOutcome::Recovered { commit } => println!(
                "{} {what} already in history ({})",
                "↺".cyan().bold(),
                short(commit)
            ),
            ItemOutcome::Skipped { reason } => {
                println!("{} {what} skipped: {reason}", "-".yellow().bold())
            }
            ItemOutcome::Failed { reason } => {
                println!("{} {what} failed: {reason}", "✗".red().bold())
            }
            ItemOutcome::Pending => println!("[dry-run] would commit {path}"),
        }
    }

    fn push_failed(&self, error: &CommitError) {
        println!("{} push failed: {error}", "!".yellow().bold());
    }
}

fn short(commit: &str) -> &str {
    commit.get(..7).unwrap_or(commit)
}

pub fn print_summary(summary: &PassSummary) {
    if summary.dry_run {
        println!(
            "{} pending, {} already mirrored, {} skipped",
            summary.pending(),
            summary.already_synced,
            summary.skipped()
        );
        return;
    }
    let failed = summary.failed();
    let line = format!(
        "{} committed, {} recovered, {} already mirrored, {} skipped, {} failed",
        summary.committed(),
        summary.recovered(),
        summary.already_synced,
        summary.skipped(),
        failed
    );
    if failed > 0 {
        println!("{}", line.red().bold());
    } else {
        println!("{}", line.green().bold());
    }
}
