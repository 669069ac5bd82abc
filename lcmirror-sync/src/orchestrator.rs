//! One reconciliation pass.
//!
//! ```text
//! Idle → SessionCheck → Fetching → Reconciling → Committing(n) → Done
//!                 └──────────┴────────────┴──────────────┴──→ Aborted
//! ```
//!
//! The state store is only written after the committer confirms a commit,
//! one item at a time. An interruption therefore loses at most the record of
//! the item in flight, and the committer finds that commit again next pass.

use std::fmt;
use std::path::{Path, PathBuf};

use lcmirror_core::{
    CommitRef, Language, ProblemCatalog, ProblemId, ProblemMeta, SessionState, StateStore,
    Submission,
};
use lcmirror_remote::{
    deduplicate, load_catalog, resolve_ids, ApiClient, AuthError, FetchError, SessionManager,
    SubmissionSource,
};
use lcmirror_renderer::{FilenameBuilder, RenderError};
use thiserror::Error;

use crate::commit::CommitEngine;
use crate::error::{CommitError, SyncError};

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

pub trait SessionProvider {
    fn authenticate(&self, force_interactive: bool) -> Result<SessionState, AuthError>;
}

impl SessionProvider for SessionManager<'_> {
    fn authenticate(&self, force_interactive: bool) -> Result<SessionState, AuthError> {
        SessionManager::authenticate(self, force_interactive)
    }
}

pub trait SubmissionFeed {
    fn load_catalog(&self, session: &SessionState, force_refresh: bool)
        -> Result<ProblemCatalog, FetchError>;

    fn fetch_accepted(
        &self,
        session: &SessionState,
        catalog: &ProblemCatalog,
    ) -> Result<Vec<Submission>, FetchError>;
}

/// [`SubmissionFeed`] backed by the archive service.
pub struct RemoteFeed<'a> {
    client: &'a ApiClient,
    home: PathBuf,
}

impl<'a> RemoteFeed<'a> {
    pub fn new(client: &'a ApiClient, home: &Path) -> Self {
        Self {
            client,
            home: home.to_path_buf(),
        }
    }
}

impl SubmissionFeed for RemoteFeed<'_> {
    fn load_catalog(
        &self,
        session: &SessionState,
        force_refresh: bool,
    ) -> Result<ProblemCatalog, FetchError> {
        load_catalog(self.client, session, &self.home, force_refresh)
    }

    fn fetch_accepted(
        &self,
        session: &SessionState,
        catalog: &ProblemCatalog,
    ) -> Result<Vec<Submission>, FetchError> {
        SubmissionSource::new(self.client).fetch_accepted_submissions(session, catalog)
    }
}

pub trait Committer {
    fn verify_repository(&self) -> Result<(), CommitError>;

    fn commit(
        &self,
        submission: &Submission,
        rel_path: &Path,
        meta: Option<&ProblemMeta>,
    ) -> Result<CommitRef, CommitError>;

    fn push(&self) -> Result<(), CommitError>;
}

impl Committer for CommitEngine {
    fn verify_repository(&self) -> Result<(), CommitError> {
        CommitEngine::verify_repository(self)
    }

    fn commit(
        &self,
        submission: &Submission,
        rel_path: &Path,
        meta: Option<&ProblemMeta>,
    ) -> Result<CommitRef, CommitError> {
        CommitEngine::commit(self, submission, rel_path, meta)
    }

    fn push(&self) -> Result<(), CommitError> {
        CommitEngine::push(self)
    }
}

/// User-visible progress. Every method defaults to a no-op.
pub trait SyncReporter {
    fn state_changed(&self, _state: PassState) {}
    fn item(&self, _report: &ItemReport) {}
    fn push_failed(&self, _error: &CommitError) {}
}

pub struct NullReporter;

impl SyncReporter for NullReporter {}

// ---------------------------------------------------------------------------
// Pass state and results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassState {
    Idle,
    SessionCheck,
    Fetching,
    Reconciling,
    /// 1-based index of the item being committed.
    Committing(usize),
    Done,
    Aborted,
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassState::Idle => write!(f, "idle"),
            PassState::SessionCheck => write!(f, "session check"),
            PassState::Fetching => write!(f, "fetching"),
            PassState::Reconciling => write!(f, "reconciling"),
            PassState::Committing(n) => write!(f, "committing item {n}"),
            PassState::Done => write!(f, "done"),
            PassState::Aborted => write!(f, "aborted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Committed { commit: String },
    /// The commit already existed; only the state store was updated.
    Recovered { commit: String },
    Skipped { reason: String },
    Failed { reason: String },
    /// Dry run: would be committed.
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub problem_id: ProblemId,
    pub language: Language,
    pub title: String,
    pub path: Option<PathBuf>,
    pub outcome: ItemOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub items: Vec<ItemReport>,
    pub already_synced: usize,
    pub dry_run: bool,
    pub push_error: Option<String>,
}

impl PassSummary {
    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }

    pub fn committed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Committed { .. }))
    }

    pub fn recovered(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Recovered { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed { .. }))
    }

    pub fn pending(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Pending))
    }

    /// `true` when no item failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }
}

/// A pass that stopped early, with everything it managed before stopping.
#[derive(Debug, Error)]
#[error("sync aborted during {state}: {cause}")]
pub struct PassAborted {
    pub state: PassState,
    #[source]
    pub cause: SyncError,
    pub summary: PassSummary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    pub force_login: bool,
    pub force_update: bool,
    pub dry_run: bool,
    pub push: bool,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct SyncOrchestrator<'a> {
    session: &'a dyn SessionProvider,
    feed: &'a dyn SubmissionFeed,
    committer: &'a dyn Committer,
    store: &'a mut StateStore,
    paths: &'a FilenameBuilder,
    reporter: &'a dyn SyncReporter,
    state: PassState,
    summary: PassSummary,
}

impl<'a> SyncOrchestrator<'a> {
    pub fn new(
        session: &'a dyn SessionProvider,
        feed: &'a dyn SubmissionFeed,
        committer: &'a dyn Committer,
        store: &'a mut StateStore,
        paths: &'a FilenameBuilder,
        reporter: &'a dyn SyncReporter,
    ) -> Self {
        Self {
            session,
            feed,
            committer,
            store,
            paths,
            reporter,
            state: PassState::Idle,
            summary: PassSummary::default(),
        }
    }

    /// Run one pass to `Done`, or stop at the first pass-level failure.
    pub fn run(&mut self, options: SyncOptions) -> Result<PassSummary, PassAborted> {
        self.summary = PassSummary {
            dry_run: options.dry_run,
            ..PassSummary::default()
        };
        match self.run_inner(options) {
            Ok(()) => {
                self.enter(PassState::Done);
                Ok(std::mem::take(&mut self.summary))
            }
            Err(cause) => {
                let state = self.state;
                tracing::error!(%state, error = %cause, "pass aborted");
                self.enter(PassState::Aborted);
                Err(PassAborted {
                    state,
                    cause,
                    summary: std::mem::take(&mut self.summary),
                })
            }
        }
    }

    fn run_inner(&mut self, options: SyncOptions) -> Result<(), SyncError> {
        self.enter(PassState::SessionCheck);
        let session = self.session.authenticate(options.force_login)?;

        self.enter(PassState::Fetching);
        let mut catalog = self.feed.load_catalog(&session, options.force_update)?;
        let mut submissions = self.feed.fetch_accepted(&session, &catalog)?;
        let unresolved = submissions
            .iter()
            .filter(|s| catalog.get(&s.title_slug).is_none())
            .count();
        if unresolved > 0 && !options.force_update {
            // A slug id and a later frontend id would be two different pairs.
            tracing::info!(unresolved, "problem metadata is stale; refreshing it");
            catalog = self.feed.load_catalog(&session, true)?;
            submissions = resolve_ids(submissions, &catalog);
        }
        if submissions.is_empty() {
            tracing::info!("no accepted submissions");
            return Ok(());
        }

        self.enter(PassState::Reconciling);
        let pending = self.reconcile(submissions);
        tracing::info!(
            pending = pending.len(),
            already_synced = self.summary.already_synced,
            "reconciled"
        );

        if options.dry_run {
            for sub in &pending {
                let built = self
                    .paths
                    .build_path(&sub.problem_id, &sub.title, &sub.language);
                let (path, outcome) = match built {
                    Ok(path) => (Some(path), ItemOutcome::Pending),
                    Err(e) => (None, skip_or_fail(&e)),
                };
                self.record(sub, path, outcome);
            }
            return Ok(());
        }
        if pending.is_empty() {
            return Ok(());
        }

        for (i, sub) in pending.iter().enumerate() {
            self.enter(PassState::Committing(i + 1));
            if i == 0 {
                self.committer.verify_repository()?;
            }
            self.commit_one(sub, &catalog)?;
        }

        if options.push && self.summary.committed() > 0 {
            if let Err(e) = self.committer.push() {
                tracing::warn!(error = %e, "push failed");
                self.reporter.push_failed(&e);
                self.summary.push_error = Some(e.to_string());
            }
        }
        Ok(())
    }

    /// Drop pairs already in the store; order the rest by (problem id, language).
    fn reconcile(&mut self, submissions: Vec<Submission>) -> Vec<Submission> {
        let mut submissions = deduplicate(submissions);
        let before = submissions.len();
        submissions.retain(|s| !self.store.is_committed(&s.problem_id, &s.language));
        self.summary.already_synced = before - submissions.len();
        submissions
    }

    fn commit_one(&mut self, sub: &Submission, catalog: &ProblemCatalog) -> Result<(), SyncError> {
        let path = match self.paths.build_path(&sub.problem_id, &sub.title, &sub.language) {
            Ok(path) => path,
            Err(e) => {
                tracing::debug!(
                    id = %sub.problem_id,
                    lang = %sub.language,
                    reason = %e,
                    "not committed"
                );
                self.record(sub, None, skip_or_fail(&e));
                return Ok(());
            }
        };

        let meta = catalog.get(&sub.title_slug);
        let commit = match self.committer.commit(sub, &path, meta) {
            Ok(commit) => commit,
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                tracing::warn!(
                    id = %sub.problem_id,
                    lang = %sub.language,
                    error = %e,
                    "commit failed"
                );
                self.record(
                    sub,
                    Some(path),
                    ItemOutcome::Failed {
                        reason: e.to_string(),
                    },
                );
                return Ok(());
            }
        };

        self.store
            .mark_committed(&sub.problem_id, &sub.language, &commit)?;

        let outcome = if commit.recovered {
            ItemOutcome::Recovered { commit: commit.id }
        } else {
            ItemOutcome::Committed { commit: commit.id }
        };
        self.record(sub, Some(path), outcome);
        Ok(())
    }

    fn record(&mut self, sub: &Submission, path: Option<PathBuf>, outcome: ItemOutcome) {
        let report = ItemReport {
            problem_id: sub.problem_id.clone(),
            language: sub.language.clone(),
            title: sub.title.clone(),
            path,
            outcome,
        };
        self.reporter.item(&report);
        self.summary.items.push(report);
    }

    fn enter(&mut self, state: PassState) {
        self.state = state;
        tracing::debug!(%state, "pass state");
        self.reporter.state_changed(state);
    }
}

fn skip_or_fail(err: &RenderError) -> ItemOutcome {
    match err {
        RenderError::UnsupportedLanguage { .. } => ItemOutcome::Skipped {
            reason: err.to_string(),
        },
        _ => ItemOutcome::Failed {
            reason: err.to_string(),
        },
    }
}
