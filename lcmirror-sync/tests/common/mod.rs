#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use lcmirror_core::{
    CommitRef, Language, ProblemCatalog, ProblemId, ProblemMeta, SessionState, Submission,
};
use lcmirror_remote::{AuthError, FetchError};
use lcmirror_sync::{
    CommitError, Committer, ItemReport, PassState, SessionProvider, SubmissionFeed, SyncReporter,
};

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

pub fn submission(id: &str, title: &str, lang: &str, code: &str) -> Submission {
    Submission {
        problem_id: ProblemId::from(id),
        title: title.to_string(),
        title_slug: title.to_lowercase().replace(' ', "-"),
        language: Language::from(lang),
        code: code.to_string(),
        timestamp: Some(1_700_000_000),
    }
}

/// Two Sum as listed before the catalog knew it: the slug stands in for the id.
pub fn two_sum_by_slug() -> Submission {
    submission("two-sum", "Two Sum", "cpp", "class Solution {};\n")
}

pub fn two_sum_meta() -> ProblemMeta {
    ProblemMeta {
        frontend_id: "1".to_string(),
        title_slug: "two-sum".to_string(),
        title: Some("Two Sum".to_string()),
        difficulty: Some("Easy".to_string()),
        tags: vec!["Array".to_string(), "Hash Table".to_string()],
    }
}

pub fn two_sum_cpp() -> Submission {
    submission("1", "Two Sum", "cpp", "class Solution {};\n")
}

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

pub struct FakeSession {
    pub fail: bool,
}

impl SessionProvider for FakeSession {
    fn authenticate(&self, _force: bool) -> Result<SessionState, AuthError> {
        if self.fail {
            return Err(AuthError::Rejected);
        }
        let mut cookies = BTreeMap::new();
        cookies.insert("LEETCODE_SESSION".to_string(), "tok".to_string());
        Ok(SessionState::new(cookies))
    }
}

pub fn ok_session() -> FakeSession {
    FakeSession { fail: false }
}

pub struct FakeFeed {
    pub submissions: Vec<Submission>,
    pub catalog: ProblemCatalog,
    /// Returned instead of `catalog` when a refresh is forced.
    pub refreshed: Option<ProblemCatalog>,
    pub fail_fetch: bool,
    pub catalog_refreshes: RefCell<Vec<bool>>,
}

impl FakeFeed {
    pub fn new(submissions: Vec<Submission>) -> Self {
        Self {
            submissions,
            catalog: ProblemCatalog::empty(),
            refreshed: None,
            fail_fetch: false,
            catalog_refreshes: RefCell::new(Vec::new()),
        }
    }

    pub fn with_meta(mut self, meta: ProblemMeta) -> Self {
        let mut problems: Vec<ProblemMeta> = self.catalog.problems.values().cloned().collect();
        problems.push(meta);
        self.catalog = ProblemCatalog::new(problems);
        self
    }

    pub fn with_refreshed_meta(mut self, meta: ProblemMeta) -> Self {
        self.refreshed = Some(ProblemCatalog::new([meta]));
        self
    }

    pub fn failing() -> Self {
        Self {
            fail_fetch: true,
            ..Self::new(Vec::new())
        }
    }
}

impl SubmissionFeed for FakeFeed {
    fn load_catalog(
        &self,
        _session: &SessionState,
        force: bool,
    ) -> Result<ProblemCatalog, FetchError> {
        self.catalog_refreshes.borrow_mut().push(force);
        match (&self.refreshed, force) {
            (Some(fresh), true) => Ok(fresh.clone()),
            _ => Ok(self.catalog.clone()),
        }
    }

    fn fetch_accepted(
        &self,
        _session: &SessionState,
        _catalog: &ProblemCatalog,
    ) -> Result<Vec<Submission>, FetchError> {
        if self.fail_fetch {
            return Err(FetchError::Status {
                url: "https://leetcode.test/api/submissions/".to_string(),
                status: 404,
            });
        }
        Ok(self.submissions.clone())
    }
}

/// Records commit calls; fails for configured problem ids.
#[derive(Default)]
pub struct FakeCommitter {
    pub calls: RefCell<Vec<(ProblemId, Language, PathBuf)>>,
    pub fail_soft: BTreeSet<String>,
    pub fail_hard: BTreeSet<String>,
    pub repo_missing: bool,
    pub push_fails: bool,
    pub pushes: RefCell<u32>,
}

impl Committer for FakeCommitter {
    fn verify_repository(&self) -> Result<(), CommitError> {
        if self.repo_missing {
            return Err(CommitError::RepositoryUnavailable {
                path: PathBuf::from("/nowhere"),
                reason: "directory does not exist".to_string(),
            });
        }
        Ok(())
    }

    fn commit(
        &self,
        submission: &Submission,
        rel_path: &Path,
        _meta: Option<&ProblemMeta>,
    ) -> Result<CommitRef, CommitError> {
        let id = submission.problem_id.0.clone();
        if self.fail_hard.contains(&id) {
            return Err(CommitError::RepositoryUnavailable {
                path: PathBuf::from("/repo"),
                reason: "work tree vanished".to_string(),
            });
        }
        if self.fail_soft.contains(&id) {
            return Err(CommitError::Git {
                command: "commit".to_string(),
                status: "exit status: 1".to_string(),
                stderr: "hook rejected".to_string(),
            });
        }
        self.calls.borrow_mut().push((
            submission.problem_id.clone(),
            submission.language.clone(),
            rel_path.to_path_buf(),
        ));
        Ok(CommitRef {
            id: format!("c{}", self.calls.borrow().len()),
            path: rel_path.to_path_buf(),
            content_sha256: "00".to_string(),
            recovered: false,
        })
    }

    fn push(&self) -> Result<(), CommitError> {
        *self.pushes.borrow_mut() += 1;
        if self.push_fails {
            return Err(CommitError::Git {
                command: "push".to_string(),
                status: "exit status: 128".to_string(),
                stderr: "no upstream".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingReporter {
    pub states: RefCell<Vec<PassState>>,
    pub items: RefCell<Vec<ItemReport>>,
}

impl SyncReporter for RecordingReporter {
    fn state_changed(&self, state: PassState) {
        self.states.borrow_mut().push(state);
    }

    fn item(&self, report: &ItemReport) {
        self.items.borrow_mut().push(report.clone());
    }
}

// ---------------------------------------------------------------------------
// git
// ---------------------------------------------------------------------------

pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Run git in `dir`, panicking on failure; returns trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub fn init_repo(dir: &Path) {
    git(dir, &["init", "--quiet"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

pub fn commit_count(dir: &Path) -> usize {
    let out = Command::new("git")
        .current_dir(dir)
        .args(["rev-list", "--count", "HEAD"])
        .output()
        .expect("spawn git");
    if !out.status.success() {
        return 0;
    }
    String::from_utf8_lossy(&out.stdout).trim().parse().unwrap_or(0)
}
