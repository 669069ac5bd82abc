//! Domain types for lcmirror.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! All types are serializable/deserializable via serde.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Stable identifier of a problem on the archive service.
///
/// Usually the numeric frontend id (`"121"`); falls back to the title slug
/// when the id cannot be resolved. Numeric ids order numerically and sort
/// before slugs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(pub String);

impl ProblemId {
    fn numeric(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for ProblemId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ProblemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProblemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProblemId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<u32> for ProblemId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

/// Canonical, lowercase language tag (`cpp`, `python`, `go`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(pub String);

impl Language {
    /// Normalise a language tag as reported by the archive service.
    ///
    /// `python3` → `python`, `golang` → `go`; every other tag is lowercased
    /// with non-alphanumeric characters dropped.
    pub fn normalize(remote: &str) -> Self {
        let lowered: String = remote
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect();
        let canonical = match lowered.as_str() {
            "python3" | "python2" => "python".to_string(),
            "golang" => "go".to_string(),
            _ => lowered,
        };
        Self(canonical)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Language {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Language {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// One accepted attempt, as returned by the archive service.
///
/// Identity for deduplication is `(problem_id, language)`; `timestamp` only
/// decides which of several accepted attempts survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub problem_id: ProblemId,
    pub title: String,
    pub title_slug: String,
    pub language: Language,
    pub code: String,
    /// Unix seconds; `None` when the service omitted it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Submission {
    /// The `(problem_id, language)` pair this submission is deduplicated on.
    pub fn key(&self) -> (ProblemId, Language) {
        (self.problem_id.clone(), self.language.clone())
    }
}

/// Result of a successful commit, as reported by the commit engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    /// Full commit hash.
    pub id: String,
    /// Path of the solution file, relative to the repository root.
    pub path: PathBuf,
    /// SHA-256 hex digest of the committed content.
    pub content_sha256: String,
    /// `true` when the repository already held an identical commit and no new
    /// commit was created.
    #[serde(default)]
    pub recovered: bool,
}

/// Audit payload stored for every committed `(problem, language)` pair.
///
/// Presence is what matters; every field is optional so records migrated from
/// the legacy `{ id: [lang, ...] }` layout stay valid.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommittedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_at: Option<DateTime<Utc>>,
}

impl CommittedRecord {
    pub fn from_commit(commit: &CommitRef, committed_at: DateTime<Utc>) -> Self {
        Self {
            commit: Some(commit.id.clone()),
            path: Some(commit.path.clone()),
            content_sha256: Some(commit.content_sha256.clone()),
            committed_at: Some(committed_at),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Name of the session cookie the archive service authenticates with.
pub const SESSION_COOKIE: &str = "LEETCODE_SESSION";
/// Name of the CSRF cookie; its value is echoed in the `x-csrftoken` header.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Authentication context for the archive service.
///
/// `valid` is runtime-only: it is set by the session manager after a
/// successful probe and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub cookies: BTreeMap<String, String>,
    pub obtained_at: DateTime<Utc>,
    #[serde(skip)]
    pub valid: bool,
}

impl SessionState {
    pub fn new(cookies: BTreeMap<String, String>) -> Self {
        Self {
            cookies,
            obtained_at: Utc::now(),
            valid: false,
        }
    }

    pub fn csrf_token(&self) -> Option<&str> {
        self.cookies.get(CSRF_COOKIE).map(String::as_str)
    }

    /// `Cookie` header value: `k1=v1; k2=v2` in key order.
    pub fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn has_credentials(&self) -> bool {
        self.cookies
            .get(SESSION_COOKIE)
            .is_some_and(|v| !v.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Problem metadata
// ---------------------------------------------------------------------------

/// Descriptive fields of a problem, used to resolve ids and enrich commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemMeta {
    pub frontend_id: String,
    pub title_slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids: Vec<ProblemId> = ["121", "2", "10", "1"]
            .into_iter()
            .map(ProblemId::from)
            .collect();
        ids.sort();
        let got: Vec<_> = ids.iter().map(|i| i.0.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "10", "121"]);
    }

    #[test]
    fn slugs_sort_after_numeric_ids() {
        let mut ids = vec![
            ProblemId::from("two-sum"),
            ProblemId::from("7"),
            ProblemId::from("add-binary"),
        ];
        ids.sort();
        assert_eq!(ids[0], ProblemId::from("7"));
        assert_eq!(ids[1], ProblemId::from("add-binary"));
        assert_eq!(ids[2], ProblemId::from("two-sum"));
    }

    #[test]
    fn ordering_is_consistent_with_equality() {
        let a = ProblemId::from("01");
        let b = ProblemId::from("1");
        assert_ne!(a, b);
        assert_ne!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn language_normalization() {
        assert_eq!(Language::normalize("python3"), Language::from("python"));
        assert_eq!(Language::normalize("golang"), Language::from("go"));
        assert_eq!(Language::normalize("CPP"), Language::from("cpp"));
        assert_eq!(Language::normalize(" rust "), Language::from("rust"));
    }

    #[test]
    fn cookie_header_is_key_ordered() {
        let mut cookies = BTreeMap::new();
        cookies.insert(SESSION_COOKIE.to_string(), "abc".to_string());
        cookies.insert(CSRF_COOKIE.to_string(), "tok".to_string());
        let session = SessionState::new(cookies);
        assert_eq!(session.cookie_header(), "LEETCODE_SESSION=abc; csrftoken=tok");
        assert_eq!(session.csrf_token(), Some("tok"));
        assert!(session.has_credentials());
    }

    #[test]
    fn session_validity_is_not_persisted() {
        let mut session = SessionState::new(BTreeMap::new());
        session.valid = true;
        let json = serde_json::to_string(&session).expect("serialize");
        let back: SessionState = serde_json::from_str(&json).expect("deserialize");
        assert!(!back.valid);
    }
}
