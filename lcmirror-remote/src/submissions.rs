//! Accepted-submission listing: paging, filtering, id resolution, dedup.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use lcmirror_core::{Language, ProblemCatalog, ProblemId, SessionState, Submission};
use serde::Deserialize;
use serde_json::Value;

use crate::client::ApiClient;
use crate::error::FetchError;

pub const SUBMISSIONS_PATH: &str = "/api/submissions/";
const ACCEPTED: &str = "Accepted";
const PAGE_DELAY: Duration = Duration::from_millis(300);
const MAX_PAGES: usize = 10_000;

#[derive(Debug, Deserialize)]
struct SubmissionPage {
    #[serde(default)]
    submissions_dump: Vec<RawSubmission>,
    #[serde(default)]
    has_next: Option<bool>,
    #[serde(default)]
    last_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSubmission {
    #[serde(default)]
    status_display: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    title_slug: String,
    #[serde(default)]
    lang: String,
    #[serde(default)]
    code: String,
    #[serde(default)]
    timestamp: Option<Value>,
}

impl RawSubmission {
    fn timestamp(&self) -> Option<i64> {
        match self.timestamp.as_ref()? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

pub struct SubmissionSource<'a> {
    client: &'a ApiClient,
    page_delay: Duration,
}

impl<'a> SubmissionSource<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self {
            client,
            page_delay: PAGE_DELAY,
        }
    }

    /// Pause between page requests.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Every accepted submission, one per `(problem id, language)`, in
    /// ascending key order.
    ///
    /// Read-only; any page failure (after retries) fails the whole call so a
    /// partial listing is never mistaken for a complete one.
    pub fn fetch_accepted_submissions(
        &self,
        session: &SessionState,
        catalog: &ProblemCatalog,
    ) -> Result<Vec<Submission>, FetchError> {
        let limit = self.client.page_size();
        let mut offset = 0;
        let mut cursor = String::new();
        let mut seen_cursors = BTreeSet::new();
        let mut accepted = Vec::new();

        for page_no in 0..MAX_PAGES {
            if page_no > 0 && !self.page_delay.is_zero() {
                std::thread::sleep(self.page_delay);
            }
            let path = format!(
                "{SUBMISSIONS_PATH}?offset={offset}&limit={limit}&lastkey={}",
                urlencoding::encode(&cursor)
            );
            let page: SubmissionPage = self.client.get_json(session, &path)?;
            let count = page.submissions_dump.len();
            tracing::debug!(offset, count, "submission page");
            if count == 0 {
                break;
            }

            accepted.extend(
                page.submissions_dump
                    .into_iter()
                    .filter_map(|raw| to_submission(raw, catalog)),
            );

            if page.has_next == Some(false) {
                break;
            }
            match page.last_key {
                Some(key) if !seen_cursors.insert(key.clone()) => {
                    tracing::warn!(cursor = %key, "submission cursor repeated; stopping");
                    break;
                }
                Some(key) => cursor = key,
                None => {}
            }
            offset += count;
        }

        let deduped = deduplicate(accepted);
        tracing::info!(count = deduped.len(), "accepted submissions fetched");
        Ok(deduped)
    }
}

fn to_submission(raw: RawSubmission, catalog: &ProblemCatalog) -> Option<Submission> {
    if raw.status_display != ACCEPTED || raw.code.is_empty() || raw.title_slug.is_empty() {
        return None;
    }
    let timestamp = raw.timestamp();
    let problem_id = match catalog.get(&raw.title_slug) {
        Some(meta) => ProblemId::from(meta.frontend_id.as_str()),
        None => {
            tracing::warn!(slug = %raw.title_slug, "problem id not in metadata; using slug");
            ProblemId::from(raw.title_slug.as_str())
        }
    };
    Some(Submission {
        problem_id,
        title: raw.title,
        title_slug: raw.title_slug,
        language: Language::normalize(&raw.lang),
        code: raw.code,
        timestamp,
    })
}

/// Re-resolve problem ids against a newer catalog.
///
/// Submissions whose slug the catalog knows get its frontend id; the rest
/// keep the id they had. Output is deduplicated and sorted like
/// [`SubmissionSource::fetch_accepted_submissions`].
pub fn resolve_ids(submissions: Vec<Submission>, catalog: &ProblemCatalog) -> Vec<Submission> {
    let resolved = submissions
        .into_iter()
        .map(|mut sub| {
            if let Some(meta) = catalog.get(&sub.title_slug) {
                sub.problem_id = ProblemId::from(meta.frontend_id.as_str());
            }
            sub
        })
        .collect();
    deduplicate(resolved)
}

/// Keep one submission per `(problem id, language)`.
///
/// The later timestamp wins. When timestamps are equal or missing, the one
/// that appears later in `submissions` wins. Output is sorted by key.
pub fn deduplicate(submissions: Vec<Submission>) -> Vec<Submission> {
    let mut latest: BTreeMap<(ProblemId, Language), Submission> = BTreeMap::new();
    for sub in submissions {
        let key = sub.key();
        let replace = match latest.get(&key) {
            None => true,
            Some(existing) => match (sub.timestamp, existing.timestamp) {
                (Some(new), Some(old)) => new >= old,
                _ => true,
            },
        };
        if replace {
            latest.insert(key, sub);
        }
    }
    latest.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lcmirror_core::ProblemMeta;

    fn sub(id: &str, lang: &str, ts: Option<i64>, code: &str) -> Submission {
        Submission {
            problem_id: ProblemId::from(id),
            title: "t".to_string(),
            title_slug: "t".to_string(),
            language: Language::from(lang),
            code: code.to_string(),
            timestamp: ts,
        }
    }

    #[test]
    fn later_timestamp_wins_regardless_of_order() {
        let out = deduplicate(vec![
            sub("121", "python", Some(200), "new"),
            sub("121", "python", Some(100), "old"),
        ]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "new");
    }

    #[test]
    fn equal_timestamps_keep_last_returned() {
        let out = deduplicate(vec![
            sub("1", "cpp", Some(5), "first"),
            sub("1", "cpp", Some(5), "second"),
        ]);
        assert_eq!(out[0].code, "second");
    }

    #[test]
    fn missing_timestamp_keeps_last_returned() {
        let out = deduplicate(vec![
            sub("1", "cpp", Some(9), "first"),
            sub("1", "cpp", None, "second"),
        ]);
        assert_eq!(out[0].code, "second");
    }

    #[test]
    fn languages_are_distinct_keys_and_output_is_sorted() {
        let out = deduplicate(vec![
            sub("10", "java", None, "a"),
            sub("2", "python", None, "b"),
            sub("2", "cpp", None, "c"),
        ]);
        let keys: Vec<_> = out
            .iter()
            .map(|s| format!("{}/{}", s.problem_id, s.language))
            .collect();
        assert_eq!(keys, vec!["2/cpp", "2/python", "10/java"]);
    }

    #[test]
    fn slug_ids_pick_up_frontend_ids_from_a_newer_catalog() {
        let mut stale = sub("two-sum", "cpp", Some(1), "a");
        stale.title_slug = "two-sum".to_string();
        let mut known = sub("9", "cpp", Some(1), "b");
        known.title_slug = "palindrome-number".to_string();
        let catalog = ProblemCatalog::new([ProblemMeta {
            frontend_id: "1".to_string(),
            title_slug: "two-sum".to_string(),
            title: None,
            difficulty: None,
            tags: Vec::new(),
        }]);

        let out = resolve_ids(vec![known, stale], &catalog);
        let ids: Vec<_> = out.iter().map(|s| s.problem_id.to_string()).collect();
        assert_eq!(ids, vec!["1", "9"]);
    }

    #[test]
    fn string_timestamps_are_parsed() {
        let json = r#"{"status_display":"Accepted","timestamp":"1700000000"}"#;
        let raw: RawSubmission = serde_json::from_str(json).unwrap();
        assert_eq!(raw.timestamp(), Some(1_700_000_000));
    }
}
