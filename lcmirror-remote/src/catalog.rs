//! Problem metadata catalog: read-through cache over the GraphQL problem list.

use std::path::Path;

use lcmirror_core::{metadata, ProblemCatalog, ProblemMeta, SessionState};
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiClient;
use crate::error::FetchError;

const CATALOG_PAGE: usize = 1000;

const QUESTION_LIST_QUERY: &str = r#"
query problemsetQuestionListV2($categorySlug: String, $limit: Int, $skip: Int, $filters: QuestionFilterInput) {
  problemsetQuestionListV2(categorySlug: $categorySlug, limit: $limit, skip: $skip, filters: $filters) {
    questions {
      questionFrontendId
      titleSlug
      title
      difficulty
      topicTags { name }
    }
    hasMore
  }
}"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionListData {
    problemset_question_list_v2: QuestionPage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionPage {
    #[serde(default)]
    questions: Vec<Question>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    question_frontend_id: String,
    title_slug: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    topic_tags: Vec<TopicTag>,
}

#[derive(Deserialize)]
struct TopicTag {
    name: String,
}

impl From<Question> for ProblemMeta {
    fn from(q: Question) -> Self {
        ProblemMeta {
            frontend_id: q.question_frontend_id,
            title_slug: q.title_slug,
            title: q.title,
            difficulty: q.difficulty.as_deref().map(title_case),
            tags: q.topic_tags.into_iter().map(|t| t.name).collect(),
        }
    }
}

/// `EASY` → `Easy`.
fn title_case(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cached catalog unless `force_refresh` is set or nothing is cached; a
/// fetched catalog replaces the cache atomically.
pub fn load_catalog(
    client: &ApiClient,
    session: &SessionState,
    home: &Path,
    force_refresh: bool,
) -> Result<ProblemCatalog, FetchError> {
    if !force_refresh {
        if let Some(cached) = metadata::load_at(home)? {
            tracing::debug!(problems = cached.len(), "using cached problem metadata");
            return Ok(cached);
        }
    }

    tracing::info!("fetching problem metadata");
    let catalog = fetch_catalog(client, session)?;
    metadata::save_at(home, &catalog)?;
    tracing::info!(problems = catalog.len(), "problem metadata saved");
    Ok(catalog)
}

fn fetch_catalog(client: &ApiClient, session: &SessionState) -> Result<ProblemCatalog, FetchError> {
    let mut problems = Vec::new();
    let mut skip = 0;
    loop {
        let variables = json!({
            "categorySlug": "all-code-essentials",
            "skip": skip,
            "limit": CATALOG_PAGE,
            "filters": {},
        });
        let data: QuestionListData = client.graphql(
            session,
            "problemsetQuestionListV2",
            QUESTION_LIST_QUERY,
            variables,
        )?;
        let page = data.problemset_question_list_v2;
        let count = page.questions.len();
        problems.extend(page.questions.into_iter().map(ProblemMeta::from));
        if count == 0 || !page.has_more {
            break;
        }
        skip += count;
    }
    Ok(ProblemCatalog::new(problems))
}
