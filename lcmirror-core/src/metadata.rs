//! Problem metadata cache, `<home>/.lcmirror/state/problem_metadata.json`.
//!
//! Read-mostly and allowed to go stale: it only resolves title slugs to
//! frontend ids and enriches commit messages. The remote crate refreshes it
//! wholesale; this module only loads and saves it.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{write_atomic, Mode};
use crate::error::{io_err, StoreError};
use crate::paths;
use crate::types::ProblemMeta;

/// Metadata for every known problem, keyed by title slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemCatalog {
    pub fetched_at: DateTime<Utc>,
    pub problems: BTreeMap<String, ProblemMeta>,
}

impl ProblemCatalog {
    pub fn new(problems: impl IntoIterator<Item = ProblemMeta>) -> Self {
        Self {
            fetched_at: Utc::now(),
            problems: problems
                .into_iter()
                .map(|p| (p.title_slug.clone(), p))
                .collect(),
        }
    }

    pub fn empty() -> Self {
        Self::new(std::iter::empty())
    }

    pub fn get(&self, title_slug: &str) -> Option<&ProblemMeta> {
        self.problems.get(title_slug)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }
}

/// Entry shape written by earlier versions: the raw GraphQL question list.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyQuestion {
    question_frontend_id: String,
    title_slug: String,
    #[serde(default)]
    difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogCompat {
    Structured(ProblemCatalog),
    Legacy(Vec<LegacyQuestion>),
}

/// Load the cached catalog, `Ok(None)` if nothing is cached yet.
pub fn load_at(home: &Path) -> Result<Option<ProblemCatalog>, StoreError> {
    let path = paths::metadata_path(home);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let compat = serde_json::from_str::<CatalogCompat>(&contents)
        .map_err(|source| StoreError::Corrupt { path, source })?;
    Ok(Some(match compat {
        CatalogCompat::Structured(catalog) => catalog,
        CatalogCompat::Legacy(questions) => ProblemCatalog::new(questions.into_iter().map(|q| {
            ProblemMeta {
                frontend_id: q.question_frontend_id,
                title_slug: q.title_slug,
                title: None,
                difficulty: q.difficulty,
                tags: Vec::new(),
            }
        })),
    }))
}

/// Atomically replace the cached catalog.
pub fn save_at(home: &Path, catalog: &ProblemCatalog) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(catalog)?;
    write_atomic(&paths::metadata_path(home), json.as_bytes(), Mode::Shared)
}
