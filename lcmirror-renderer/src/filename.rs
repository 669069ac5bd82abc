//! Deterministic solution paths.
//!
//! # Layout
//!
//! | Input                              | Output                           |
//! |------------------------------------|----------------------------------|
//! | `1`, `Two Sum`, `cpp`              | `cpp/1_two_sum.cpp`              |
//! | `121`, `Best Time to Buy...`, `python` | `python/121_best_time_to_buy....py` |
//! | `5`, `Longest...`, `rust`          | `UnsupportedLanguage` (built-in) |
//!
//! Everything here is a pure function of its inputs: no IO, no clock, no
//! randomness. Re-fetched submissions therefore map to identical paths.

use std::collections::BTreeMap;
use std::path::PathBuf;

use lcmirror_core::{Language, ProblemId};

use crate::error::RenderError;

/// Built-in `language → extension` table.
///
/// Deliberately closed: an unknown language is an error, never a guess.
const BUILTIN_EXTENSIONS: &[(&str, &str)] = &[
    ("bash", "sh"),
    ("c", "c"),
    ("cpp", "cpp"),
    ("csharp", "cs"),
    ("dart", "dart"),
    ("elixir", "ex"),
    ("erlang", "erl"),
    ("go", "go"),
    ("java", "java"),
    ("javascript", "js"),
    ("kotlin", "kt"),
    ("mssql", "sql"),
    ("mysql", "sql"),
    ("oraclesql", "sql"),
    ("php", "php"),
    ("postgresql", "sql"),
    ("python", "py"),
    ("racket", "rkt"),
    ("ruby", "rb"),
    ("scala", "scala"),
    ("swift", "swift"),
    ("typescript", "ts"),
];

/// Enumerated mapping from language tag to canonical file extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionTable {
    entries: BTreeMap<String, String>,
}

impl ExtensionTable {
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_EXTENSIONS
                .iter()
                .map(|(lang, ext)| ((*lang).to_string(), (*ext).to_string()))
                .collect(),
        }
    }

    /// Built-in table plus user entries; user entries win on conflict.
    pub fn with_extra<'a>(extra: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut table = Self::builtin();
        for (lang, ext) in extra {
            table.entries.insert(
                lang.to_ascii_lowercase(),
                ext.trim_start_matches('.').to_string(),
            );
        }
        table
    }

    pub fn extension(&self, language: &Language) -> Option<&str> {
        self.entries.get(language.as_str()).map(String::as_str)
    }
}

impl Default for ExtensionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Maps `(problem id, title, language)` to a path relative to the repo root.
#[derive(Debug, Clone, Default)]
pub struct FilenameBuilder {
    table: ExtensionTable,
}

impl FilenameBuilder {
    pub fn new(table: ExtensionTable) -> Self {
        Self { table }
    }

    /// `<language>/<id>_<slug>.<ext>`, or `<language>/<id>.<ext>` when the
    /// title has no alphanumeric characters.
    pub fn build_path(
        &self,
        problem_id: &ProblemId,
        title: &str,
        language: &Language,
    ) -> Result<PathBuf, RenderError> {
        let ext = self
            .table
            .extension(language)
            .ok_or_else(|| RenderError::UnsupportedLanguage {
                language: language.0.clone(),
            })?;
        if !is_safe_id(&problem_id.0) {
            return Err(RenderError::InvalidProblemId {
                id: problem_id.0.clone(),
            });
        }

        let slug = slugify(title);
        let stem = if slug.is_empty() {
            problem_id.0.clone()
        } else {
            format!("{}_{slug}", problem_id.0)
        };
        Ok(PathBuf::from(language.as_str()).join(format!("{stem}.{ext}")))
    }
}

/// [`FilenameBuilder::build_path`] against the built-in extension table.
pub fn build_path(
    problem_id: &ProblemId,
    title: &str,
    language: &Language,
) -> Result<PathBuf, RenderError> {
    FilenameBuilder::default().build_path(problem_id, title, language)
}

/// Lowercase ASCII slug; runs of anything non-alphanumeric become one `_`.
///
/// `"Best Time to Buy and Sell Stock"` → `"best_time_to_buy_and_sell_stock"`,
/// `"Pow(x, n)"` → `"pow_x_n"`.
pub fn slugify(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}

fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
