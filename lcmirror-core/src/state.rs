//! Committed-pair state store.
//!
//! Persists a JSON document at `<home>/.lcmirror/state/committed.json`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "updated_at": "2026-10-19T08:00:00Z",
//!   "records": {
//!     "1": { "cpp": { "commit": "9f2c...", "path": "cpp/1_two_sum.cpp", ... } }
//!   }
//! }
//! ```
//!
//! Every mutation is written through [`write_atomic`], so after a crash the
//! file holds either the pre-write or the post-write document. The flat
//! `{ "<id>": ["<lang>", ...] }` layout written by earlier versions is read
//! transparently and upgraded on the next write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::atomic::{write_atomic, Mode};
use crate::error::{home, io_err, StoreError};
use crate::paths;
use crate::types::{CommitRef, CommittedRecord, Language, ProblemId};

pub const STATE_VERSION: u32 = 1;

/// `problem id → language → record`.
pub type RecordMap = BTreeMap<String, BTreeMap<String, CommittedRecord>>;

/// On-disk payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub records: RecordMap,
}

impl Default for StateDocument {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            updated_at: None,
            records: RecordMap::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StateCompat {
    Structured(StateDocument),
    Legacy(BTreeMap<String, Vec<String>>),
}

/// Durable record of which `(problem, language)` pairs have been committed.
///
/// Single source of truth for "has this been committed". Records are only
/// removed by [`StateStore::reset`].
#[derive(Debug)]
pub struct StateStore {
    path: PathBuf,
    doc: StateDocument,
}

impl StateStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable one is [`StoreError::Corrupt`].
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let doc = load_document(&path)?;
        Ok(Self { path, doc })
    }

    /// Open `<home>/.lcmirror/state/committed.json`.
    pub fn open_at(home: &Path) -> Result<Self, StoreError> {
        Self::open(paths::committed_path(home))
    }

    /// `open_at` convenience wrapper.
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open_at(&home()?)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_committed(&self, problem_id: &ProblemId, language: &Language) -> bool {
        self.get(problem_id, language).is_some()
    }

    pub fn get(&self, problem_id: &ProblemId, language: &Language) -> Option<&CommittedRecord> {
        self.doc
            .records
            .get(&problem_id.0)
            .and_then(|langs| langs.get(&language.0))
    }

    /// Record a committed pair and persist the store.
    ///
    /// Idempotent: returns `Ok(false)` without touching disk when the pair is
    /// already present. If persisting fails the in-memory state is rolled back
    /// so the store never claims more than the file does.
    pub fn mark_committed(
        &mut self,
        problem_id: &ProblemId,
        language: &Language,
        commit: &CommitRef,
    ) -> Result<bool, StoreError> {
        if self.is_committed(problem_id, language) {
            return Ok(false);
        }

        let record = CommittedRecord::from_commit(commit, Utc::now());
        self.doc
            .records
            .entry(problem_id.0.clone())
            .or_default()
            .insert(language.0.clone(), record);

        if let Err(e) = self.persist() {
            if let Some(langs) = self.doc.records.get_mut(&problem_id.0) {
                langs.remove(&language.0);
                if langs.is_empty() {
                    self.doc.records.remove(&problem_id.0);
                }
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Clear every record (full resync) and persist the empty store.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let previous = std::mem::take(&mut self.doc.records);
        if let Err(e) = self.persist() {
            self.doc.records = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Number of committed pairs.
    pub fn len(&self) -> usize {
        self.doc.records.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.doc.updated_at
    }

    /// All records in `(problem id, language)` order.
    pub fn records(&self) -> Vec<(ProblemId, Language, &CommittedRecord)> {
        let mut out: Vec<_> = self
            .doc
            .records
            .iter()
            .flat_map(|(id, langs)| {
                langs.iter().map(move |(lang, record)| {
                    (ProblemId::from(id.as_str()), Language::from(lang.as_str()), record)
                })
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        out
    }

    fn persist(&mut self) -> Result<(), StoreError> {
        self.doc.version = STATE_VERSION;
        self.doc.updated_at = Some(Utc::now());
        let json = serde_json::to_string_pretty(&self.doc)?;
        write_atomic(&self.path, json.as_bytes(), Mode::Shared)
    }
}

fn load_document(path: &Path) -> Result<StateDocument, StoreError> {
    if !path.exists() {
        return Ok(StateDocument::default());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let compat = serde_json::from_str::<StateCompat>(&contents).map_err(|source| {
        StoreError::Corrupt {
            path: path.to_path_buf(),
            source,
        }
    })?;
    Ok(match compat {
        StateCompat::Structured(doc) => doc,
        StateCompat::Legacy(flat) => {
            let mut records = RecordMap::new();
            for (id, langs) in flat {
                let entry = records.entry(id).or_default();
                for lang in langs {
                    entry.insert(lang, CommittedRecord::default());
                }
            }
            StateDocument {
                version: STATE_VERSION,
                updated_at: None,
                records,
            }
        }
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
