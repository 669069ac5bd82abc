//! `~/.lcmirror/config.yaml`.
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::atomic::{write_atomic, Mode};
use crate::error::{home, io_err, StoreError};
use crate::paths;

pub const DEFAULT_BASE_URL: &str = "https://leetcode.com";
pub const DEFAULT_PAGE_SIZE: usize = 20;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_retry_after_ms() -> u64 {
    300_000
}

/// Bounded exponential backoff settings for remote calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Upper bound on a server-sent `Retry-After`; backoff itself stays
    /// under `max_delay_ms`.
    #[serde(default = "default_max_retry_after_ms")]
    pub max_retry_after_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            max_retry_after_ms: default_max_retry_after_ms(),
        }
    }
}

/// Identity used for solution commits when set; otherwise git's own config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Working tree of the solutions repository.
    pub repo_path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub retry: RetrySettings,
    /// Run `git push` once after a pass that created commits.
    #[serde(default)]
    pub push: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    /// Language tag → file extension, added to the built-in table.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_extensions: BTreeMap<String, String>,
    /// Tera template for the commit subject; see `lcmirror-renderer`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_template: Option<String>,
}

impl Config {
    pub fn new(repo_path: PathBuf) -> Self {
        Self {
            repo_path,
            username: None,
            base_url: default_base_url(),
            page_size: default_page_size(),
            retry: RetrySettings::default(),
            push: false,
            author: None,
            extra_extensions: BTreeMap::new(),
            commit_template: None,
        }
    }
}

/// Load `<home>/.lcmirror/config.yaml`.
///
/// Returns `StoreError::ConfigNotFound` if absent, `StoreError::ConfigParse`
/// (with path + line context) if malformed.
pub fn load_at(home: &Path) -> Result<Config, StoreError> {
    let path = paths::config_path(home);
    if !path.exists() {
        return Err(StoreError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|source| StoreError::ConfigParse { path, source })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, StoreError> {
    load_at(&home()?)
}

/// Atomically save the config (mode 0600: it names a private repository path).
pub fn save_at(home: &Path, config: &Config) -> Result<(), StoreError> {
    let yaml = serde_yaml::to_string(config)?;
    write_atomic(&paths::config_path(home), yaml.as_bytes(), Mode::Private)
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), StoreError> {
    save_at(&home()?, config)
}
