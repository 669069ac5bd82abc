//! Locations under `~/.lcmirror/`.
//!
//! ```text
//! ~/.lcmirror/
//!   config.yaml
//!   session.json              (mode 0600)
//!   run.lock
//!   state/
//!     committed.json
//!     problem_metadata.json
//!   logs/
//!     sync.log
//! ```

use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yaml";
pub const SESSION_FILE: &str = "session.json";
pub const COMMITTED_FILE: &str = "committed.json";
pub const METADATA_FILE: &str = "problem_metadata.json";
pub const LOCK_FILE: &str = "run.lock";
pub const SYNC_LOG: &str = "sync.log";

pub fn lcmirror_root(home: &Path) -> PathBuf {
    home.join(".lcmirror")
}

pub fn config_path(home: &Path) -> PathBuf {
    lcmirror_root(home).join(CONFIG_FILE)
}

pub fn session_path(home: &Path) -> PathBuf {
    lcmirror_root(home).join(SESSION_FILE)
}

pub fn state_dir(home: &Path) -> PathBuf {
    lcmirror_root(home).join("state")
}

pub fn committed_path(home: &Path) -> PathBuf {
    state_dir(home).join(COMMITTED_FILE)
}

pub fn metadata_path(home: &Path) -> PathBuf {
    state_dir(home).join(METADATA_FILE)
}

pub fn lock_path(home: &Path) -> PathBuf {
    lcmirror_root(home).join(LOCK_FILE)
}

pub fn logs_dir(home: &Path) -> PathBuf {
    lcmirror_root(home).join("logs")
}

pub fn sync_log_path(home: &Path) -> PathBuf {
    logs_dir(home).join(SYNC_LOG)
}
