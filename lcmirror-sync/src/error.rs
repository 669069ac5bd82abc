//! Error types for lcmirror-sync.

use std::path::PathBuf;

use thiserror::Error;

use lcmirror_core::StoreError;
use lcmirror_remote::{AuthError, FetchError};
use lcmirror_renderer::RenderError;

/// Failures of the commit engine.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The target is missing, not a git work tree, or bare. Fatal for the pass.
    #[error("repository at {path} is unavailable: {reason}")]
    RepositoryUnavailable { path: PathBuf, reason: String },

    /// Writing the solution file failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A git command exited unsuccessfully.
    #[error("`git {command}` failed ({status}): {stderr}")]
    Git {
        command: String,
        status: String,
        stderr: String,
    },

    /// The commit message template could not be rendered.
    #[error("commit message: {0}")]
    Render(#[from] RenderError),
}

impl CommitError {
    /// Whether the pass must stop instead of moving to the next item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CommitError::RepositoryUnavailable { .. })
    }
}

/// Pass-level causes of an abort.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("fetching submissions failed: {0}")]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Commit(#[from] CommitError),

    #[error("state store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience constructor for [`CommitError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CommitError {
    CommitError::Io {
        path: path.into(),
        source,
    }
}
