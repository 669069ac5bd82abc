//! # lcmirror-sync
//!
//! Git commit engine and the reconciliation pass that drives it.
//!
//! [`CommitEngine`] turns one submission into one file and one commit.
//! [`SyncOrchestrator`] runs a pass: authenticate, fetch, filter against the
//! state store, commit what is new, record each success as it lands.

pub mod commit;
pub mod error;
pub mod orchestrator;

pub use commit::CommitEngine;
pub use error::{CommitError, SyncError};
pub use orchestrator::{
    Committer, ItemOutcome, ItemReport, NullReporter, PassAborted, PassState, PassSummary,
    RemoteFeed, SessionProvider, SubmissionFeed, SyncOptions, SyncOrchestrator, SyncReporter,
};
