//! lcmirror core library: domain types, persisted stores, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`StoreError`]
//! - [`config`]: `~/.lcmirror/config.yaml`
//! - [`state`]: the committed-pair [`StateStore`]
//! - [`session_store`]: persisted authentication context
//! - [`metadata`]: problem metadata cache

pub mod atomic;
pub mod config;
pub mod error;
pub mod metadata;
pub mod paths;
pub mod session_store;
pub mod state;
pub mod types;

pub use config::Config;
pub use error::StoreError;
pub use metadata::ProblemCatalog;
pub use state::StateStore;
pub use types::{
    CommitRef, CommittedRecord, Language, ProblemId, ProblemMeta, SessionState, Submission,
    CSRF_COOKIE, SESSION_COOKIE,
};
