//! # lcmirror-remote
//!
//! Everything that talks to the archive service:
//!
//! - [`transport`]: the blocking HTTP seam ([`Transport`], ureq-backed [`HttpTransport`])
//! - [`retry`]: bounded exponential backoff around a single request
//! - [`client`]: JSON and GraphQL calls with retries
//! - [`session`]: session validation and interactive re-authentication
//! - [`catalog`]: read-through problem metadata cache
//! - [`submissions`]: paginated, filtered, deduplicated accepted submissions

pub mod catalog;
pub mod client;
pub mod error;
pub mod retry;
pub mod session;
pub mod submissions;
pub mod transport;

pub use catalog::load_catalog;
pub use client::ApiClient;
pub use error::{AuthError, FetchError};
pub use retry::RetryPolicy;
pub use session::{InteractiveLogin, SessionManager};
pub use submissions::{deduplicate, resolve_ids, SubmissionSource};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
