//! # lcmirror-renderer
//!
//! Pure, deterministic rendering of everything that ends up in the solutions
//! repository: the relative path of a solution file ([`filename`]) and the
//! commit message that records it ([`message`]).
//!
//! ```rust
//! use lcmirror_core::{Language, ProblemId};
//! use lcmirror_renderer::build_path;
//!
//! let path = build_path(&ProblemId::from("1"), "Two Sum", &Language::from("cpp")).unwrap();
//! assert_eq!(path, std::path::PathBuf::from("cpp/1_two_sum.cpp"));
//! ```

pub mod error;
pub mod filename;
pub mod message;

pub use error::RenderError;
pub use filename::{build_path, slugify, ExtensionTable, FilenameBuilder};
pub use message::{CommitMessage, MessageContext, MessageRenderer};
