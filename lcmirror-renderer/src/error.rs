//! Error types for lcmirror-renderer.

use thiserror::Error;

/// All errors that can arise from path building and message rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The language has no entry in the extension table.
    #[error("unsupported language '{language}': no file extension mapping")]
    UnsupportedLanguage { language: String },

    /// The problem id cannot be used as a path component.
    #[error("problem id '{id}' is not filesystem-safe")]
    InvalidProblemId { id: String },

    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),
}
