//! Commit messages for solution commits.
//!
//! The subject is always one line:
//! `Add solution for {problem_id}. {title} [{language}]`. The body is
//! optional and lists difficulty and tags when the metadata cache has them.
//! A user-supplied Tera template may replace the subject; the body template
//! is fixed.

use serde::Serialize;
use tera::{Context, Tera};

use lcmirror_core::{Language, ProblemId, ProblemMeta};

use crate::error::RenderError;

const SUBJECT: &str = "subject";
const BODY: &str = "body";

const TPLS: &[(&str, &str)] = &[
    (SUBJECT, include_str!("templates/subject.tera")),
    (BODY, include_str!("templates/body.tera")),
];

/// Values exposed to the message templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageContext {
    pub problem_id: String,
    pub title: String,
    pub language: String,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
}

impl MessageContext {
    pub fn new(problem_id: &ProblemId, title: &str, language: &Language) -> Self {
        Self {
            problem_id: problem_id.0.clone(),
            title: title.to_string(),
            language: language.0.clone(),
            difficulty: None,
            tags: Vec::new(),
        }
    }

    /// Fill difficulty and tags from cached metadata.
    pub fn with_meta(mut self, meta: Option<&ProblemMeta>) -> Self {
        if let Some(meta) = meta {
            self.difficulty = meta.difficulty.clone();
            self.tags = meta.tags.clone();
        }
        self
    }
}

/// A rendered commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub subject: String,
    pub body: Option<String>,
}

impl CommitMessage {
    /// Subject, blank line, body; the form passed to `git commit -m`.
    pub fn full(&self) -> String {
        match &self.body {
            Some(body) => format!("{}\n\n{}", self.subject, body),
            None => self.subject.clone(),
        }
    }
}

pub struct MessageRenderer {
    tera: Tera,
}

impl MessageRenderer {
    /// Embedded templates, with `subject_template` replacing the default
    /// subject when given. A template that fails to parse is an error here,
    /// not at render time.
    pub fn new(subject_template: Option<&str>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        let mut items: Vec<(&str, &str)> = TPLS.to_vec();
        if let Some(custom) = subject_template {
            items.retain(|(name, _)| *name != SUBJECT);
            items.push((SUBJECT, custom));
        }
        tera.add_raw_templates(items)?;
        Ok(Self { tera })
    }

    pub fn render(&self, ctx: &MessageContext) -> Result<CommitMessage, RenderError> {
        let tera_ctx = Context::from_serialize(ctx)?;

        // Subjects are single-line; anything after the first line is dropped.
        let rendered = self.tera.render(SUBJECT, &tera_ctx)?;
        let subject = rendered.lines().next().unwrap_or_default().trim().to_string();

        let body = self.tera.render(BODY, &tera_ctx)?;
        let body = body.trim();
        Ok(CommitMessage {
            subject,
            body: (!body.is_empty()).then(|| body.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
