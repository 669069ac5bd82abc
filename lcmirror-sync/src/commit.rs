//! Commit engine: one solution file, one git commit.
//!
//! ## `commit` protocol
//!
//! 1. Normalise line endings to LF and hash the content (SHA-256).
//! 2. Write to `<path>.lcmirror.tmp`, then rename over the final path.
//! 3. `git add -- <path>`.
//! 4. `git diff --cached --quiet -- <path>`: if nothing is staged the content
//!    is already in history, so the last commit touching the path is
//!    returned with `recovered: true`.
//! 5. Otherwise `git commit --only -- <path>` and return `HEAD`.
//!
//! Step 4 is what makes an interrupted pass safe to re-run: a commit that
//! landed before the state store was updated is found again instead of
//! duplicated.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use sha2::{Digest, Sha256};

use lcmirror_core::config::Author;
use lcmirror_core::{CommitRef, Config, ProblemMeta, Submission};
use lcmirror_renderer::{MessageContext, MessageRenderer};

use crate::error::{io_err, CommitError};

pub struct CommitEngine {
    repo: PathBuf,
    author: Option<Author>,
    messages: MessageRenderer,
}

impl CommitEngine {
    pub fn new(
        repo: impl Into<PathBuf>,
        author: Option<Author>,
        messages: MessageRenderer,
    ) -> Self {
        Self {
            repo: repo.into(),
            author,
            messages,
        }
    }

    /// Engine for `config.repo_path`, honouring the author and subject template.
    pub fn from_config(config: &Config) -> Result<Self, CommitError> {
        let messages = MessageRenderer::new(config.commit_template.as_deref())?;
        Ok(Self::new(&config.repo_path, config.author.clone(), messages))
    }

    /// The target must exist, be a git work tree, and not be bare.
    pub fn verify_repository(&self) -> Result<(), CommitError> {
        let unavailable = |reason: String| CommitError::RepositoryUnavailable {
            path: self.repo.clone(),
            reason,
        };

        if !self.repo.is_dir() {
            return Err(unavailable("directory does not exist".to_string()));
        }
        let output = self
            .git_output(&["rev-parse", "--is-bare-repository", "--is-inside-work-tree"])
            .map_err(|e| unavailable(format!("cannot run git: {e}")))?;
        if !output.status.success() {
            return Err(unavailable(stderr_of(&output)));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let flags: Vec<&str> = stdout.lines().map(str::trim).collect();
        match flags.as_slice() {
            ["false", "true"] => Ok(()),
            ["true", _] => Err(unavailable("bare repository".to_string())),
            _ => Err(unavailable("not a git work tree".to_string())),
        }
    }

    /// Write `submission.code` to `rel_path` and commit exactly that file.
    pub fn commit(
        &self,
        submission: &Submission,
        rel_path: &Path,
        meta: Option<&ProblemMeta>,
    ) -> Result<CommitRef, CommitError> {
        let content = submission.code.replace("\r\n", "\n");
        let digest = {
            let mut h = Sha256::new();
            h.update(content.as_bytes());
            hex::encode(h.finalize())
        };

        write_file(&self.repo.join(rel_path), &content)?;

        let rel = rel_path.to_string_lossy().into_owned();
        self.git(&["add", "--", &rel])?;

        if self.nothing_staged(&rel)? {
            let id = self.git(&["log", "-1", "--format=%H", "--", &rel])?;
            if id.is_empty() {
                return Err(CommitError::Git {
                    command: format!("log -1 -- {rel}"),
                    status: "no history".to_string(),
                    stderr: "file is unchanged but was never committed".to_string(),
                });
            }
            tracing::info!(path = %rel, commit = %id, "already in history");
            return Ok(CommitRef {
                id,
                path: rel_path.to_path_buf(),
                content_sha256: digest,
                recovered: true,
            });
        }

        let ctx = MessageContext::new(
            &submission.problem_id,
            &submission.title,
            &submission.language,
        )
        .with_meta(meta);
        let message = self.messages.render(&ctx)?;
        self.git(&["commit", "--only", "-m", &message.full(), "--", &rel])?;
        let id = self.git(&["rev-parse", "HEAD"])?;
        tracing::info!(path = %rel, commit = %id, "committed");

        Ok(CommitRef {
            id,
            path: rel_path.to_path_buf(),
            content_sha256: digest,
            recovered: false,
        })
    }

    /// `git push` with the repository's default remote and upstream.
    pub fn push(&self) -> Result<(), CommitError> {
        self.git(&["push"]).map(|_| ())
    }

    // -----------------------------------------------------------------------
    // git plumbing
    // -----------------------------------------------------------------------

    fn nothing_staged(&self, rel: &str) -> Result<bool, CommitError> {
        let args = ["diff", "--cached", "--quiet", "--", rel];
        let output = self.git_output(&args).map_err(|e| io_err(&self.repo, e))?;
        match output.status.code() {
            Some(0) => Ok(true),
            Some(1) => Ok(false),
            _ => Err(git_failed(&args, &output)),
        }
    }

    /// Run git and return trimmed stdout; non-zero exit is an error.
    fn git(&self, args: &[&str]) -> Result<String, CommitError> {
        let output = self.git_output(args).map_err(|e| io_err(&self.repo, e))?;
        if !output.status.success() {
            return Err(git_failed(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    fn git_output(&self, args: &[&str]) -> std::io::Result<Output> {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.repo);
        if let Some(author) = &self.author {
            cmd.arg("-c")
                .arg(format!("user.name={}", author.name))
                .arg("-c")
                .arg(format!("user.email={}", author.email));
        }
        tracing::debug!(?args, "git");
        cmd.args(args).output()
    }
}

fn write_file(path: &Path, content: &str) -> Result<(), CommitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let tmp = PathBuf::from(format!("{}.lcmirror.tmp", path.display()));
    std::fs::write(&tmp, content).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

fn git_failed(args: &[&str], output: &Output) -> CommitError {
    CommitError::Git {
        command: args.join(" "),
        status: output.status.to_string(),
        stderr: stderr_of(output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn write_file_creates_parents_and_leaves_no_tmp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cpp").join("1_two_sum.cpp");
        write_file(&path, "int main() {}\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "int main() {}\n");
        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("cpp"))
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let engine = CommitEngine::new(
            dir.path().join("nope"),
            None,
            MessageRenderer::new(None).unwrap(),
        );
        let err = engine.verify_repository().unwrap_err();
        assert!(err.is_fatal());
    }

    #[rstest]
    #[case::git(CommitError::Git {
        command: "add".to_string(),
        status: "exit status: 128".to_string(),
        stderr: "boom".to_string(),
    }, false)]
    #[case::io(io_err(Path::new("/repo/cpp"), std::io::Error::other("denied")), false)]
    #[case::unavailable(CommitError::RepositoryUnavailable {
        path: PathBuf::from("/repo"),
        reason: "bare".to_string(),
    }, true)]
    fn only_an_unavailable_repository_is_fatal(#[case] err: CommitError, #[case] fatal: bool) {
        assert_eq!(err.is_fatal(), fatal);
    }
}
