//! Mutating git operations: branch, checkout, commit, reset.
//!
//! All operations shell out to the system `git` binary, inheriting the user's
//! git config, hooks and credential store.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Trait for running the git commands a split needs.
///
/// This abstraction allows mocking git in tests.
#[cfg_attr(test, mockall::automock)]
pub trait GitRunner {
    /// `git checkout -b <branch> <start_point>`
    fn create_branch(&self, branch: &str, start_point: &str) -> Result<String, GitError>;

    /// `git checkout --no-overlay <source_branch> -- <paths>...`
    ///
    /// Paths absent from `source_branch` are removed from the index and the
    /// working tree.
    fn checkout_paths(&self, source_branch: &str, paths: &[String]) -> Result<String, GitError>;

    /// `git commit -m <message>`
    fn commit(&self, message: &str) -> Result<String, GitError>;

    /// `git reset --hard <target>`
    fn reset_hard(&self, target: &str) -> Result<String, GitError>;

    /// `git checkout <branch>`
    fn checkout_branch(&self, branch: &str) -> Result<String, GitError>;
}

/// Runner that calls the real `git` binary inside a working directory.
pub struct SystemGit {
    workdir: PathBuf,
}

impl SystemGit {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run a git command and return its stdout, blocking to completion.
    fn run(&self, args: &[&str], operation: &str) -> Result<String, GitError> {
        debug!("git {}", args.join(" "));

        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            .output()
            .map_err(|source| GitError::Spawn {
                operation: operation.to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitError::CommandFailed {
                operation: operation.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl GitRunner for SystemGit {
    fn create_branch(&self, branch: &str, start_point: &str) -> Result<String, GitError> {
        self.run(&["checkout", "-b", branch, start_point], "create branch")
    }

    fn checkout_paths(&self, source_branch: &str, paths: &[String]) -> Result<String, GitError> {
        let mut args = vec![
            "--literal-pathspecs",
            "checkout",
            "--no-overlay",
            source_branch,
            "--",
        ];
        args.extend(paths.iter().map(String::as_str));
        self.run(&args, "checkout paths")
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        self.run(&["commit", "-m", message], "commit")
    }

    fn reset_hard(&self, target: &str) -> Result<String, GitError> {
        self.run(&["reset", "--hard", target], "reset")
    }

    fn checkout_branch(&self, branch: &str) -> Result<String, GitError> {
        self.run(&["checkout", branch], "checkout branch")
    }
}
