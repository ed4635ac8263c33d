//! Read-only repository queries using git2.

use std::path::Path;

use git2::{Delta, DiffOptions, Oid, Repository, StatusOptions};
use tracing::debug;

use crate::error::GitError;

/// Check that the `git` binary is available for the mutating steps.
pub fn check_git_installed() -> Result<(), GitError> {
    which::which("git").map(|_| ()).map_err(|_| GitError::NotInstalled)
}

/// Open the non-bare repository containing `path`.
pub fn open_repository(path: &Path) -> Result<Repository, GitError> {
    let repo = Repository::discover(path).map_err(GitError::OpenRepository)?;
    if repo.is_bare() {
        return Err(GitError::BareRepository);
    }
    Ok(repo)
}

/// Get the current branch name.
pub fn current_branch(repo: &Repository) -> Result<String, GitError> {
    let head = repo.head().map_err(GitError::CurrentBranch)?;

    if !head.is_branch() {
        return Err(GitError::DetachedHead);
    }

    head.shorthand()
        .map(String::from)
        .ok_or_else(|| GitError::CurrentBranch(git2::Error::from_str("branch name is not UTF-8")))
}

/// Resolve a reference (branch, remote branch, tag, commit hash) to a commit OID.
pub fn resolve_reference(repo: &Repository, reference: &str) -> Result<Oid, GitError> {
    if let Ok(oid) = Oid::from_str(reference) {
        if repo.find_commit(oid).is_ok() {
            return Ok(oid);
        }
    }

    let obj = repo
        .revparse_single(reference)
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    let commit = obj
        .peel_to_commit()
        .map_err(|e| GitError::ReferenceNotFound(reference.to_string(), e))?;
    Ok(commit.id())
}

/// List paths that differ between `upstream` and the working tree.
///
/// Equivalent to `git diff --name-only <upstream>`: tracked changes only,
/// deleted files reported by their old path, in diff order.
pub fn changed_files(repo: &Repository, upstream: &str) -> Result<Vec<String>, GitError> {
    let oid = resolve_reference(repo, upstream)?;
    let tree = repo
        .find_commit(oid)
        .and_then(|c| c.tree())
        .map_err(|e| GitError::ReferenceNotFound(upstream.to_string(), e))?;

    let mut opts = DiffOptions::new();
    opts.include_untracked(false);
    let diff = repo
        .diff_tree_to_workdir_with_index(Some(&tree), Some(&mut opts))
        .map_err(GitError::DiffFailed)?;

    let mut files = Vec::new();
    for delta in diff.deltas() {
        let file = match delta.status() {
            Delta::Deleted => delta.old_file(),
            _ => delta.new_file(),
        };
        if let Some(path) = file.path() {
            files.push(path.to_string_lossy().to_string());
        }
    }

    debug!("{} files changed relative to {}", files.len(), upstream);
    Ok(files)
}

/// Fail if the working tree has uncommitted changes to tracked files.
pub fn ensure_clean_working_tree(repo: &Repository) -> Result<(), GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(false).include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts)).map_err(GitError::DiffFailed)?;
    if statuses.is_empty() {
        Ok(())
    } else {
        debug!("{} uncommitted entries in working tree", statuses.len());
        Err(GitError::DirtyWorkingTree)
    }
}
