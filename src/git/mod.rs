//! Git access: git2 for queries, the `git` binary for mutations.

pub mod repo;
pub mod runner;

pub use repo::{
    changed_files, check_git_installed, current_branch, ensure_clean_working_tree,
    open_repository, resolve_reference,
};
pub use runner::{GitRunner, SystemGit};
