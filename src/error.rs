//! Error types for treesplit modules using thiserror.

use thiserror::Error;

/// Errors from validating the split configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("--marker is required when --strategy is marker-file")]
    MissingMarker,

    #[error("Marker name '{0}' must be a plain file name without path separators")]
    InvalidMarker(String),

    #[error("--marker is only valid with --strategy marker-file")]
    UnexpectedMarker,

    #[error("A commit message template is required: pass --message or --message-file")]
    MissingTemplate,

    #[error("Use either --message or --message-file, not both")]
    ConflictingTemplates,

    #[error("Failed to read message template from {path}: {source}")]
    TemplateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from compiling a description template.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Description is empty")]
    Empty,

    #[error("Description contains a NUL byte at byte {0}")]
    NulByte(usize),

    #[error("Unterminated '{{{{' at byte {0}")]
    Unterminated(usize),

    #[error("Unknown placeholder '{name}' at byte {offset}")]
    UnknownField { name: String, offset: usize },

    #[error("Malformed tag '{tag}' at byte {offset}")]
    MalformedTag { tag: String, offset: usize },

    #[error("'{{{{this}}}}' used outside of an each block at byte {0}")]
    ThisOutsideEach(usize),

    #[error("Unexpected '{{{{/{found}}}}}' at byte {offset}")]
    UnexpectedClose { found: String, offset: usize },

    #[error("Block '{0}' is never closed")]
    UnclosedBlock(String),
}

/// Errors from rendering a compiled template for one change list.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("Rendered description for {base} contains a NUL byte from {field}")]
    NulByte { base: String, field: &'static str },
}

/// Errors from git operations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git not found in PATH. Install git and try again")]
    NotInstalled,

    #[error("Failed to open repository: {0}")]
    OpenRepository(#[source] git2::Error),

    #[error("Bare repositories are not supported")]
    BareRepository,

    #[error("HEAD is detached; check out the branch you want to split")]
    DetachedHead,

    #[error("Could not determine current branch: {0}")]
    CurrentBranch(#[source] git2::Error),

    #[error("Failed to find reference '{0}': {1}")]
    ReferenceNotFound(String, #[source] git2::Error),

    #[error("Failed to list changed files: {0}")]
    DiffFailed(#[source] git2::Error),

    #[error("Working tree has uncommitted changes; commit or stash them first")]
    DirtyWorkingTree,

    #[error("Failed to run git {operation}: {source}")]
    Spawn {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed { operation: String, stderr: String },
}

/// Errors that abort a split run after branch creation has started.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Failed to reset {branch} to {upstream}; the checkout may be in an unknown state: {source}")]
    ResetFailed {
        branch: String,
        upstream: String,
        #[source]
        source: GitError,
    },
}
