//! treesplit - split one large branch into per-directory branches.
//!
//! # Overview
//!
//! treesplit takes every path that differs between the current branch and an
//! upstream reference, groups the paths by directory (or by the nearest
//! directory holding a marker file such as `OWNERS`), and commits each group
//! to its own branch with a description rendered from a user template.

pub mod config;
pub mod description;
pub mod error;
pub mod git;
pub mod report;
pub mod split;

// Re-export commonly used types
pub use config::SplitConfig;
pub use description::DescriptionTemplate;
pub use error::{ConfigError, GitError, RenderError, SplitError, TemplateError};
pub use report::SplitPlan;
pub use split::{ChangeList, ChangeSet, SplitExecutor, SplittingPolicy, Strategy};
