//! Materialize a change set as one branch per change list.
//!
//! Buckets are processed strictly one after another since every step mutates
//! the single working checkout.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::description::DescriptionTemplate;
use crate::error::SplitError;
use crate::git::GitRunner;

use super::changeset::{ChangeList, ChangeSet};

/// The step of a bucket's split that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    CreateBranch,
    CheckoutPath,
    Commit,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::CreateBranch => write!(f, "create branch"),
            Stage::CheckoutPath => write!(f, "check out affected paths"),
            Stage::Commit => write!(f, "commit"),
        }
    }
}

/// What happened to one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum BucketStatus {
    Created,
    Skipped { reason: String },
    Failed { stage: Stage, error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketOutcome {
    pub branch: String,
    pub base_directory: String,
    pub file_count: usize,
    #[serde(flatten)]
    pub status: BucketStatus,
}

impl BucketOutcome {
    pub fn is_created(&self) -> bool {
        self.status == BucketStatus::Created
    }
}

/// Drives git to create one branch and commit per change list.
pub struct SplitExecutor<'a, G: GitRunner> {
    git: &'a G,
    upstream: &'a str,
    template: &'a DescriptionTemplate,
}

impl<'a, G: GitRunner> SplitExecutor<'a, G> {
    pub fn new(git: &'a G, upstream: &'a str, template: &'a DescriptionTemplate) -> Self {
        Self {
            git,
            upstream,
            template,
        }
    }

    /// Split every change list onto its own branch, then return to the root
    /// branch.
    ///
    /// Per-bucket failures are recorded in the returned outcomes. Only a failed
    /// reset aborts the run, since the checkout is then in an unknown state.
    pub fn run(&self, change_set: &ChangeSet) -> Result<Vec<BucketOutcome>, SplitError> {
        let root = change_set.branch_name();
        let mut claimed: HashSet<String> = HashSet::new();
        let mut outcomes = Vec::with_capacity(change_set.len());

        for list in change_set {
            let branch = list.branch_name(root);

            let status = if claimed.contains(&branch) {
                warn!(
                    "Branch {} is already used by another bucket; skipping {}",
                    branch,
                    list.base_directory()
                );
                BucketStatus::Skipped {
                    reason: format!("branch name {branch} collides with an earlier bucket"),
                }
            } else {
                claimed.insert(branch.clone());
                self.split_one(root, &branch, list)?
            };

            outcomes.push(BucketOutcome {
                branch,
                base_directory: list.base_directory().to_string(),
                file_count: list.file_count(),
                status,
            });
        }

        if let Err(e) = self.git.checkout_branch(root) {
            warn!("Failed to return to {}: {}", root, e);
        }

        Ok(outcomes)
    }

    fn split_one(
        &self,
        root: &str,
        branch: &str,
        list: &ChangeList,
    ) -> Result<BucketStatus, SplitError> {
        info!("Preparing branch {}", branch);

        if let Err(e) = self.git.create_branch(branch, self.upstream) {
            warn!("Failed to create new branch {}: {}", branch, e);
            return Ok(BucketStatus::Failed {
                stage: Stage::CreateBranch,
                error: e.to_string(),
            });
        }

        if let Err(e) = self.git.checkout_paths(root, list.affected_paths()) {
            warn!(
                "Failed to check out {} paths under {} from {}: {}",
                list.file_count(),
                list.base_directory(),
                root,
                e
            );
            self.reset(branch)?;
            return Ok(BucketStatus::Failed {
                stage: Stage::CheckoutPath,
                error: e.to_string(),
            });
        }

        let description = self.template.render(list);

        if let Err(e) = self.git.commit(&description) {
            warn!("Failed to commit {}: {}", branch, e);
            self.reset(branch)?;
            return Ok(BucketStatus::Failed {
                stage: Stage::Commit,
                error: e.to_string(),
            });
        }

        info!("Created {} with {} files", branch, list.file_count());
        Ok(BucketStatus::Created)
    }

    fn reset(&self, branch: &str) -> Result<(), SplitError> {
        self.git
            .reset_hard(self.upstream)
            .map(|_| ())
            .map_err(|source| SplitError::ResetFailed {
                branch: branch.to_string(),
                upstream: self.upstream.to_string(),
                source,
            })
    }
}
