//! Splitting one large change into per-directory change lists.

pub mod changeset;
pub mod classify;
pub mod executor;
pub mod policy;

pub use changeset::{BRANCH_NAMESPACE, BranchCollision, ChangeList, ChangeSet};
pub use classify::{Placement, resolve_bucket};
pub use executor::{BucketOutcome, BucketStatus, SplitExecutor, Stage};
pub use policy::{SplittingPolicy, Strategy};
