//! Change sets: one branch split into per-directory change lists.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::classify::{Placement, normalize_path, resolve_bucket};
use super::policy::SplittingPolicy;

/// Namespace prefix for every generated branch.
pub const BRANCH_NAMESPACE: &str = "treesplit";

/// Branch component used for the repository's top-level bucket.
const ROOT_COMPONENT: &str = "root";

/// One bucket of a split: a base directory and the changed paths under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeList {
    base_directory: String,
    affected_paths: Vec<String>,
    extra_description: String,
}

impl ChangeList {
    pub fn new(base_directory: impl Into<String>, extra_description: impl Into<String>) -> Self {
        Self {
            base_directory: base_directory.into(),
            affected_paths: Vec::new(),
            extra_description: extra_description.into(),
        }
    }

    /// Build a change list with paths already attached.
    pub fn with_paths<I, S>(
        base_directory: impl Into<String>,
        paths: I,
        extra_description: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new(base_directory, extra_description);
        for path in paths {
            let path = path.into();
            if !list.affected_paths.contains(&path) {
                list.add_path(path);
            }
        }
        list
    }

    pub fn base_directory(&self) -> &str {
        &self.base_directory
    }

    /// Paths in the order they were classified.
    pub fn affected_paths(&self) -> &[String] {
        &self.affected_paths
    }

    pub fn extra_description(&self) -> &str {
        &self.extra_description
    }

    pub fn file_count(&self) -> usize {
        self.affected_paths.len()
    }

    /// Append a path. Callers are responsible for deduplication.
    pub(crate) fn add_path(&mut self, path: impl Into<String>) {
        self.affected_paths.push(path.into());
    }

    /// Name of the branch this change list is committed to.
    ///
    /// `treesplit/<root>/<base directory with "/" replaced by "-">`.
    pub fn branch_name(&self, root_branch: &str) -> String {
        let normalized = match self.base_directory.as_str() {
            "." | "/" => ROOT_COMPONENT.to_string(),
            base => {
                let replaced = base.replace('/', "-");
                let trimmed = replaced.trim_matches('-');
                if trimmed.is_empty() {
                    ROOT_COMPONENT.to_string()
                } else {
                    trimmed.to_string()
                }
            }
        };
        format!("{BRANCH_NAMESPACE}/{root_branch}/{normalized}")
    }
}

impl fmt::Display for ChangeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<ChangeList {}: {} files>",
            self.base_directory,
            self.affected_paths.len()
        )
    }
}

/// Buckets whose base directories normalize to the same branch name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchCollision {
    pub branch: String,
    pub base_directories: Vec<String>,
}

/// The result of splitting one branch into several change lists.
///
/// Buckets are kept in creation order so output is reproducible.
#[derive(Debug)]
pub struct ChangeSet {
    branch_name: String,
    policy: SplittingPolicy,
    repo_root: PathBuf,
    lists: Vec<ChangeList>,
    by_base: HashMap<String, usize>,
    assigned: HashMap<String, usize>,
}

impl ChangeSet {
    pub fn new(
        branch_name: impl Into<String>,
        policy: SplittingPolicy,
        repo_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            branch_name: branch_name.into(),
            policy,
            repo_root: repo_root.into(),
            lists: Vec::new(),
            by_base: HashMap::new(),
            assigned: HashMap::new(),
        }
    }

    /// Build a change set from a list of paths.
    pub fn from_paths<I, S>(
        branch_name: impl Into<String>,
        policy: SplittingPolicy,
        repo_root: impl Into<PathBuf>,
        paths: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut change_set = Self::new(branch_name, policy, repo_root);
        for path in paths {
            change_set.add_file(path.as_ref());
        }
        change_set
    }

    /// The branch being split.
    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn policy(&self) -> &SplittingPolicy {
        &self.policy
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Classify `file_path` into a bucket and return that bucket.
    ///
    /// Blank paths are ignored and return `None`. A path that was already
    /// classified returns its existing bucket without being added again.
    pub fn add_file(&mut self, file_path: &str) -> Option<&ChangeList> {
        if file_path.trim().is_empty() {
            return None;
        }
        let path = normalize_path(file_path);

        if let Some(&idx) = self.assigned.get(&path) {
            debug!("{} already assigned to {}", path, self.lists[idx].base_directory);
            return Some(&self.lists[idx]);
        }

        let placement = resolve_bucket(self, &self.policy, &self.repo_root, &path);
        let idx = match placement {
            Placement::Existing(base) => self.by_base[&base],
            Placement::New { base, extra } => {
                debug!("New bucket {} for {}", base, path);
                self.lists.push(ChangeList::new(base.clone(), extra));
                let idx = self.lists.len() - 1;
                self.by_base.insert(base, idx);
                idx
            }
        };

        self.lists[idx].add_path(path.clone());
        self.assigned.insert(path, idx);
        Some(&self.lists[idx])
    }

    pub fn contains_bucket(&self, base_directory: &str) -> bool {
        self.by_base.contains_key(base_directory)
    }

    pub fn get(&self, base_directory: &str) -> Option<&ChangeList> {
        self.by_base.get(base_directory).map(|&idx| &self.lists[idx])
    }

    /// Change lists in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &ChangeList> {
        self.lists.iter()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Total number of classified paths across all buckets.
    pub fn file_count(&self) -> usize {
        self.assigned.len()
    }

    /// Groups of buckets that would be committed to the same branch.
    pub fn branch_collisions(&self) -> Vec<BranchCollision> {
        let mut groups: Vec<BranchCollision> = Vec::new();
        let mut by_branch: HashMap<String, usize> = HashMap::new();

        for list in &self.lists {
            let branch = list.branch_name(&self.branch_name);
            match by_branch.get(&branch) {
                Some(&idx) => groups[idx]
                    .base_directories
                    .push(list.base_directory.clone()),
                None => {
                    by_branch.insert(branch.clone(), groups.len());
                    groups.push(BranchCollision {
                        branch,
                        base_directories: vec![list.base_directory.clone()],
                    });
                }
            }
        }

        groups.retain(|g| g.base_directories.len() > 1);
        groups
    }
}

impl<'a> IntoIterator for &'a ChangeSet {
    type Item = &'a ChangeList;
    type IntoIter = std::slice::Iter<'a, ChangeList>;

    fn into_iter(self) -> Self::IntoIter {
        self.lists.iter()
    }
}
