//! Path classification: decide which bucket a changed path belongs to.
//!
//! Paths are git paths (always `/`-separated, relative to the repository
//! root). The top-level directory is represented as `.`.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::description::banner;

use super::changeset::ChangeSet;
use super::policy::SplittingPolicy;

/// Where a path should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Attach to the bucket already registered under this key.
    Existing(String),
    /// Register a new bucket.
    New { base: String, extra: String },
}

impl Placement {
    pub fn base(&self) -> &str {
        match self {
            Placement::Existing(base) => base,
            Placement::New { base, .. } => base,
        }
    }
}

/// Resolve the bucket for `file_path` without mutating the change set.
///
/// Marker files are read relative to `repo_root`.
pub fn resolve_bucket(
    change_set: &ChangeSet,
    policy: &SplittingPolicy,
    repo_root: &Path,
    file_path: &str,
) -> Placement {
    match policy {
        SplittingPolicy::Directory { max_depth } => {
            let base = truncate_depth(&parent_dir(file_path), *max_depth);
            if change_set.contains_bucket(&base) {
                Placement::Existing(base)
            } else {
                Placement::New {
                    base,
                    extra: String::new(),
                }
            }
        }
        SplittingPolicy::MarkerFile {
            marker_name,
            max_depth,
        } => find_marker_bucket(change_set, repo_root, marker_name, *max_depth, file_path),
    }
}

/// Walk upward from the file's directory looking for an existing bucket or a
/// directory that contains `marker_name`.
fn find_marker_bucket(
    change_set: &ChangeSet,
    repo_root: &Path,
    marker_name: &str,
    max_depth: usize,
    file_path: &str,
) -> Placement {
    let mut candidate = parent_dir(file_path);

    loop {
        if change_set.contains_bucket(&candidate) {
            return Placement::Existing(candidate);
        }

        let marker_path = join_path(&candidate, marker_name);
        match fs::read(repo_root.join(&marker_path)) {
            Ok(contents) => {
                let mut extra = banner(&format!("Contents of {marker_path}"));
                extra.push_str(&String::from_utf8_lossy(&contents));
                return Placement::New {
                    base: candidate,
                    extra,
                };
            }
            // Absent and unreadable markers are the same thing here.
            Err(e) => debug!("No marker at {}: {}", marker_path, e),
        }

        if max_depth > 0 && separator_count(&candidate) > max_depth - 1 {
            debug!(
                "Depth limit {} reached at {}; using it as the bucket for {}",
                max_depth, candidate, file_path
            );
            return Placement::New {
                base: candidate,
                extra: String::new(),
            };
        }

        let parent = parent_dir(&candidate);
        if parent == candidate {
            return Placement::New {
                base: candidate,
                extra: String::new(),
            };
        }
        candidate = parent;
    }
}

/// Normalize a git path: trim whitespace, drop leading `./`, collapse
/// repeated separators and strip trailing separators.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let absolute = trimmed.starts_with('/');

    let segments: Vec<&str> = trimmed
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    match (absolute, segments.is_empty()) {
        (true, true) => "/".to_string(),
        (true, false) => format!("/{}", segments.join("/")),
        (false, true) => ".".to_string(),
        (false, false) => segments.join("/"),
    }
}

/// Directory component of a normalized path.
///
/// `parent_dir(".") == "."` and `parent_dir("/") == "/"`, so repeated
/// application always reaches a fixed point.
pub fn parent_dir(path: &str) -> String {
    if path == "." || path == "/" {
        return path.to_string();
    }

    match path.rfind('/') {
        None => ".".to_string(),
        Some(0) => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    }
}

/// Keep the first `max_depth` segments of `dir` (0 keeps everything).
pub fn truncate_depth(dir: &str, max_depth: usize) -> String {
    if max_depth == 0 || dir == "." || dir == "/" {
        return dir.to_string();
    }

    let absolute = dir.starts_with('/');
    let kept: Vec<&str> = dir
        .split('/')
        .filter(|s| !s.is_empty())
        .take(max_depth)
        .collect();

    if absolute {
        format!("/{}", kept.join("/"))
    } else {
        kept.join("/")
    }
}

/// Join a directory and a file name, treating `.` as the repository root.
pub fn join_path(dir: &str, name: &str) -> String {
    match dir {
        "." => name.to_string(),
        "/" => format!("/{name}"),
        _ => format!("{dir}/{name}"),
    }
}

fn separator_count(dir: &str) -> usize {
    dir.matches('/').count()
}
