//! Integration tests for change set classification.
//!
//! Marker-file tests lay out real directory trees in a temp directory.

mod common;

use common::{temp_test_dir, write_file};
use treesplit::{ChangeSet, SplittingPolicy};

fn by_directory(max_depth: usize) -> SplittingPolicy {
    SplittingPolicy::Directory { max_depth }
}

fn by_marker(max_depth: usize) -> SplittingPolicy {
    SplittingPolicy::MarkerFile {
        marker_name: "OWNERS".to_string(),
        max_depth,
    }
}

fn bases(set: &ChangeSet) -> Vec<&str> {
    set.iter().map(|l| l.base_directory()).collect()
}

#[test]
fn test_directory_split_unlimited_depth() {
    let set = ChangeSet::from_paths(
        "big",
        by_directory(0),
        ".",
        ["a/b/x.cc", "a/b/y.cc", "a/c/z.cc"],
    );

    assert_eq!(bases(&set), ["a/b", "a/c"]);
    assert_eq!(set.get("a/b").unwrap().affected_paths(), ["a/b/x.cc", "a/b/y.cc"]);
    assert_eq!(set.get("a/c").unwrap().file_count(), 1);
    assert!(set.iter().all(|l| l.extra_description().is_empty()));
}

#[test]
fn test_directory_split_truncates_to_depth() {
    let paths = [
        "chrome/browser/ui/views/a.cc",
        "chrome/browser/net/b.cc",
        "chrome/common/c.cc",
        "base/d.cc",
        "README.md",
    ];

    let set = ChangeSet::from_paths("big", by_directory(2), ".", paths);
    assert_eq!(bases(&set), ["chrome/browser", "chrome/common", "base", "."]);
    assert_eq!(set.get("chrome/browser").unwrap().file_count(), 2);

    let set = ChangeSet::from_paths("big", by_directory(1), ".", paths);
    assert_eq!(bases(&set), ["chrome", "base", "."]);
    assert_eq!(set.get("chrome").unwrap().file_count(), 3);
}

#[test]
fn test_directory_bucket_key_is_prefix_of_directory() {
    let paths = ["a/b/c/d/e.txt", "a/f.txt", "x/y/z.txt"];
    for depth in 0..6 {
        let set = ChangeSet::from_paths("big", by_directory(depth), ".", paths);
        for list in set.iter() {
            for path in list.affected_paths() {
                let dir = path.rsplit_once('/').map(|(d, _)| d).unwrap_or(".");
                let segments: Vec<&str> = dir.split('/').collect();
                let keep = if depth == 0 { segments.len() } else { depth.min(segments.len()) };
                assert_eq!(list.base_directory(), segments[..keep].join("/"));
            }
        }
    }
}

#[test]
fn test_marker_split_uses_nearest_owners() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\nbob@example.com\n");

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/b/x.cc"]);

    assert_eq!(bases(&set), ["a"]);
    let list = set.get("a").unwrap();
    assert_eq!(list.affected_paths(), ["a/b/x.cc"]);
    assert_eq!(
        list.extra_description(),
        "===== Contents of a/OWNERS =====\nalice@example.com\nbob@example.com\n"
    );
}

#[test]
fn test_marker_contents_without_trailing_newline_are_kept() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\nlast line");

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/x.cc"]);
    assert!(set.get("a").unwrap().extra_description().ends_with("last line"));
}

#[test]
fn test_marker_siblings_converge_regardless_of_order() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\n");

    let forward = ChangeSet::from_paths(
        "big",
        by_marker(0),
        root.path(),
        ["a/b/x.cc", "a/b/y.cc", "a/c/z.cc"],
    );
    let backward = ChangeSet::from_paths(
        "big",
        by_marker(0),
        root.path(),
        ["a/c/z.cc", "a/b/y.cc", "a/b/x.cc"],
    );

    assert_eq!(bases(&forward), ["a"]);
    assert_eq!(bases(&backward), ["a"]);
    assert_eq!(forward.get("a").unwrap().file_count(), 3);
    assert_eq!(
        backward.get("a").unwrap().affected_paths(),
        ["a/c/z.cc", "a/b/y.cc", "a/b/x.cc"]
    );
}

#[test]
fn test_marker_nested_owners_split_separately() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "top\n");
    write_file(root.path(), "a/b/OWNERS", "nested\n");

    let set = ChangeSet::from_paths(
        "big",
        by_marker(0),
        root.path(),
        ["a/b/c/x.cc", "a/y.cc", "a/d/z.cc"],
    );

    assert_eq!(bases(&set), ["a/b", "a"]);
    assert!(set.get("a/b").unwrap().extra_description().contains("nested"));
    assert_eq!(set.get("a").unwrap().affected_paths(), ["a/y.cc", "a/d/z.cc"]);
}

#[test]
fn test_marker_missing_everywhere_falls_back_to_root() {
    let root = temp_test_dir();

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/b/x.cc", "c/y.cc"]);

    assert_eq!(bases(&set), ["."]);
    let list = set.get(".").unwrap();
    assert_eq!(list.file_count(), 2);
    assert!(list.extra_description().is_empty());
}

#[test]
fn test_marker_at_repository_root() {
    let root = temp_test_dir();
    write_file(root.path(), "OWNERS", "root-owner\n");

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/b/x.cc", "y.cc"]);

    assert_eq!(bases(&set), ["."]);
    assert!(
        set.get(".")
            .unwrap()
            .extra_description()
            .starts_with("===== Contents of OWNERS =====\n")
    );
}

#[test]
fn test_marker_depth_limit_stops_search() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\n");

    // "a/b/c" has two separators, which exceeds max_depth - 1 = 1.
    let set = ChangeSet::from_paths("big", by_marker(2), root.path(), ["a/b/c/x.cc"]);

    assert_eq!(bases(&set), ["a/b/c"]);
    assert!(set.get("a/b/c").unwrap().extra_description().is_empty());
}

#[test]
fn test_marker_depth_limit_allows_shallow_search() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\n");

    let set = ChangeSet::from_paths("big", by_marker(2), root.path(), ["a/b/x.cc"]);

    assert_eq!(bases(&set), ["a"]);
}

#[test]
fn test_marker_directory_named_like_marker_is_ignored() {
    let root = temp_test_dir();
    std::fs::create_dir_all(root.path().join("a/b/OWNERS")).unwrap();
    write_file(root.path(), "a/OWNERS", "alice@example.com\n");

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/b/x.cc"]);
    assert_eq!(bases(&set), ["a"]);
}

#[test]
fn test_duplicate_paths_are_assigned_once() {
    let root = temp_test_dir();
    write_file(root.path(), "a/OWNERS", "alice@example.com\n");

    let set = ChangeSet::from_paths(
        "big",
        by_marker(0),
        root.path(),
        ["a/b/x.cc", "a/b/x.cc", "a/b/y.cc", "a/b/x.cc"],
    );

    assert_eq!(set.file_count(), 2);
    assert_eq!(set.get("a").unwrap().affected_paths(), ["a/b/x.cc", "a/b/y.cc"]);
}

#[test]
fn test_add_file_returns_bucket() {
    let mut set = ChangeSet::new("big", by_directory(0), ".");

    let first = set.add_file("a/b/x.cc").unwrap().base_directory().to_string();
    let second = set.add_file("a/b/y.cc").unwrap();

    assert_eq!(first, "a/b");
    assert_eq!(second.base_directory(), "a/b");
    assert_eq!(second.file_count(), 2);
    assert_eq!(set.branch_name(), "big");
}

#[test]
fn test_marker_with_invalid_utf8_still_claims_directory() {
    let root = temp_test_dir();
    std::fs::create_dir_all(root.path().join("a")).unwrap();
    std::fs::write(root.path().join("a/OWNERS"), b"caf\xe9@example.com\n").unwrap();

    let set = ChangeSet::from_paths("big", by_marker(0), root.path(), ["a/b/x.cc"]);

    assert_eq!(bases(&set), ["a"]);
    assert_eq!(
        set.get("a").unwrap().extra_description(),
        "===== Contents of a/OWNERS =====\ncaf\u{FFFD}@example.com\n"
    );
}
