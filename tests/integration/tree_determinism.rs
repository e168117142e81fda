//! Snapshots are a pure function of the directory contents

use super::test_utils::{build, hash_map, install_fixture, write_fixture};
use std::fs;
use tempfile::TempDir;
use treelink::diff::diff;
use treelink::tree::snapshot;

#[test]
fn test_repeated_builds_identical() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());

    let first = build(temp_dir.path());
    for _ in 0..5 {
        let again = build(temp_dir.path());
        assert_eq!(hash_map(&first), hash_map(&again));
        assert!(diff(&first, &again).is_empty());
    }
}

#[test]
fn test_same_content_in_different_locations() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    write_fixture(a.path(), &install_fixture());
    write_fixture(b.path(), &install_fixture());

    let first = snapshot::encode(&build(a.path())).unwrap();
    let second = snapshot::encode(&build(b.path())).unwrap();
    assert_eq!(
        hash_map(&snapshot::decode(&first).unwrap()),
        hash_map(&snapshot::decode(&second).unwrap())
    );
}

#[test]
fn test_content_change_only_moves_that_file() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());
    let before = hash_map(&build(temp_dir.path()));

    fs::write(temp_dir.path().join("Interior/hihi.txt"), "HIHI").unwrap();
    let after = hash_map(&build(temp_dir.path()));

    let changed: Vec<&String> = before
        .keys()
        .filter(|path| before[*path] != after[*path])
        .collect();
    assert_eq!(changed, vec!["Interior/hihi.txt"]);
    // Directories carry the folder sentinel, not a digest of their contents
    assert_eq!(after["Interior"], "folder");
}
