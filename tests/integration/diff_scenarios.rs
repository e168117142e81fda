//! Diff scenarios on real directory trees

use super::test_utils::{build, install_fixture, paths, without, write_fixture};
use std::fs;
use tempfile::TempDir;
use treelink::diff::diff;
use treelink::types::NodeKind;

fn pair() -> (TempDir, TempDir) {
    let base = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();
    write_fixture(base.path(), &install_fixture());
    (base, other)
}

#[test]
fn test_identical_trees_produce_empty_diff() {
    let (base, other) = pair();
    write_fixture(other.path(), &install_fixture());

    let result = diff(&build(base.path()), &build(other.path()));
    assert!(result.is_empty());
}

#[test]
fn test_missing_top_level_file_added() {
    let (base, other) = pair();
    write_fixture(other.path(), &without(&install_fixture(), "bye.py"));

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(paths(&result.to_add), vec!["bye.py"]);
    assert!(result.to_modify.is_empty());
    assert!(result.to_delete.is_empty());
}

#[test]
fn test_missing_nested_file_added_without_ancestors() {
    let (base, other) = pair();
    write_fixture(
        other.path(),
        &without(&install_fixture(), "Interior/deep/hihi.txt"),
    );

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(paths(&result.to_add), vec!["Interior/deep/hihi.txt"]);
    assert!(result.to_modify.is_empty());
    assert!(result.to_delete.is_empty());
}

#[test]
fn test_missing_subtree_added_in_preorder() {
    let (base, other) = pair();
    write_fixture(other.path(), &without(&install_fixture(), "Interior"));

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(
        paths(&result.to_add),
        vec![
            "Interior",
            "Interior/deep",
            "Interior/deep/hihi.txt",
            "Interior/empty",
            "Interior/hihi.txt",
        ]
    );
    assert_eq!(result.to_add[0].kind, NodeKind::Directory);
    assert!(result.to_delete.is_empty());
}

#[test]
fn test_extra_file_deleted() {
    let (base, other) = pair();
    write_fixture(other.path(), &install_fixture());
    fs::write(other.path().join("goodbye.txt"), "extra").unwrap();

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(paths(&result.to_delete), vec!["goodbye.txt"]);
    assert!(result.to_add.is_empty());
    assert!(result.to_modify.is_empty());
}

#[test]
fn test_changed_leaf_only_modified() {
    let (base, other) = pair();
    write_fixture(other.path(), &install_fixture());
    fs::write(other.path().join("Mods/Core/About.xml"), "<ModMetaData>v2</ModMetaData>").unwrap();

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(paths(&result.to_modify), vec!["Mods/Core/About.xml"]);
    assert!(result.to_add.is_empty());
    assert!(result.to_delete.is_empty());
}

#[test]
fn test_rename_is_delete_plus_add() {
    let (base, other) = pair();
    write_fixture(other.path(), &without(&install_fixture(), "Mods"));
    write_fixture(
        other.path(),
        &[
            ("Mods-old", None),
            ("Mods-old/Core", None),
            ("Mods-old/Core/About.xml", Some("<ModMetaData/>")),
        ],
    );

    let result = diff(&build(base.path()), &build(other.path()));
    assert_eq!(paths(&result.to_add), vec!["Mods", "Mods/Core", "Mods/Core/About.xml"]);
    assert_eq!(paths(&result.to_delete), vec!["Mods-old"]);
}

#[test]
fn test_excluded_entries_never_reported() {
    let (base, other) = pair();
    write_fixture(other.path(), &install_fixture());
    write_fixture(
        other.path(),
        &[
            ("Saves", None),
            ("Saves/colony.rws", Some("save")),
            ("Player.log", Some("log")),
        ],
    );

    let result = diff(&build(base.path()), &build(other.path()));
    assert!(result.is_empty());
}
