//! Shape of snapshots built from disk

use super::test_utils::{build, install_fixture, write_fixture};
use std::fs;
use tempfile::TempDir;
use treelink::tree::builder::TreeBuilder;
use treelink::tree::walker::WalkerConfig;
use treelink::types::{ContentHash, NodeKind, RootScope};

#[test]
fn test_counts_and_root() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());

    let tree = build(temp_dir.path());
    assert_eq!(tree.file_count(), 6);
    assert_eq!(tree.directory_count(), 5);
    assert_eq!(tree.node(tree.root()).hash, ContentHash::Head);
    assert_eq!(tree.relative_path(tree.root()), "");
    assert_eq!(tree.scope(), RootScope::Install);
}

#[test]
fn test_parent_links_agree_with_children() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());

    let tree = build(temp_dir.path());
    for id in tree.subtree(tree.root()) {
        for &child in tree.children(id) {
            assert_eq!(tree.node(child).parent(), Some(id));
            assert_eq!(tree.depth(child), tree.depth(id) + 1);
        }
    }
    assert_eq!(tree.node(tree.root()).parent(), None);
}

#[test]
fn test_children_sorted_and_paths_resolve() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());

    let tree = build(temp_dir.path());
    let names: Vec<&str> = tree
        .children(tree.root())
        .iter()
        .map(|id| tree.node(*id).name.as_str())
        .collect();
    assert_eq!(names, vec!["Interior", "Mods", "Version.txt", "bye.py", "hi.txt"]);

    let deep = tree.find("Interior/deep/hihi.txt").unwrap();
    assert_eq!(tree.node(deep).kind, NodeKind::File);
    assert_eq!(tree.path(deep), tree.root_path().join("Interior").join("deep").join("hihi.txt"));

    let empty = tree.find("Interior/empty").unwrap();
    assert_eq!(tree.node(empty).hash, ContentHash::Folder);
    assert!(tree.children(empty).is_empty());
    assert!(tree.find("Interior/missing").is_none());
}

#[test]
fn test_custom_exclusions_replace_defaults() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());
    fs::create_dir(temp_dir.path().join("Saves")).unwrap();

    let config = WalkerConfig {
        exclusions: ["Mods".to_string()].into_iter().collect(),
        follow_symlinks: false,
    };
    let tree = TreeBuilder::new(temp_dir.path().to_path_buf())
        .with_walker_config(config)
        .build()
        .unwrap();

    assert!(tree.find("Mods").is_none());
    assert!(tree.find("Saves").is_some());
}

#[test]
fn test_worker_count_does_not_change_result() {
    let temp_dir = TempDir::new().unwrap();
    write_fixture(temp_dir.path(), &install_fixture());
    for i in 0..40 {
        fs::write(temp_dir.path().join(format!("Mods/Core/def_{:02}.xml", i)), i.to_string())
            .unwrap();
    }

    let single = TreeBuilder::new(temp_dir.path().to_path_buf())
        .with_workers(1)
        .build()
        .unwrap();
    let many = TreeBuilder::new(temp_dir.path().to_path_buf())
        .with_workers(8)
        .build()
        .unwrap();
    assert_eq!(super::test_utils::hash_map(&single), super::test_utils::hash_map(&many));
    assert_eq!(single.file_count(), 46);
}
