//! Property-based tests for hashing and diff determinism

use super::strategies::{entries, tree_of};
use proptest::prelude::*;
use treelink::diff::diff;
use treelink::tree::hasher;

/// Same bytes always give the same digest
#[test]
fn test_content_hash_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(any::<Vec<u8>>(), any::<Vec<u8>>()),
            |(content1, content2)| {
                let hash1 = hasher::compute_content_hash(&content1);
                let hash2 = hasher::compute_content_hash(&content2);

                assert_eq!(hash1, hasher::compute_content_hash(&content1));
                if content1 == content2 {
                    assert_eq!(hash1, hash2);
                } else {
                    // Collisions are possible in theory only
                    prop_assume!(hash1 != hash2);
                }

                Ok(())
            },
        )
        .unwrap();
}

/// A tree never differs from itself
#[test]
fn test_self_diff_is_empty_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&entries(), |entries| {
            let first = tree_of(&entries);
            let second = tree_of(&entries);
            assert!(diff(&first, &second).is_empty());
            Ok(())
        })
        .unwrap();
}

/// Against an empty tree every node is added, and nothing is deleted the
/// other way round except the top-level entries
#[test]
fn test_diff_against_empty_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&entries(), |entries| {
            let tree = tree_of(&entries);
            let empty = tree_of(&Default::default());

            let added = diff(&tree, &empty);
            assert_eq!(added.to_add.len(), tree.len() - 1);
            assert!(added.to_modify.is_empty());
            assert!(added.to_delete.is_empty());

            let removed = diff(&empty, &tree);
            assert_eq!(removed.to_delete.len(), entries.len());
            assert!(removed.to_add.is_empty());
            Ok(())
        })
        .unwrap();
}

/// Whatever the reverse comparison deletes, the forward comparison adds
#[test]
fn test_reverse_deletes_are_forward_adds_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(entries(), entries()), |(a, b)| {
            let tree_a = tree_of(&a);
            let tree_b = tree_of(&b);

            let forward = diff(&tree_a, &tree_b);
            let backward = diff(&tree_b, &tree_a);

            for entry in &backward.to_delete {
                assert!(forward
                    .to_add
                    .iter()
                    .any(|added| added.relative_path == entry.relative_path));
            }
            Ok(())
        })
        .unwrap();
}
