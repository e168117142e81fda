//! Property-based tests for snapshot transport and apply planning

use super::strategies::{entries, tree_of};
use std::path::PathBuf;
use treelink::apply::{ApplyStep, LocalRoots, SyncApplier};
use treelink::diff::diff;
use treelink::tree::snapshot;

/// Encoding then decoding keeps every node's path, kind and hash
#[test]
fn test_snapshot_transport_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&entries(), |entries| {
            let tree = tree_of(&entries);
            let decoded = snapshot::decode(&snapshot::encode(&tree).unwrap()).unwrap();

            assert_eq!(decoded.len(), tree.len());
            assert_eq!(decoded.scope(), tree.scope());
            for (a, b) in tree
                .subtree(tree.root())
                .into_iter()
                .zip(decoded.subtree(decoded.root()))
            {
                assert_eq!(tree.relative_path(a), decoded.relative_path(b));
                assert_eq!(tree.node(a).kind, decoded.node(b).kind);
                assert_eq!(tree.node(a).hash, decoded.node(b).hash);
            }
            assert!(diff(&tree, &decoded).is_empty());
            Ok(())
        })
        .unwrap();
}

/// Plans remove before they create, create parents before children and
/// fetch last
#[test]
fn test_plan_ordering_property() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let applier = SyncApplier::new(LocalRoots::install_only(PathBuf::from("/games/client")));

    runner
        .run(&(entries(), entries()), |(base, other)| {
            let result = diff(&tree_of(&base), &tree_of(&other));
            let expected_fetches = result
                .to_add
                .iter()
                .chain(&result.to_modify)
                .filter(|e| e.is_file())
                .count();

            let plan = applier.plan(result).unwrap();
            assert_eq!(plan.fetch_count(), expected_fetches);

            let phase = |step: &ApplyStep| match step {
                ApplyStep::Remove(_) => 0u8,
                ApplyStep::CreateDir(_) => 1,
                ApplyStep::Fetch { .. } => 2,
            };
            let phases: Vec<u8> = plan.steps().iter().map(phase).collect();
            assert!(phases.windows(2).all(|w| w[0] <= w[1]));

            let created: Vec<usize> = plan
                .steps()
                .iter()
                .filter_map(|step| match step {
                    ApplyStep::CreateDir(path) => Some(path.components().count()),
                    _ => None,
                })
                .collect();
            assert!(created.windows(2).all(|w| w[0] <= w[1]));
            Ok(())
        })
        .unwrap();
}
