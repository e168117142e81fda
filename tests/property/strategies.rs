//! Random directory shapes, built as snapshot records

use proptest::prelude::*;
use std::collections::BTreeMap;
use treelink::tree::hasher::compute_content_hash;
use treelink::tree::node::Tree;
use treelink::tree::snapshot::{NodeRecord, SnapshotRecord};
use treelink::types::{ContentHash, NodeKind, RootScope};

#[derive(Debug, Clone)]
pub enum Shape {
    File(u8),
    Dir(BTreeMap<String, Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
    any::<u8>().prop_map(Shape::File).prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-d]{1,2}", inner, 0..4).prop_map(Shape::Dir)
    })
}

/// Top-level entries of a random tree
pub fn entries() -> impl Strategy<Value = BTreeMap<String, Shape>> {
    prop::collection::btree_map("[a-d]{1,2}", shape(), 0..5)
}

fn record(name: &str, shape: &Shape) -> NodeRecord {
    match shape {
        Shape::File(byte) => NodeRecord {
            name: name.to_string(),
            kind: NodeKind::File,
            hash: ContentHash::Digest(compute_content_hash(&[*byte])),
            children: Vec::new(),
        },
        Shape::Dir(children) => NodeRecord {
            name: name.to_string(),
            kind: NodeKind::Directory,
            hash: ContentHash::Folder,
            children: children.iter().map(|(n, s)| record(n, s)).collect(),
        },
    }
}

pub fn tree_of(entries: &BTreeMap<String, Shape>) -> Tree {
    SnapshotRecord {
        scope: RootScope::Install,
        root: NodeRecord {
            name: "/srv/install".to_string(),
            kind: NodeKind::Directory,
            hash: ContentHash::Head,
            children: entries.iter().map(|(n, s)| record(n, s)).collect(),
        },
    }
    .into_tree()
    .unwrap()
}
