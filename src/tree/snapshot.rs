//! Snapshot encoding for transport
//!
//! A tree travels as nested records (name, kind, hash, children). Parent links
//! are not sent; they are rebuilt when the records are loaded back into an
//! arena. Everything received from a peer is validated before use.

use crate::error::TreeError;
use crate::tree::node::{NodeArena, Tree, ROOT};
use crate::tree::path;
use crate::types::{ContentHash, NodeId, NodeKind, RootScope};
use bincode;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Serialized form of one node and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub kind: NodeKind,
    pub hash: ContentHash,
    pub children: Vec<NodeRecord>,
}

/// Serialized form of a whole tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub scope: RootScope,
    pub root: NodeRecord,
}

impl SnapshotRecord {
    pub fn from_tree(tree: &Tree) -> Self {
        Self {
            scope: tree.scope(),
            root: record_for(tree, tree.root()),
        }
    }

    /// Rebuild an arena tree, restoring parent links and checking structure
    pub fn into_tree(self) -> Result<Tree, TreeError> {
        if self.root.hash != ContentHash::Head || self.root.kind != NodeKind::Directory {
            return Err(TreeError::InvalidSnapshot(
                "root must be a directory with the head hash".to_string(),
            ));
        }

        let root_path = PathBuf::from(&self.root.name);
        let mut arena = NodeArena::with_root(self.root.name);
        let mut pending: Vec<(NodeId, Vec<NodeRecord>)> = vec![(ROOT, self.root.children)];

        while let Some((parent, children)) = pending.pop() {
            let mut seen = HashSet::with_capacity(children.len());
            for child in children {
                validate_record(&child)?;
                if !seen.insert(child.name.clone()) {
                    return Err(TreeError::InvalidSnapshot(format!(
                        "duplicate entry name {:?}",
                        child.name
                    )));
                }
                let id = arena.insert_child(parent, child.name, child.kind, child.hash);
                if !child.children.is_empty() {
                    pending.push((id, child.children));
                }
            }
        }

        Ok(arena.into_tree(root_path, self.scope))
    }
}

fn record_for(tree: &Tree, id: NodeId) -> NodeRecord {
    let node = tree.node(id);
    NodeRecord {
        name: node.name.clone(),
        kind: node.kind,
        hash: node.hash,
        children: node
            .children()
            .iter()
            .map(|child| record_for(tree, *child))
            .collect(),
    }
}

fn validate_record(record: &NodeRecord) -> Result<(), TreeError> {
    if !path::is_valid_segment(&record.name) {
        return Err(TreeError::InvalidSnapshot(format!(
            "invalid entry name {:?}",
            record.name
        )));
    }
    let consistent = match record.kind {
        NodeKind::File => {
            record.children.is_empty()
                && matches!(record.hash, ContentHash::Digest(_) | ContentHash::Unreadable)
        }
        NodeKind::Directory => record.hash == ContentHash::Folder,
    };
    if !consistent {
        return Err(TreeError::InvalidSnapshot(format!(
            "entry {:?} has inconsistent kind and hash",
            record.name
        )));
    }
    Ok(())
}

/// Serialize a tree to bytes
pub fn encode(tree: &Tree) -> Result<Vec<u8>, TreeError> {
    bincode::serialize(&SnapshotRecord::from_tree(tree))
        .map_err(|e| TreeError::Serialization(format!("Failed to serialize snapshot: {}", e)))
}

/// Deserialize and validate a tree
pub fn decode(bytes: &[u8]) -> Result<Tree, TreeError> {
    let record: SnapshotRecord = bincode::deserialize(bytes)
        .map_err(|e| TreeError::Serialization(format!("Failed to deserialize snapshot: {}", e)))?;
    record.into_tree()
}
