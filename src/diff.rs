//! Tree comparison
//!
//! Reduces two snapshots of the same logical root to the changes that make
//! `other` look like `base`. Nodes are matched purely by relative path at each
//! level; there is no rename detection, so a moved entry shows up as one
//! delete plus one add of its whole subtree.

use crate::error::ProtocolError;
use crate::tree::node::Tree;
use crate::tree::path;
use crate::types::{ContentHash, NodeId, NodeKind, RootScope};
use bincode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Owned copy of the node a change refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub scope: RootScope,
    pub relative_path: String,
    pub kind: NodeKind,
    pub hash: ContentHash,
}

impl DiffEntry {
    fn from_node(tree: &Tree, id: NodeId, scope: RootScope) -> Self {
        let node = tree.node(id);
        Self {
            scope,
            relative_path: tree.relative_path(id),
            kind: node.kind,
            hash: node.hash,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn depth(&self) -> usize {
        path::depth(&self.relative_path)
    }
}

/// Changes between two snapshots
///
/// `to_add` and `to_modify` hold nodes of the base tree (their content is what
/// must be fetched); `to_delete` holds nodes of the other tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffResult {
    pub to_add: Vec<DiffEntry>,
    pub to_modify: Vec<DiffEntry>,
    pub to_delete: Vec<DiffEntry>,
}

impl DiffResult {
    /// Append another result's sets to this one's
    pub fn merge(&mut self, other: DiffResult) {
        self.to_add.extend(other.to_add);
        self.to_modify.extend(other.to_modify);
        self.to_delete.extend(other.to_delete);
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all three sets
    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_modify.len() + self.to_delete.len()
    }

    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(self)
            .map_err(|e| ProtocolError::Serialization(format!("Failed to serialize diff: {}", e)))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        bincode::deserialize(bytes)
            .map_err(|e| ProtocolError::Serialization(format!("Failed to deserialize diff: {}", e)))
    }
}

/// Compare two trees from their roots.
///
/// The base tree is authoritative. Entries carry the base tree's scope.
pub fn diff(base: &Tree, other: &Tree) -> DiffResult {
    let mut result = DiffResult::default();
    diff_level(base, base.root(), other, other.root(), &mut result);
    result
}

fn diff_level(
    base: &Tree,
    base_id: NodeId,
    other: &Tree,
    other_id: NodeId,
    result: &mut DiffResult,
) {
    let scope = base.scope();

    let mut unmatched: HashMap<String, NodeId> = other
        .children(other_id)
        .iter()
        .map(|child| (other.relative_path(*child), *child))
        .collect();

    for &child in base.children(base_id) {
        let relative_path = base.relative_path(child);
        match unmatched.remove(&relative_path) {
            Some(other_child) => {
                // Directories always match (folder == folder); only files
                // can land in to_modify
                if base.node(child).hash != other.node(other_child).hash {
                    result
                        .to_modify
                        .push(DiffEntry::from_node(base, child, scope));
                }
                if !base.children(child).is_empty() {
                    diff_level(base, child, other, other_child, result);
                }
            }
            None => {
                result.to_add.extend(
                    base.subtree(child)
                        .into_iter()
                        .map(|id| DiffEntry::from_node(base, id, scope)),
                );
            }
        }
    }

    // Walk other's children in order so the delete set is deterministic
    for &child in other.children(other_id) {
        if unmatched.contains_key(&other.relative_path(child)) {
            result
                .to_delete
                .push(DiffEntry::from_node(other, child, scope));
        }
    }
}
