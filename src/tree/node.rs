//! Snapshot node types and the tree arena

use crate::tree::path;
use crate::types::{ContentHash, NodeId, NodeKind, RootScope};
use std::path::{Path, PathBuf};

/// One filesystem entry in a snapshot
///
/// Children are owned by the arena; `parent` is a plain index back-reference,
/// set once when the node is inserted.
#[derive(Debug, Clone)]
pub struct HashNode {
    pub name: String,
    pub kind: NodeKind,
    pub hash: ContentHash,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl HashNode {
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Complete snapshot of one directory tree
///
/// Immutable once built: there is no API to add or remove nodes, so a tree can
/// be shared across threads without locking.
#[derive(Debug, Clone)]
pub struct Tree {
    root_path: PathBuf,
    scope: RootScope,
    nodes: Vec<HashNode>,
}

/// Root node id in every tree
pub const ROOT: NodeId = 0;

impl Tree {
    /// Location the root contributes to absolute paths
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn scope(&self) -> RootScope {
        self.scope
    }

    pub fn root(&self) -> NodeId {
        ROOT
    }

    pub fn node(&self, id: NodeId) -> &HashNode {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    /// Path relative to the root, segments joined with `/`. The root itself
    /// maps to the empty string.
    pub fn relative_path(&self, id: NodeId) -> String {
        path::join_segments(&self.segments(id))
    }

    /// Absolute location of a node on the machine that built the tree
    pub fn path(&self, id: NodeId) -> PathBuf {
        let mut out = self.root_path.clone();
        for segment in self.segments(id) {
            out.push(segment);
        }
        out
    }

    /// Number of segments between the root and the node (root = 0)
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[id].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent].parent;
        }
        depth
    }

    /// The node and all its descendants, node before descendants
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current].children.iter().rev().copied());
        }
        out
    }

    /// Look up a node by its relative path
    pub fn find(&self, relative_path: &str) -> Option<NodeId> {
        let mut current = ROOT;
        for segment in path::split_segments(relative_path) {
            current = *self.nodes[current]
                .children
                .iter()
                .find(|child| self.nodes[**child].name == segment)?;
        }
        Some(current)
    }

    pub fn file_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_file()).count()
    }

    pub fn directory_count(&self) -> usize {
        // Root is synthetic and not counted
        self.nodes.iter().filter(|n| !n.is_file()).count() - 1
    }

    fn segments(&self, id: NodeId) -> Vec<&str> {
        let mut segments = Vec::new();
        let mut current = id;
        while let Some(parent) = self.nodes[current].parent {
            segments.push(self.nodes[current].name.as_str());
            current = parent;
        }
        segments.reverse();
        segments
    }
}

/// Append-only node storage used while a tree is being built or decoded
#[derive(Debug)]
pub(crate) struct NodeArena {
    nodes: Vec<HashNode>,
}

impl NodeArena {
    pub(crate) fn with_root(name: String) -> Self {
        Self {
            nodes: vec![HashNode {
                name,
                kind: NodeKind::Directory,
                hash: ContentHash::Head,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Insert a child under `parent` and return its id
    pub(crate) fn insert_child(
        &mut self,
        parent: NodeId,
        name: String,
        kind: NodeKind,
        hash: ContentHash,
    ) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(HashNode {
            name,
            kind,
            hash,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Freeze the arena into a tree. Siblings are sorted by name so that
    /// traversal order does not depend on worker scheduling.
    pub(crate) fn into_tree(mut self, root_path: PathBuf, scope: RootScope) -> Tree {
        let names: Vec<String> = self.nodes.iter().map(|n| n.name.clone()).collect();
        for node in &mut self.nodes {
            node.children.sort_by(|a, b| names[*a].cmp(&names[*b]));
        }
        Tree {
            root_path,
            scope,
            nodes: self.nodes,
        }
    }
}
