//! Core types for snapshot comparison and transport.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a node inside a tree arena.
pub type NodeId = usize;

/// Raw 256-bit content digest.
pub type Hash = [u8; 32];

/// Identity-relevant hash of a filesystem entry.
///
/// Sentinels are distinct variants so they can never collide with a real
/// digest. Two `Unreadable` files compare equal: an unreadable file is never
/// reported as changed against another unreadable file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentHash {
    /// Digest of a readable file's bytes
    Digest(Hash),
    /// Any directory
    Folder,
    /// A file whose contents could not be read during the scan
    Unreadable,
    /// The synthetic root of a snapshot
    Head,
}

impl ContentHash {
    pub fn is_sentinel(&self) -> bool {
        !matches!(self, ContentHash::Digest(_))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentHash::Digest(bytes) => write!(f, "{}", hex::encode(bytes)),
            ContentHash::Folder => write!(f, "folder"),
            ContentHash::Unreadable => write!(f, "permission_denied"),
            ContentHash::Head => write!(f, "head"),
        }
    }
}

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    pub fn is_file(self) -> bool {
        matches!(self, NodeKind::File)
    }
}

/// Which synchronized root a tree (and every entry derived from it) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RootScope {
    /// The installation directory
    Install,
    /// The per-user configuration directory
    Config,
}

impl fmt::Display for RootScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RootScope::Install => write!(f, "install"),
            RootScope::Config => write!(f, "config"),
        }
    }
}
