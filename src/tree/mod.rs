//! Filesystem snapshots
//!
//! Represents a directory as a tree of content-hashed nodes that can be built
//! concurrently, compared, and shipped to a peer.

pub mod builder;
pub mod hasher;
pub mod node;
pub mod path;
pub mod queue;
pub mod snapshot;
pub mod walker;
