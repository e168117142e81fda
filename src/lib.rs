//! treelink: host-authoritative directory synchronization
//!
//! A host snapshots its installation directory (and optionally a per-user
//! configuration directory) into content-hashed trees. Clients send their own
//! snapshots, receive the add/modify/delete set that would make them match,
//! and fetch exactly the files that differ.

pub mod apply;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod session;
pub mod tree;
pub mod types;
