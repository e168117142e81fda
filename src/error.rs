//! Error types for snapshot building, transport and applying changes.

use crate::types::RootScope;
use std::path::PathBuf;
use thiserror::Error;

/// Snapshot-related errors
///
/// A single unreadable file never produces one of these; it is recorded in the
/// tree as an unreadable hash instead.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("Invalid scan root {path:?}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Snapshot serialization failed: {0}")]
    Serialization(String),

    #[error("Tree I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Wire protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Could not connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection closed after {received} of {expected} bytes")]
    ConnectionClosed { expected: u64, received: u64 },

    #[error("Unknown command byte 0x{0:02x}")]
    UnknownCommand(u8),

    #[error("Frame of {len} bytes exceeds limit of {max} bytes")]
    FrameTooLarge { len: u64, max: u64 },

    #[error("Invalid requested path: {0}")]
    InvalidPath(String),

    #[error("No {0} snapshot is available on this host")]
    ScopeUnavailable(RootScope),

    #[error("Payload serialization failed: {0}")]
    Serialization(String),

    #[error("Snapshot error: {0}")]
    Tree(#[from] TreeError),

    #[error("Protocol I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors raised while applying a diff to the local filesystem
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("Failed to {op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Refusing to apply entry outside its root: {0}")]
    InvalidPath(String),

    #[error("No local {0} root configured")]
    MissingRoot(RootScope),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] ProtocolError),
}

/// Top-level errors for sync sessions and the CLI
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Snapshot error: {0}")]
    TreeError(#[from] TreeError),

    #[error("Protocol error: {0}")]
    ProtocolError(#[from] ProtocolError),

    #[error("Apply error: {0}")]
    ApplyError(#[from] ApplyError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::TaskFailed(err.to_string())
    }
}
