//! Directory listing with the configurable exclusion set

use crate::error::TreeError;
use crate::types::NodeKind;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Names skipped during every scan unless configured otherwise
pub const DEFAULT_EXCLUSIONS: &[&str] = &[
    "__pycache__",
    ".git",
    ".gitignore",
    "Saves",
    "Scenarios",
    "MpReplays",
    "MpDesyncs",
    "Player.log",
    "Player-prev.log",
    "MonoBleedingEdge",
    "treelink",
    "treelink.exe",
];

/// One immediate entry of a listed directory
#[derive(Debug, Clone)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub kind: NodeKind,
}

/// Walker configuration
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Entry names that are never scanned (matched against the name only)
    pub exclusions: BTreeSet<String>,
    /// Classify symlinks by their target; off by default so a link back to an
    /// ancestor cannot make the scan recurse forever
    pub follow_symlinks: bool,
}

pub fn default_exclusions() -> BTreeSet<String> {
    DEFAULT_EXCLUSIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
            follow_symlinks: false,
        }
    }
}

/// Lists one directory level at a time
#[derive(Debug, Clone)]
pub struct Walker {
    config: WalkerConfig,
}

impl Walker {
    pub fn new() -> Self {
        Self {
            config: WalkerConfig::default(),
        }
    }

    pub fn with_config(config: WalkerConfig) -> Self {
        Self { config }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.config.exclusions.contains(name)
    }

    /// List the immediate, non-excluded entries of `dir`.
    ///
    /// Fails only when `dir` itself cannot be read. An entry whose type cannot
    /// be determined (a dangling link, say) is reported as a file; hashing it
    /// will then yield the unreadable sentinel.
    pub fn list(&self, dir: &Path) -> Result<Vec<Entry>, TreeError> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(self.config.follow_symlinks);

        let mut entries = Vec::new();
        for result in walker {
            let (path, kind) = match result {
                Ok(entry) => {
                    let kind = if entry.file_type().is_dir() {
                        NodeKind::Directory
                    } else {
                        NodeKind::File
                    };
                    (entry.into_path(), kind)
                }
                Err(e) if e.depth() >= 1 && e.path().is_some() => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    (path, NodeKind::File)
                }
                Err(e) => {
                    return Err(TreeError::IoError(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("Failed to list directory {:?}: {}", dir, e),
                    )));
                }
            };

            let name = match path.file_name() {
                Some(name) => name.to_string_lossy().to_string(),
                None => continue,
            };
            if self.is_excluded(&name) {
                continue;
            }
            entries.push(Entry { name, path, kind });
        }

        Ok(entries)
    }
}

impl Default for Walker {
    fn default() -> Self {
        Self::new()
    }
}
