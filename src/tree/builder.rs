//! Concurrent tree builder
//!
//! Walks a root directory with a fixed pool of worker threads that share one
//! FIFO queue of "expand this directory under this node" tasks. Directories
//! are never recursed inline (apart from near-empty ones), so the walk fans out
//! across the pool instead of running depth-first on one thread.

use crate::error::TreeError;
use crate::tree::hasher;
use crate::tree::node::{NodeArena, Tree, ROOT};
use crate::tree::path;
use crate::tree::queue::{default_worker_count, TaskGuard, WorkQueue};
use crate::tree::walker::{Entry, Walker, WalkerConfig};
use crate::types::{ContentHash, NodeId, NodeKind, RootScope};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::thread;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

/// Directories with at most this many entries are expanded by the worker that
/// found them instead of going back through the queue.
const INLINE_EXPAND_MAX_ENTRIES: usize = 1;

/// Work item: a listed directory whose entries become children of `node`
struct ExpandTask {
    dir: PathBuf,
    node: NodeId,
    entries: Vec<Entry>,
}

/// Tree builder for constructing snapshots
pub struct TreeBuilder {
    root: PathBuf,
    scope: RootScope,
    walker_config: Option<WalkerConfig>,
    workers: Option<usize>,
}

impl TreeBuilder {
    /// Create a new tree builder for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            scope: RootScope::Install,
            walker_config: None,
            workers: None,
        }
    }

    /// Which synchronized root this snapshot represents (default: install)
    pub fn with_scope(mut self, scope: RootScope) -> Self {
        self.scope = scope;
        self
    }

    /// Set walker config (exclusions, symlink handling). When unset the
    /// default exclusion set is used.
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = Some(config);
        self
    }

    /// Override the worker pool size
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Build the complete snapshot. Blocks until every directory is expanded.
    #[instrument(skip(self), fields(root = %self.root.display(), scope = %self.scope))]
    pub fn build(&self) -> Result<Tree, TreeError> {
        let start = Instant::now();
        info!("Starting tree build");

        let root = path::canonicalize_root(&self.root)?;
        if !root.is_dir() {
            return Err(TreeError::InvalidRoot {
                path: root,
                reason: "not a directory".to_string(),
            });
        }

        let walker = match &self.walker_config {
            Some(config) => Walker::with_config(config.clone()),
            None => Walker::new(),
        };
        // Only a failure to list the root aborts the build
        let root_entries = walker.list(&root)?;

        let arena = Mutex::new(NodeArena::with_root(root.display().to_string()));
        let queue = WorkQueue::new();
        queue.push(ExpandTask {
            dir: root.clone(),
            node: ROOT,
            entries: root_entries,
        });

        let workers = self.workers.unwrap_or_else(default_worker_count);
        debug!(workers, "Starting scan workers");

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| run_worker(&queue, &arena, &walker));
            }
            queue.wait_until_drained();
            queue.close();
        });

        let tree = arena.into_inner().into_tree(root, self.scope);

        let duration = start.elapsed();
        info!(
            node_count = tree.len(),
            files = tree.file_count(),
            directories = tree.directory_count(),
            duration_ms = duration.as_millis(),
            "Tree build completed"
        );

        Ok(tree)
    }
}

fn run_worker(queue: &WorkQueue<ExpandTask>, arena: &Mutex<NodeArena>, walker: &Walker) {
    while let Some(task) = queue.pop() {
        let _guard = TaskGuard::new(queue);
        expand(task, queue, arena, walker);
    }
}

/// Create child nodes for a listed directory and schedule its subdirectories.
fn expand(
    task: ExpandTask,
    queue: &WorkQueue<ExpandTask>,
    arena: &Mutex<NodeArena>,
    walker: &Walker,
) {
    let mut inline = vec![task];

    while let Some(task) = inline.pop() {
        trace!(dir = %task.dir.display(), entries = task.entries.len(), "Expanding directory");

        // Hash outside the arena lock; this is where the workers spend their time
        let hashed: Vec<(Entry, ContentHash)> = task
            .entries
            .into_iter()
            .map(|entry| {
                let hash = match entry.kind {
                    NodeKind::File => hasher::hash_file(&entry.path),
                    NodeKind::Directory => ContentHash::Folder,
                };
                (entry, hash)
            })
            .collect();

        let subdirs: Vec<(PathBuf, NodeId)> = {
            let mut arena = arena.lock();
            hashed
                .into_iter()
                .filter_map(|(entry, hash)| {
                    let id = arena.insert_child(task.node, entry.name, entry.kind, hash);
                    (entry.kind == NodeKind::Directory).then_some((entry.path, id))
                })
                .collect()
        };

        for (dir, node) in subdirs {
            let entries = match walker.list(&dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Directory unreadable, keeping it empty");
                    continue;
                }
            };
            let task = ExpandTask { dir, node, entries };
            if task.entries.len() <= INLINE_EXPAND_MAX_ENTRIES {
                inline.push(task);
            } else {
                queue.push(task);
            }
        }
    }
}
