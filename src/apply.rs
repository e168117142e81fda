//! Applying a diff to the local filesystem
//!
//! A diff is first turned into an ordered [`ApplyPlan`], then executed step by
//! step. Ordering rules:
//! - every delete runs before any create or fetch
//! - files are deleted first, then directories deepest-first
//! - directories are created shallowest-first, so each parent already exists
//! - files are fetched one at a time in the order they were presented
//!
//! A failing step aborts the rest of the plan; nothing is rolled back.

use crate::diff::{DiffEntry, DiffResult};
use crate::error::{ApplyError, ProtocolError};
use crate::tree::path;
use crate::types::RootScope;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Where file contents come from
///
/// The protocol implementation opens one connection per file; other sources
/// (tests, a batched transport) only need to honor the same contract.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Write the content of `entry` to `dest`, replacing any existing file.
    async fn fetch(&self, entry: &DiffEntry, dest: &Path) -> Result<u64, ProtocolError>;
}

/// Local directories that diff entries are resolved against
#[derive(Debug, Clone)]
pub struct LocalRoots {
    pub install: PathBuf,
    pub config: Option<PathBuf>,
}

impl LocalRoots {
    pub fn install_only(install: PathBuf) -> Self {
        Self {
            install,
            config: None,
        }
    }

    pub fn root_for(&self, scope: RootScope) -> Result<&Path, ApplyError> {
        match scope {
            RootScope::Install => Ok(&self.install),
            RootScope::Config => self
                .config
                .as_deref()
                .ok_or(ApplyError::MissingRoot(scope)),
        }
    }

    /// Local path of an entry; rejects paths that would leave the root
    pub fn resolve(&self, entry: &DiffEntry) -> Result<PathBuf, ApplyError> {
        let root = self.root_for(entry.scope)?;
        path::resolve_under(root, &entry.relative_path)
            .ok_or_else(|| ApplyError::InvalidPath(entry.relative_path.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyStep {
    /// Remove whatever is on disk at this path (file or directory tree)
    Remove(PathBuf),
    /// Create one directory; its parent must already exist
    CreateDir(PathBuf),
    /// Download a file's content
    Fetch { entry: DiffEntry, dest: PathBuf },
}

/// Ordered filesystem operations for one diff
#[derive(Debug, Clone, Default)]
pub struct ApplyPlan {
    steps: Vec<ApplyStep>,
}

impl ApplyPlan {
    pub fn steps(&self) -> &[ApplyStep] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn fetch_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| matches!(step, ApplyStep::Fetch { .. }))
            .count()
    }
}

pub struct SyncApplier {
    roots: LocalRoots,
}

impl SyncApplier {
    pub fn new(roots: LocalRoots) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &LocalRoots {
        &self.roots
    }

    /// Order the diff into executable steps.
    ///
    /// A modified entry is both removed and re-added. Every path is resolved
    /// up front, so an invalid entry fails the plan before anything is touched.
    pub fn plan(&self, diff: DiffResult) -> Result<ApplyPlan, ApplyError> {
        let DiffResult {
            to_add,
            to_modify,
            to_delete,
        } = diff;

        let mut deletes = to_delete;
        deletes.extend(to_modify.iter().cloned());
        let mut adds = to_add;
        adds.extend(to_modify);

        let (delete_files, mut delete_dirs): (Vec<_>, Vec<_>) =
            deletes.into_iter().partition(DiffEntry::is_file);
        delete_dirs.sort_by_key(|entry| Reverse(entry.depth()));

        let (add_files, mut add_dirs): (Vec<_>, Vec<_>) =
            adds.into_iter().partition(DiffEntry::is_file);
        add_dirs.sort_by_key(DiffEntry::depth);

        let mut steps = Vec::new();
        for entry in delete_files.iter().chain(delete_dirs.iter()) {
            steps.push(ApplyStep::Remove(self.roots.resolve(entry)?));
        }
        for entry in &add_dirs {
            steps.push(ApplyStep::CreateDir(self.roots.resolve(entry)?));
        }
        for entry in add_files {
            let dest = self.roots.resolve(&entry)?;
            steps.push(ApplyStep::Fetch { entry, dest });
        }

        Ok(ApplyPlan { steps })
    }

    /// Run a plan, returning the entries whose content was fetched.
    #[instrument(skip_all, fields(steps = plan.steps.len()))]
    pub async fn execute(
        &self,
        plan: ApplyPlan,
        source: &dyn FileSource,
    ) -> Result<Vec<DiffEntry>, ApplyError> {
        let mut fetched = Vec::new();
        for step in plan.steps {
            match step {
                ApplyStep::Remove(path) => remove_entry(&path).await?,
                ApplyStep::CreateDir(path) => create_dir(&path).await?,
                ApplyStep::Fetch { entry, dest } => {
                    let bytes = source.fetch(&entry, &dest).await?;
                    debug!(path = %entry.relative_path, bytes, "Fetched");
                    fetched.push(entry);
                }
            }
        }
        info!(fetched = fetched.len(), "Apply completed");
        Ok(fetched)
    }

    pub async fn apply(
        &self,
        diff: DiffResult,
        source: &dyn FileSource,
    ) -> Result<Vec<DiffEntry>, ApplyError> {
        let plan = self.plan(diff)?;
        self.execute(plan, source).await
    }
}

/// Remove a path by its actual on-disk type. Already absent is success.
async fn remove_entry(path: &Path) -> Result<(), ApplyError> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(source) => {
            return Err(ApplyError::Io {
                op: "inspect",
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let result = if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await
    } else {
        tokio::fs::remove_file(path).await
    };
    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ApplyError::Io {
            op: "remove",
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Create a single directory. Already existing is success.
async fn create_dir(path: &Path) -> Result<(), ApplyError> {
    match tokio::fs::create_dir(path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Created directory");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
        Err(source) => Err(ApplyError::Io {
            op: "create directory",
            path: path.to_path_buf(),
            source,
        }),
    }
}
