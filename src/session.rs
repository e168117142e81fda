//! Client sync flow
//!
//! Snapshot the local install root (and optionally the config root), ask the
//! host what differs, let the operator confirm, then apply.

use crate::apply::SyncApplier;
use crate::config::{ScanConfig, SyncConfig};
use crate::diff::{self, DiffEntry, DiffResult};
use crate::error::ApiError;
use crate::protocol::HostClient;
use crate::tree::builder::TreeBuilder;
use crate::tree::node::Tree;
use crate::types::RootScope;
use std::path::Path;
use tracing::{info, instrument};

/// Build a snapshot on the blocking pool
pub async fn build_snapshot(
    root: &Path,
    scope: RootScope,
    scan: &ScanConfig,
) -> Result<Tree, ApiError> {
    let mut builder = TreeBuilder::new(root.to_path_buf())
        .with_scope(scope)
        .with_walker_config(scan.walker_config());
    if let Some(workers) = scan.workers {
        builder = builder.with_workers(workers);
    }
    let tree = tokio::task::spawn_blocking(move || builder.build()).await??;
    Ok(tree)
}

/// Diff two local directories, `base` being authoritative
pub async fn local_diff(base: &Path, other: &Path, scan: &ScanConfig) -> Result<DiffResult, ApiError> {
    let base = build_snapshot(base, RootScope::Install, scan).await?;
    let other = build_snapshot(other, RootScope::Install, scan).await?;
    Ok(diff::diff(&base, &other))
}

/// What a sync run did
#[derive(Debug, Clone)]
pub struct SyncOutcome {
    pub diff: DiffResult,
    pub fetched: Vec<DiffEntry>,
    /// False when there was nothing to do or the operator declined
    pub applied: bool,
}

pub struct SyncSession {
    config: SyncConfig,
    client: HostClient,
    with_config: bool,
}

impl SyncSession {
    pub fn new(config: SyncConfig, host: &str, with_config: bool) -> Self {
        let client = HostClient::new(config.network.peer_address(host), config.network.codec());
        Self::with_client(config, client, with_config)
    }

    pub fn with_client(config: SyncConfig, client: HostClient, with_config: bool) -> Self {
        Self {
            config,
            client,
            with_config,
        }
    }

    pub fn client(&self) -> &HostClient {
        &self.client
    }

    /// Ask the host for the changes that would bring the local roots in line.
    /// Each scope is compared over its own connection.
    #[instrument(skip(self), fields(host = %self.client.addr(), with_config = self.with_config))]
    pub async fn compare(&self) -> Result<DiffResult, ApiError> {
        let roots = &self.config.roots;
        roots.check_marker()?;

        let install = build_snapshot(&roots.install_root, RootScope::Install, &self.config.scan).await?;
        let mut result = self.client.compare(&install).await?;

        if self.with_config {
            let config_root = roots.config_root.as_deref().ok_or_else(|| {
                ApiError::ConfigError("config sync requested but roots.config_root is not set".to_string())
            })?;
            let config_tree = build_snapshot(config_root, RootScope::Config, &self.config.scan).await?;
            result.merge(self.client.compare(&config_tree).await?);
        }

        info!(changes = result.len(), "Compared with host");
        Ok(result)
    }

    /// Full client flow. `confirm` sees the merged diff and decides whether to
    /// apply it; it is not called when there is nothing to change.
    pub async fn run<F>(&self, confirm: F) -> Result<SyncOutcome, ApiError>
    where
        F: FnOnce(&DiffResult) -> Result<bool, ApiError>,
    {
        let diff = self.compare().await?;
        if diff.is_empty() {
            info!("Already in sync");
            return Ok(SyncOutcome {
                diff,
                fetched: Vec::new(),
                applied: false,
            });
        }
        if !confirm(&diff)? {
            info!("Sync declined");
            return Ok(SyncOutcome {
                diff,
                fetched: Vec::new(),
                applied: false,
            });
        }

        let applier = SyncApplier::new(self.config.roots.local_roots(self.with_config));
        let fetched = applier.apply(diff.clone(), &self.client).await?;
        Ok(SyncOutcome {
            diff,
            fetched,
            applied: true,
        })
    }
}
