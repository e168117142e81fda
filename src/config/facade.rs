//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::SyncConfig;
use config::ConfigError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from files and environment.
    pub fn load(workdir: &Path) -> Result<SyncConfig, ConfigError> {
        MergeService::load(workdir)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<SyncConfig, ConfigError> {
        MergeService::load_from_file(path)
    }

    /// Create default configuration.
    pub fn default() -> SyncConfig {
        SyncConfig::default()
    }
}
