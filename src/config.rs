//! Configuration System
//!
//! Layered configuration for hosts and clients: built-in defaults, a global
//! user file, a workspace file and `TREELINK__*` environment overrides, merged
//! in that order and validated before use.

use crate::apply::LocalRoots;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::protocol::codec::{FrameCodec, DEFAULT_MAX_FRAME_BYTES};
use crate::tree::path;
use crate::tree::walker::{self, WalkerConfig};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Port used when none is configured
pub const DEFAULT_PORT: u16 = 5002;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub roots: RootsConfig,

    #[serde(default)]
    pub scan: ScanConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where to listen and whom to contact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Host a client syncs from, when not given on the command line
    #[serde(default)]
    pub host: Option<String>,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest snapshot or diff frame accepted from a peer
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: u64,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_max_frame_bytes() -> u64 {
    DEFAULT_MAX_FRAME_BYTES
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: None,
            bind_address: default_bind_address(),
            port: default_port(),
            max_frame_bytes: default_max_frame_bytes(),
        }
    }
}

impl NetworkConfig {
    pub fn bind_addr(&self) -> String {
        match self.bind_address.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.bind_address, self.port),
        }
    }

    /// Address to dial for `host`; the configured port is appended unless
    /// `host` already names one.
    pub fn peer_address(&self, host: &str) -> String {
        if host.parse::<SocketAddr>().is_ok() {
            return host.to_string();
        }
        if let Ok(ip) = host.parse::<IpAddr>() {
            return SocketAddr::new(ip, self.port).to_string();
        }
        if let Some((_, port)) = host.rsplit_once(':') {
            if port.parse::<u16>().is_ok() {
                return host.to_string();
            }
        }
        format!("{}:{}", host, self.port)
    }

    pub fn codec(&self) -> FrameCodec {
        FrameCodec::new(self.max_frame_bytes)
    }
}

/// Directories that are synchronized
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootsConfig {
    #[serde(default = "default_install_root")]
    pub install_root: PathBuf,

    /// Per-user configuration directory; config sync is unavailable without it
    #[serde(default)]
    pub config_root: Option<PathBuf>,

    /// File that must exist in the install root before hosting or syncing
    #[serde(default)]
    pub required_marker: Option<String>,
}

fn default_install_root() -> PathBuf {
    PathBuf::from(".")
}

impl Default for RootsConfig {
    fn default() -> Self {
        Self {
            install_root: default_install_root(),
            config_root: None,
            required_marker: None,
        }
    }
}

impl RootsConfig {
    /// Make relative roots relative to `base` instead of the process cwd
    pub fn resolve_against(&mut self, base: &Path) {
        if self.install_root.is_relative() {
            self.install_root = base.join(&self.install_root);
        }
        if let Some(root) = self.config_root.as_mut() {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        }
    }

    pub fn check_marker(&self) -> Result<(), ApiError> {
        if let Some(marker) = &self.required_marker {
            if !self.install_root.join(marker).exists() {
                return Err(ApiError::ConfigError(format!(
                    "{} not found in {}; is this the install directory?",
                    marker,
                    self.install_root.display()
                )));
            }
        }
        Ok(())
    }

    pub fn local_roots(&self, with_config: bool) -> LocalRoots {
        LocalRoots {
            install: self.install_root.clone(),
            config: if with_config {
                self.config_root.clone()
            } else {
                None
            },
        }
    }
}

/// Scanner settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Entry names never scanned (replaces the default list when set)
    #[serde(default = "default_exclusions")]
    pub exclusions: Vec<String>,

    #[serde(default)]
    pub follow_symlinks: bool,

    /// Worker pool size; None picks one from the available parallelism
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_exclusions() -> Vec<String> {
    walker::default_exclusions().into_iter().collect()
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclusions: default_exclusions(),
            follow_symlinks: false,
            workers: None,
        }
    }
}

impl ScanConfig {
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            exclusions: self.exclusions.iter().cloned().collect(),
            follow_symlinks: self.follow_symlinks,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Network(String),
    Roots(String),
    Scan(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Network(msg) => write!(f, "Network: {}", msg),
            ValidationError::Roots(msg) => write!(f, "Roots: {}", msg),
            ValidationError::Scan(msg) => write!(f, "Scan: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SyncConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.network.port == 0 {
            errors.push(ValidationError::Network("port cannot be 0".to_string()));
        }
        if self.network.bind_address.trim().is_empty() {
            errors.push(ValidationError::Network(
                "bind_address cannot be empty".to_string(),
            ));
        }
        if self.network.max_frame_bytes == 0 {
            errors.push(ValidationError::Network(
                "max_frame_bytes must be positive".to_string(),
            ));
        }

        if self.roots.install_root.as_os_str().is_empty() {
            errors.push(ValidationError::Roots(
                "install_root cannot be empty".to_string(),
            ));
        }
        if let Some(marker) = &self.roots.required_marker {
            if !path::is_valid_segment(marker) {
                errors.push(ValidationError::Roots(format!(
                    "required_marker '{}' must be a plain file name",
                    marker
                )));
            }
        }
        if self.roots.config_root.as_deref() == Some(self.roots.install_root.as_path()) {
            errors.push(ValidationError::Roots(
                "config_root must differ from install_root".to_string(),
            ));
        }

        if self.scan.workers == Some(0) {
            errors.push(ValidationError::Scan("workers must be at least 1".to_string()));
        }
        for name in &self.scan.exclusions {
            if !path::is_valid_segment(name) {
                errors.push(ValidationError::Scan(format!(
                    "exclusion '{}' must be a single entry name",
                    name
                )));
            }
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "unknown format '{}'",
                self.logging.format
            )));
        }
        if !matches!(self.logging.output.as_str(), "stdout" | "stderr" | "file") {
            errors.push(ValidationError::Logging(format!(
                "unknown output '{}'",
                self.logging.output
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate, folding every problem into one error
    pub fn validated(self) -> Result<Self, ApiError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ApiError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })?;
        Ok(self)
    }
}
