//! CLI route: single route table and run context. Dispatches to domain services and presentation.

use crate::cli::help::command_name;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_diff_json, format_diff_text, format_scan_json, format_scan_text, format_sync_outcome,
};
use crate::config::{ConfigLoader, SyncConfig};
use crate::error::{ApiError, ProtocolError};
use crate::protocol::Host;
use crate::session::{build_snapshot, local_diff, SyncSession};
use crate::types::RootScope;
use dialoguer::Confirm;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Runtime;
use tracing::info;

/// Runtime context for CLI execution: working directory, merged config and
/// the async runtime the network commands run on.
pub struct RunContext {
    workdir: PathBuf,
    config: SyncConfig,
    runtime: Runtime,
}

impl RunContext {
    /// Create run context from a working directory and optional config path. Uses ConfigLoader only.
    pub fn new(workdir: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workdir)?
        };
        config.roots.resolve_against(&workdir);
        let config = config.validated()?;

        let runtime = Runtime::new()
            .map_err(|e| ApiError::ConfigError(format!("Failed to create runtime: {}", e)))?;

        Ok(Self {
            workdir,
            config,
            runtime,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        info!(command = command_name(command), "Executing command");
        match command {
            Commands::Host { port } => self.host(*port),
            Commands::Sync {
                host,
                with_config,
                yes,
            } => self.sync(host.as_deref(), *with_config, *yes),
            Commands::Scan { path, format } => self.scan(path.as_deref(), format),
            Commands::Diff {
                base,
                other,
                format,
            } => self.diff(base, other, format),
        }
    }

    fn host(&self, port: Option<u16>) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        if let Some(port) = port {
            config.network.port = port;
        }

        self.runtime.block_on(async {
            let host = Arc::new(Host::prepare(&config).await?);
            let listener = Host::bind(&config.network).await?;
            let addr = listener.local_addr().map_err(ProtocolError::from)?;
            println!(
                "Hosting {} on {} (Ctrl+C to stop)",
                config.roots.install_root.display(),
                addr
            );
            host.serve(listener).await?;
            Ok::<String, ApiError>(String::new())
        })
    }

    fn sync(&self, host: Option<&str>, with_config: bool, yes: bool) -> Result<String, ApiError> {
        let host = host
            .map(str::to_string)
            .or_else(|| self.config.network.host.clone())
            .ok_or_else(|| {
                ApiError::ConfigError("No host given; pass --host or set network.host".to_string())
            })?;

        let session = SyncSession::new(self.config.clone(), &host, with_config);
        let outcome = self.runtime.block_on(session.run(|diff| {
            println!("{}", format_diff_text(diff));
            if yes {
                return Ok(true);
            }
            Confirm::new()
                .with_prompt("Apply these changes?")
                .default(false)
                .interact()
                .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
        }))?;

        Ok(format_sync_outcome(&outcome))
    }

    fn scan(&self, path: Option<&Path>, format: &str) -> Result<String, ApiError> {
        check_format(format)?;
        let root = match path {
            Some(p) if p.is_relative() => self.workdir.join(p),
            Some(p) => p.to_path_buf(),
            None => self.config.roots.install_root.clone(),
        };

        let started = Instant::now();
        let tree = self
            .runtime
            .block_on(build_snapshot(&root, RootScope::Install, &self.config.scan))?;
        let elapsed = started.elapsed();

        if format == "json" {
            format_scan_json(&tree, elapsed)
        } else {
            Ok(format_scan_text(&tree, elapsed))
        }
    }

    fn diff(&self, base: &Path, other: &Path, format: &str) -> Result<String, ApiError> {
        check_format(format)?;
        let base = self.workdir.join(base);
        let other = self.workdir.join(other);
        let result = self
            .runtime
            .block_on(local_diff(&base, &other, &self.config.scan))?;

        if format == "json" {
            format_diff_json(&result)
        } else {
            Ok(format_diff_text(&result))
        }
    }
}

fn check_format(format: &str) -> Result<(), ApiError> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ApiError::ConfigError(format!(
            "Unknown format '{}' (must be 'text' or 'json')",
            other
        ))),
    }
}
