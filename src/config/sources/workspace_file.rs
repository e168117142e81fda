//! Workdir config file source: <workdir>/treelink.toml

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::File;
use std::path::Path;

pub const WORKSPACE_CONFIG_FILE: &str = "treelink.toml";

/// Add the workdir config file to builder when present.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workdir: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workdir.join(WORKSPACE_CONFIG_FILE);
    if path.exists() {
        return Ok(builder.add_source(File::from(path).required(false)));
    }
    Ok(builder)
}
