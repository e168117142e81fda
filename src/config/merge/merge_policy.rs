//! Merge rules: defaults, override order, conflict handling.

use crate::config::DEFAULT_PORT;
use crate::protocol::codec::DEFAULT_MAX_FRAME_BYTES;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("network.bind_address", "0.0.0.0")?
        .set_default("network.port", i64::from(DEFAULT_PORT))?
        .set_default("network.max_frame_bytes", DEFAULT_MAX_FRAME_BYTES as i64)?
        .set_default("roots.install_root", ".")?
        .set_default("scan.follow_symlinks", false)
}
