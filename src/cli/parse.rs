//! CLI parse: clap types for treelink. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// treelink CLI - mirror a game installation from a host over the LAN
#[derive(Parser)]
#[command(name = "treelink")]
#[command(about = "Synchronize a directory tree from a host using content-hashed snapshots")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Working directory; relative roots and treelink.toml are resolved here
    #[arg(long, default_value = ".")]
    pub workdir: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Snapshot the install (and config) root and serve it to clients
    Host {
        /// Listen port (overrides network.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Bring the local roots in line with a host
    Sync {
        /// Host address, with or without port (overrides network.host)
        #[arg(long)]
        host: Option<String>,
        /// Also synchronize the configuration root
        #[arg(long)]
        with_config: bool,
        /// Apply without asking for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Build a snapshot and summarize it
    Scan {
        /// Directory to scan (default: roots.install_root)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Compare two local directories; BASE is authoritative
    Diff {
        base: PathBuf,
        other: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
