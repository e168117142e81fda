//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string used in log fields (e.g. "host", "sync").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Host { .. } => "host",
        Commands::Sync { .. } => "sync",
        Commands::Scan { .. } => "scan",
        Commands::Diff { .. } => "diff",
    }
}
