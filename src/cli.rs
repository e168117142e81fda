//! CLI domain: parse, route, help, output, and presentation only.
//! No domain orchestration; single route table dispatches to domain services.

mod help;
mod output;
mod parse;
mod presentation;
mod route;

pub use help::command_name;
pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_diff_json, format_diff_text, format_scan_json, format_scan_text, format_sync_outcome,
};
pub use route::RunContext;
