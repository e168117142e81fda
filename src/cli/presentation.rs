//! CLI presentation: text and json formatters per command family.

mod changes;
mod snapshot;

pub use changes::{format_diff_json, format_diff_text, format_sync_outcome};
pub use snapshot::{format_scan_json, format_scan_text};

use owo_colors::OwoColorize;

/// Bold, underlined section title
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}
