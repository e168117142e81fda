//! Diff and sync presentation.

use super::format_section_heading;
use crate::diff::{DiffEntry, DiffResult};
use crate::error::ApiError;
use crate::session::SyncOutcome;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;

fn count_kinds(entries: &[DiffEntry]) -> (usize, usize) {
    let files = entries.iter().filter(|e| e.is_file()).count();
    (files, entries.len() - files)
}

fn display_path(entry: &DiffEntry) -> String {
    if entry.is_file() {
        format!("{}:{}", entry.scope, entry.relative_path)
    } else {
        format!("{}:{}/", entry.scope, entry.relative_path)
    }
}

/// Summary table plus one line per change.
pub fn format_diff_text(result: &DiffResult) -> String {
    if result.is_empty() {
        return "No changes: already in sync.".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Changes")));

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Change", "Files", "Directories"]);
    for (label, entries) in [
        ("Add", &result.to_add),
        ("Modify", &result.to_modify),
        ("Delete", &result.to_delete),
    ] {
        let (files, dirs) = count_kinds(entries);
        table.add_row(vec![label.to_string(), files.to_string(), dirs.to_string()]);
    }
    out.push_str(&format!("{}\n\n", table));

    for entry in &result.to_add {
        out.push_str(&format!("  {} {}\n", "+".green(), display_path(entry)));
    }
    for entry in &result.to_modify {
        out.push_str(&format!("  {} {}\n", "~".yellow(), display_path(entry)));
    }
    for entry in &result.to_delete {
        out.push_str(&format!("  {} {}\n", "-".red(), display_path(entry)));
    }
    out
}

fn entry_json(entry: &DiffEntry) -> serde_json::Value {
    serde_json::json!({
        "scope": entry.scope.to_string(),
        "path": entry.relative_path,
        "kind": if entry.is_file() { "file" } else { "directory" },
        "hash": entry.hash.to_string(),
    })
}

pub fn format_diff_json(result: &DiffResult) -> Result<String, ApiError> {
    let out = serde_json::json!({
        "to_add": result.to_add.iter().map(entry_json).collect::<Vec<_>>(),
        "to_modify": result.to_modify.iter().map(entry_json).collect::<Vec<_>>(),
        "to_delete": result.to_delete.iter().map(entry_json).collect::<Vec<_>>(),
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON: {}", e)))
}

pub fn format_sync_outcome(outcome: &SyncOutcome) -> String {
    if outcome.diff.is_empty() {
        return "Already in sync.".to_string();
    }
    if !outcome.applied {
        return "Sync cancelled; nothing was changed.".to_string();
    }
    format!(
        "{} {} added, {} modified, {} deleted ({} files fetched)",
        "Sync complete:".green().bold(),
        outcome.diff.to_add.len(),
        outcome.diff.to_modify.len(),
        outcome.diff.to_delete.len(),
        outcome.fetched.len()
    )
}
