//! Scan presentation.

use super::format_section_heading;
use crate::error::ApiError;
use crate::tree::node::Tree;
use crate::types::ContentHash;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use std::time::Duration;

fn unreadable_paths(tree: &Tree) -> Vec<String> {
    tree.subtree(tree.root())
        .into_iter()
        .filter(|id| tree.node(*id).hash == ContentHash::Unreadable)
        .map(|id| tree.relative_path(id))
        .collect()
}

pub fn format_scan_text(tree: &Tree, elapsed: Duration) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", format_section_heading("Snapshot")));
    out.push_str(&format!("  Root: {}\n", tree.root_path().display()));
    out.push_str(&format!("  Scope: {}\n", tree.scope()));
    out.push_str(&format!("  Scan time: {}ms\n\n", elapsed.as_millis()));

    let unreadable = unreadable_paths(tree);
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Files", "Directories", "Unreadable"]);
    table.add_row(vec![
        tree.file_count().to_string(),
        tree.directory_count().to_string(),
        unreadable.len().to_string(),
    ]);
    out.push_str(&format!("{}\n", table));

    if !unreadable.is_empty() {
        out.push_str("\nUnreadable files (never reported as changed):\n");
        for path in &unreadable {
            out.push_str(&format!("  - {}\n", path));
        }
    }
    out
}

/// Every node with its display hash, pre-order
pub fn format_scan_json(tree: &Tree, elapsed: Duration) -> Result<String, ApiError> {
    let entries: Vec<serde_json::Value> = tree
        .subtree(tree.root())
        .into_iter()
        .skip(1)
        .map(|id| {
            let node = tree.node(id);
            serde_json::json!({
                "path": tree.relative_path(id),
                "kind": if node.is_file() { "file" } else { "directory" },
                "hash": node.hash.to_string(),
            })
        })
        .collect();
    let out = serde_json::json!({
        "root": tree.root_path().display().to_string(),
        "scope": tree.scope().to_string(),
        "files": tree.file_count(),
        "directories": tree.directory_count(),
        "elapsed_ms": elapsed.as_millis() as u64,
        "entries": entries,
    });
    serde_json::to_string_pretty(&out)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render JSON: {}", e)))
}
