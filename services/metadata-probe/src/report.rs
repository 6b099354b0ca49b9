//! Rendering resolutions for the terminal or a file.

use std::path::Path;

use anyhow::{Context, Result};
use geo_metadata::ParserRegistry;
use metadata_fetch::Resolution;

pub fn render_json(resolution: &Resolution) -> Result<String> {
    serde_json::to_string_pretty(resolution).context("Failed to serialize resolution")
}

/// One `code<TAB>name` line per registered parser.
pub fn render_parser_list(registry: &ParserRegistry) -> String {
    registry
        .iter()
        .map(|p| format!("{}\t{}\n", p.code(), p.name()))
        .collect()
}

pub async fn write_report(path: &Path, json: &str) -> Result<()> {
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write report to {}", path.display()))
}
