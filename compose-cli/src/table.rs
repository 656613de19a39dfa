//! Sequence table files
//!
//! A table is TOML with one `[[sequence]]` table per entry:
//!
//! ```toml
//! [[sequence]]
//! keys = ["e", "'"]
//! output = "é"
//!
//! [[sequence]]
//! keys = ["s", "s"]
//! output = "ß"
//! case_insensitive = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use compose_core::{load_sequences, LoadReport, SequenceEntry};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TableFile {
    #[serde(default)]
    sequence: Vec<SequenceEntry>,
}

fn parse_entries(text: &str) -> Result<Vec<SequenceEntry>> {
    let table: TableFile = toml::from_str(text)?;
    Ok(table.sequence)
}

fn read_entries(path: &Path) -> Result<Vec<SequenceEntry>> {
    let text = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    parse_entries(&text).with_context(|| format!("invalid sequence table {}", path.display()))
}

/// Loads a table file, printing every rejected entry
pub fn load(path: &Path) -> Result<LoadReport> {
    let report = load_sequences(read_entries(path)?);
    for rejection in &report.rejected {
        let keys: Vec<String> = rejection.keys.iter().map(ToString::to_string).collect();
        eprintln!(
            "warning: entry {} [{}] skipped: {}",
            rejection.index,
            keys.join(" "),
            rejection.error
        );
    }
    Ok(report)
}
