//! List command - list directory contents in a container.
//!
//! # Examples
//!
//! ```bash
//! # List root directory
//! blobfs --root /srv/blobfs ls
//!
//! # List with details
//! blobfs ls -l /documents
//!
//! # Only text files, as JSON for scripting
//! blobfs ls --pattern '*.txt' --json / | jq '.entries[].name'
//! ```

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use blobfs_mount::{format_bytes, FileSystemOperations, FindData, RequestInfo};

use super::normalize_path;
use crate::output::{create_table, format_entry_type, format_time, rfc3339};
use crate::session::Session;

#[derive(ClapArgs, Clone)]
pub struct Args {
    /// Path within the container (default: root)
    #[arg(default_value = "/")]
    pub path: String,

    /// Only list names matching this pattern (`*` and `?`, case-insensitive)
    #[arg(short, long, default_value = "*")]
    pub pattern: String,

    /// Show detailed information
    #[arg(short, long)]
    pub long: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// One entry per line (script-friendly)
    #[arg(short = '1')]
    pub one_per_line: bool,
}

/// JSON output format for ls command
#[derive(Serialize)]
struct LsOutput {
    path: String,
    entries: Vec<EntryInfo>,
}

#[derive(Serialize)]
struct EntryInfo {
    name: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<String>,
}

#[instrument(level = "info", name = "cmd::ls", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let entries = session
        .fs()
        .find_files_with_pattern(&path, &args.pattern, &RequestInfo::directory())
        .with_context(|| format!("Failed to list {path}"))?;

    if args.json {
        print_json(path, &entries)?;
    } else if args.long {
        print_long_format(&entries);
    } else {
        print_short_format(&entries, args.one_per_line);
    }
    Ok(())
}

fn print_json(path: String, entries: &[FindData]) -> Result<()> {
    let output = LsOutput {
        path,
        entries: entries
            .iter()
            .map(|e| EntryInfo {
                name: e.file_name.clone(),
                entry_type: if e.is_directory() { "directory" } else { "file" },
                size: e.length,
                modified: rfc3339(e.last_write_time),
            })
            .collect(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_long_format(entries: &[FindData]) {
    let mut table = create_table();
    table.set_header(vec!["Type", "Size", "Modified", "Name"]);

    for entry in entries {
        let name = if entry.is_directory() {
            format!("{}/", entry.file_name)
        } else {
            entry.file_name.clone()
        };
        table.add_row(vec![
            format_entry_type(entry.is_directory()).to_string(),
            entry.length.map_or_else(|| "-".to_string(), format_bytes),
            format_time(entry.last_write_time),
            name,
        ]);
    }

    println!("{table}");
}

fn print_short_format(entries: &[FindData], one_per_line: bool) {
    if entries.is_empty() {
        return;
    }
    let names: Vec<String> = entries
        .iter()
        .map(|e| {
            if e.is_directory() {
                format!("{}/", e.file_name)
            } else {
                e.file_name.clone()
            }
        })
        .collect();

    if one_per_line || names.len() > 10 {
        for name in names {
            println!("{name}");
        }
    } else {
        println!("{}", names.join("  "));
    }
}
