use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use blobfs_mount::format_bytes;

use super::normalize_path;
use crate::output::{create_table, format_attributes, format_time, rfc3339};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Path within the container
    pub path: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for stat command
#[derive(Serialize)]
struct StatOutput {
    path: String,
    name: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    size: u64,
    attributes: u32,
    created: Option<String>,
    accessed: Option<String>,
    modified: Option<String>,
}

#[instrument(level = "info", name = "cmd::stat", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let meta = session
        .stat(&path)
        .with_context(|| format!("Cannot stat {path}"))?;
    let entry_type = if meta.is_directory() { "directory" } else { "file" };

    if args.json {
        let output = StatOutput {
            path,
            name: meta.file_name.clone(),
            entry_type,
            size: meta.length,
            attributes: meta.attributes.bits(),
            created: rfc3339(meta.creation_time),
            accessed: rfc3339(meta.last_access_time),
            modified: rfc3339(meta.last_write_time),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        let mut table = create_table();
        table.set_header(vec!["Property", "Value"]);
        table.add_row(vec!["Path".to_string(), path]);
        table.add_row(vec!["Type".to_string(), entry_type.to_string()]);
        table.add_row(vec![
            "Size".to_string(),
            format!("{} ({} bytes)", format_bytes(meta.length), meta.length),
        ]);
        table.add_row(vec!["Attributes".to_string(), format_attributes(meta.attributes)]);
        table.add_row(vec!["Created".to_string(), format_time(meta.creation_time)]);
        table.add_row(vec!["Accessed".to_string(), format_time(meta.last_access_time)]);
        table.add_row(vec!["Modified".to_string(), format_time(meta.last_write_time)]);
        println!("{table}");
    }

    Ok(())
}
