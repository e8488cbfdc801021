//! Df command - show volume information and mount statistics.
//!
//! # Examples
//!
//! ```bash
//! blobfs df
//! blobfs df --stats --json
//! ```

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use serde::Serialize;
use tracing::instrument;

use blobfs_mount::{format_bytes, FileSystemOperations, MountStatsSnapshot, RequestInfo};

use crate::output::create_table;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Include mount statistics for this invocation
    #[arg(long)]
    pub stats: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// JSON output format for df command
#[derive(Serialize)]
struct DfOutput {
    container: String,
    file_system: String,
    max_component_length: u32,
    used_bytes: u64,
    free_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    stats: Option<MountStatsSnapshot>,
}

#[instrument(level = "info", name = "cmd::df", skip_all)]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let fs = session.fs();
    let info = RequestInfo::directory();
    let volume = fs
        .get_volume_information(&info)
        .context("Failed to read volume information")?;
    let space = fs
        .get_disk_free_space(&info)
        .context("Failed to read volume usage")?;
    let stats = args.stats.then(|| fs.stats().snapshot());

    if args.json {
        let output = DfOutput {
            container: volume.volume_label,
            file_system: volume.file_system_name,
            max_component_length: volume.maximum_component_length,
            used_bytes: space.total_number_of_bytes,
            free_bytes: space.free_bytes_available,
            stats,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let mut table = create_table();
    table.set_header(vec!["Container", "File System", "Used", "Available"]);
    table.add_row(vec![
        volume.volume_label,
        volume.file_system_name,
        format_bytes(space.total_number_of_bytes),
        format_bytes(space.free_bytes_available),
    ]);
    println!("{table}");

    if let Some(snapshot) = stats {
        print_stats_table(&snapshot, fs.stats().registry().hit_rate());
    }
    Ok(())
}

fn print_stats_table(stats: &MountStatsSnapshot, hit_rate: f64) {
    let mut table = create_table();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec!["Store requests".to_string(), stats.store_requests.to_string()]);
    table.add_row(vec!["Uploaded".to_string(), format_bytes(stats.bytes_uploaded)]);
    table.add_row(vec!["Downloaded".to_string(), format_bytes(stats.bytes_downloaded)]);
    table.add_row(vec!["Handles opened".to_string(), stats.handles_opened.to_string()]);
    table.add_row(vec!["Handles closed".to_string(), stats.handles_closed.to_string()]);
    table.add_row(vec![
        "Registry hits".to_string(),
        format!(
            "{} / {} ({:.1}%)",
            stats.registry_hits,
            stats.registry_hits + stats.registry_misses,
            hit_rate * 100.0
        ),
    ]);
    println!("{table}");
}
