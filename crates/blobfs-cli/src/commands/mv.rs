use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use blobfs_mount::{FileSystemOperations, RequestInfo};

use super::normalize_path;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Source path
    pub source: String,

    /// Destination path
    pub dest: String,

    /// Replace an existing destination file
    #[arg(short, long)]
    pub force: bool,
}

#[instrument(level = "info", name = "cmd::mv", skip_all, fields(source = %args.source, dest = %args.dest))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let source = normalize_path(&args.source);
    let dest = normalize_path(&args.dest);

    let meta = session
        .stat(&source)
        .with_context(|| format!("Cannot move {source}"))?;
    let info = if meta.is_directory() {
        RequestInfo::directory()
    } else {
        RequestInfo::file()
    };
    session
        .fs()
        .move_file(&source, &dest, args.force, &info)
        .with_context(|| format!("Failed to move {source} to {dest}"))
}
