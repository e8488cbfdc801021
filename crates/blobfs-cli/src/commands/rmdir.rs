use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use blobfs_mount::{FileSystemOperations, RequestInfo};

use super::normalize_path;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Empty directory to remove
    pub path: String,
}

#[instrument(level = "info", name = "cmd::rmdir", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    session
        .fs()
        .delete_directory(&path, &RequestInfo::directory())
        .with_context(|| format!("Failed to remove directory {path}"))
}
