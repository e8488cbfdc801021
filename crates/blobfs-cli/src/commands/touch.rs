use std::time::SystemTime;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use blobfs_mount::{CreateMode, FileSystemOperations};

use super::normalize_path;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to the file to create or touch
    pub path: String,
}

#[instrument(level = "info", name = "cmd::touch", skip_all, fields(path = %args.path))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let fs = session.fs();

    let mut info = session
        .open_entry(&path, CreateMode::OpenOrCreate, false)
        .with_context(|| format!("Failed to open {path}"))?;
    fs.close_file(&path, &mut info)
        .with_context(|| format!("Failed to close {path}"))?;

    let now = SystemTime::now();
    fs.set_file_time(&path, None, Some(now), Some(now), &info)
        .with_context(|| format!("Failed to update times of {path}"))
}
