use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use blobfs_mount::{CreateMode, FileSystemOperations, FsStatus};

use super::{join_path, normalize_path};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Directory path to create
    pub path: String,

    /// Create parent directories as needed
    #[arg(short, long)]
    pub parents: bool,
}

#[instrument(level = "info", name = "cmd::mkdir", skip_all, fields(path = %args.path, parents = args.parents))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);

    if args.parents {
        create_with_parents(session, &path)
    } else {
        create(session, &path, CreateMode::CreateNew)
    }
}

fn create_with_parents(session: &Session, path: &str) -> Result<()> {
    let mut current = "/".to_string();
    for component in path.split('/').filter(|s| !s.is_empty()) {
        current = join_path(&current, component);
        create(session, &current, CreateMode::OpenOrCreate)?;
    }
    Ok(())
}

fn create(session: &Session, path: &str, mode: CreateMode) -> Result<()> {
    // Markers never collide with file keys, so check for a file first
    if let Ok(meta) = session.stat(path)
        && !meta.is_directory()
    {
        return Err(FsStatus::FileExists)
            .with_context(|| format!("Path component is a file: {path}"));
    }

    let mut info = session
        .open_entry(path, mode, true)
        .with_context(|| format!("Failed to create directory {path}"))?;
    session
        .fs()
        .close_file(path, &mut info)
        .with_context(|| format!("Failed to close {path}"))
}
