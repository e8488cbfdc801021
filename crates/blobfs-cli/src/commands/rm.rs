use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{debug, instrument};

use blobfs_mount::{FileSystemOperations, FsStatus, RequestInfo};

use super::{join_path, normalize_path};
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Path to remove
    pub path: String,

    /// Remove directories and their contents recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Ignore nonexistent files
    #[arg(short, long)]
    pub force: bool,
}

/// Entries removed by a recursive delete.
#[derive(Debug, Default)]
struct RemoveStats {
    files_deleted: usize,
    directories_deleted: usize,
}

#[instrument(level = "info", name = "cmd::rm", skip_all, fields(path = %args.path, recursive = args.recursive))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);
    let fs = session.fs();

    let meta = match session.stat(&path) {
        Ok(meta) => meta,
        Err(FsStatus::FileNotFound | FsStatus::PathNotFound) if args.force => return Ok(()),
        Err(status) => return Err(status).with_context(|| format!("Cannot remove {path}")),
    };

    if !meta.is_directory() {
        return fs
            .delete_file(&path, &RequestInfo::file())
            .with_context(|| format!("Failed to remove {path}"));
    }

    if args.recursive {
        let mut stats = RemoveStats::default();
        remove_tree(session, &path, &mut stats)?;
        eprintln!(
            "Deleted {} files and {} directories",
            stats.files_deleted, stats.directories_deleted
        );
        Ok(())
    } else {
        fs.delete_directory(&path, &RequestInfo::directory())
            .with_context(|| format!("Failed to remove directory {path}"))
    }
}

fn remove_tree(session: &Session, dir: &str, stats: &mut RemoveStats) -> Result<()> {
    let fs = session.fs();
    let entries = fs
        .find_files(dir, &RequestInfo::directory())
        .with_context(|| format!("Failed to list {dir}"))?;

    for entry in entries {
        let child = join_path(dir, &entry.file_name);
        if entry.is_directory() {
            remove_tree(session, &child, stats)?;
        } else {
            debug!(path = %child, "Removing file");
            fs.delete_file(&child, &RequestInfo::file())
                .with_context(|| format!("Failed to remove {child}"))?;
            stats.files_deleted += 1;
        }
    }

    fs.delete_directory(dir, &RequestInfo::directory())
        .with_context(|| format!("Failed to remove directory {dir}"))?;
    stats.directories_deleted += 1;
    Ok(())
}
