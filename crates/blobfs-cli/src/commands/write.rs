use std::io::{self, Read};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use blobfs_mount::CreateMode;

use super::normalize_path;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// Destination path in the container
    pub path: String,

    /// Append to file instead of overwriting
    #[arg(short, long)]
    pub append: bool,
}

#[instrument(level = "info", name = "cmd::write", skip_all, fields(path = %args.path, append = args.append))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.path);

    let mut content = Vec::new();
    io::stdin().read_to_end(&mut content)?;

    // Appending to a missing file creates it
    let mode = match session.stat(&path) {
        Ok(meta) if args.append && !meta.is_directory() => CreateMode::Append,
        _ => CreateMode::Truncate,
    };
    session.write_all(&path, &content, mode)
}
