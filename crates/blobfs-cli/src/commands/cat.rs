use anyhow::Result;
use clap::Args as ClapArgs;
use std::io::{self, Write};
use tracing::instrument;

use super::normalize_path;
use crate::session::Session;

#[derive(ClapArgs)]
pub struct Args {
    /// File path within the container
    pub file: String,
}

#[instrument(level = "info", name = "cmd::cat", skip_all, fields(file = %args.file))]
pub fn execute(session: &Session, args: &Args) -> Result<()> {
    let path = normalize_path(&args.file);
    let content = session.read_to_end(&path)?;
    io::stdout().write_all(&content)?;
    Ok(())
}
