#![deny(unsafe_code)]

mod commands;
mod config;
mod exit_code;
mod output;
mod session;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use blobfs_core::StoreError;
use blobfs_mount::{BlobFsError, FsStatus};

use crate::commands::{cat, df, ls, mkdir, mv, rm, rmdir, stat, touch, write};
use crate::config::{Config, Overrides, Settings};
use crate::session::Session;

/// Command-line interface for blobfs containers
#[derive(Parser)]
#[command(name = "blobfs")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # List the root of the default container
    blobfs --root /srv/blobfs ls

    # Store a file and read it back
    echo hello | blobfs --root /srv/blobfs write /notes/hello.txt
    blobfs --root /srv/blobfs cat /notes/hello.txt

    # Show usage and request counters
    blobfs --root /srv/blobfs df --stats

    # Settings can come from ~/.config/blobfs/config.toml
    blobfs -c photos ls /2024
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (default: ~/.config/blobfs/config.toml)
    #[arg(long, value_name = "FILE", env = "BLOBFS_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the store's containers
    #[arg(long, value_name = "DIR", env = "BLOBFS_ROOT", global = true)]
    root: Option<PathBuf>,

    /// Container to operate on (default: blobfs)
    #[arg(short, long, env = "BLOBFS_CONTAINER", global = true)]
    container: Option<String>,

    /// Directory for scratch files (default: a temporary directory)
    #[arg(long, value_name = "DIR", env = "BLOBFS_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List directory contents
    Ls(ls::Args),

    /// Read and output file contents
    Cat(cat::Args),

    /// Write stdin to a file
    Write(write::Args),

    /// Create an empty file or update its times
    Touch(touch::Args),

    /// Create a directory
    Mkdir(mkdir::Args),

    /// Remove a file or directory
    Rm(rm::Args),

    /// Remove an empty directory
    Rmdir(rmdir::Args),

    /// Move or rename a file or directory
    Mv(mv::Args),

    /// Show information about a file or directory
    Stat(stat::Args),

    /// Show volume usage
    Df(df::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            // Only print error if not quiet mode (quiet is parsed separately for this)
            let args: Vec<String> = std::env::args().collect();
            let is_quiet = args.iter().any(|a| a == "-q" || a == "--quiet");

            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let config = Config::load(cli.config.as_deref())?;
    let overrides = Overrides {
        root: cli.root.clone(),
        container: cli.container.clone(),
        cache_dir: cli.cache_dir.clone(),
    };
    let settings = Settings::resolve(overrides, config)?;
    let session = Session::open(&settings)?;

    let result = match &cli.command {
        Commands::Ls(args) => ls::execute(&session, args),
        Commands::Cat(args) => cat::execute(&session, args),
        Commands::Write(args) => write::execute(&session, args),
        Commands::Touch(args) => touch::execute(&session, args),
        Commands::Mkdir(args) => mkdir::execute(&session, args),
        Commands::Rm(args) => rm::execute(&session, args),
        Commands::Rmdir(args) => rmdir::execute(&session, args),
        Commands::Mv(args) => mv::execute(&session, args),
        Commands::Stat(args) => stat::execute(&session, args),
        Commands::Df(args) => df::execute(&session, args),
    };

    // Unmount even when the command failed so open handles are flushed
    let closed = session.close();
    result?;
    closed
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(status) = cause.downcast_ref::<FsStatus>() {
            return status_exit_code(*status);
        }

        if let Some(fs_err) = cause.downcast_ref::<BlobFsError>() {
            return status_exit_code(FsStatus::from(fs_err));
        }

        if let Some(store_err) = cause.downcast_ref::<StoreError>() {
            match store_err {
                StoreError::NotFound { .. } | StoreError::ContainerNotFound { .. } => {
                    return exit_code::NOT_FOUND;
                }
                StoreError::PermissionDenied { .. } => return exit_code::PERMISSION_DENIED,
                StoreError::Unavailable { .. } => return exit_code::STORE_UNAVAILABLE,
                _ => {}
            }
        }

        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return exit_code::CONFIG_INVALID;
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::PermissionDenied => return exit_code::PERMISSION_DENIED,
                io::ErrorKind::NotFound => return exit_code::NOT_FOUND,
                _ => {}
            }
        }
    }

    exit_code::GENERAL_ERROR
}

fn status_exit_code(status: FsStatus) -> u8 {
    match status {
        FsStatus::FileNotFound | FsStatus::PathNotFound => exit_code::NOT_FOUND,
        FsStatus::AccessDenied => exit_code::PERMISSION_DENIED,
        FsStatus::FileExists => exit_code::ALREADY_EXISTS,
        FsStatus::Error | FsStatus::Unsupported => exit_code::GENERAL_ERROR,
    }
}
