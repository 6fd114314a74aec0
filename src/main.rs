//! Binary entry point: parse flags, set up logging, load the library once and
//! hand it either to a one-shot command or to the Ratatui event loop.
use std::fs::{self, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use personal_library_manager::cli::{open_library, run_command, Args};
use personal_library_manager::store;
use personal_library_manager::{run_app, App};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    let interactive = args.command.is_none();

    setup_tracing(&args, interactive)?;

    let store_path = match args.store.clone() {
        Some(path) => path,
        None => store::default_store_path()?,
    };
    let mut library = open_library(&store_path, args.reset_corrupt)?;

    match args.command {
        Some(command) => {
            let stdout = io::stdout();
            run_command(&mut library, command, &mut stdout.lock())
        }
        None => {
            info!(path = %store_path.display(), books = library.len(), "starting session");
            let mut app = App::new(library);
            run_app(&mut app)
        }
    }
}

/// Interactive sessions log to a file because the TUI owns the terminal;
/// one-shot commands log to stderr.
fn setup_tracing(args: &Args, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("personal_library_manager=debug,warn")
        } else {
            EnvFilter::new("personal_library_manager=info,warn")
        }
    });

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
        return Ok(());
    }

    let log_path = match &args.log_file {
        Some(path) => path.clone(),
        None => default_log_path()?,
    };
    if let Some(parent) = log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).context("failed to create log directory")?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .init();
    Ok(())
}

fn default_log_path() -> Result<PathBuf> {
    Ok(store::data_dir()?.join("library.log"))
}
