//! Command-line surface. With no subcommand the binary starts the TUI; the
//! subcommands give scriptable access to the same store operations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::error::LibraryError;
use crate::models::BookEntry;
use crate::store::{quarantine, Library};

#[derive(Parser, Debug)]
#[command(name = "personal-library-manager")]
#[command(about = "Catalogue your books and see how much of your library you have read")]
pub struct Args {
    /// Library file to use instead of ~/.personal-library/library.txt
    #[arg(long, value_name = "PATH", global = true)]
    pub store: Option<PathBuf>,

    /// Where the interactive session writes its log
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Move an unreadable library file aside and start with an empty library
    #[arg(long, global = true)]
    pub reset_corrupt: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a book
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: i32,
        #[arg(long)]
        genre: String,
        /// Mark the book as already read
        #[arg(long)]
        read: bool,
    },
    /// Remove the book at POSITION, as numbered by `list`
    Remove {
        #[arg(value_name = "POSITION")]
        position: usize,
    },
    /// List every book in insertion order
    List,
    /// Find books whose title or author contains TERM
    Search {
        #[arg(value_name = "TERM")]
        term: String,
    },
    /// Show totals, genre counts and collection growth
    Stats,
}

/// Load the library for this session. A corrupt file aborts startup unless
/// `reset_corrupt` asks for it to be moved aside as `<name>.corrupt`.
pub fn open_library(path: &Path, reset_corrupt: bool) -> Result<Library> {
    match Library::open(path) {
        Ok(library) => Ok(library),
        Err(LibraryError::CorruptStore { path, source }) if reset_corrupt => {
            let moved = quarantine(&path)
                .with_context(|| format!("failed to move {} aside", path.display()))?;
            warn!(
                error = %source,
                moved_to = %moved.display(),
                "library file was corrupt, starting empty"
            );
            Ok(Library::empty(path))
        }
        Err(err @ LibraryError::CorruptStore { .. }) => Err(err).context(
            "the library file could not be parsed; rerun with --reset-corrupt to move it aside",
        ),
        Err(err) => Err(err).context("failed to load library"),
    }
}

/// Execute a single subcommand against `library`, writing plain text to `out`.
pub fn run_command(library: &mut Library, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Add {
            title,
            author,
            year,
            genre,
            read,
        } => {
            let entry = library
                .add(&title, &author, year, &genre, read)
                .context("failed to add book")?;
            info!(id = %entry.id, title = %entry.record.title, "book added");
            writeln!(out, "Added {}", entry.record.display_title())?;
        }
        Command::Remove { position } => {
            let index = position
                .checked_sub(1)
                .context("positions start at 1")?;
            let entry = library.remove(index).context("failed to remove book")?;
            info!(id = %entry.id, title = %entry.record.title, "book removed");
            writeln!(out, "Removed {}", entry.record.display_title())?;
        }
        Command::List => {
            if library.is_empty() {
                writeln!(out, "Your library is empty. Add some books!")?;
            }
            write_entries(out, library.list())?;
        }
        Command::Search { term } => {
            let term = term.trim();
            let hits = library.search(term);
            if hits.is_empty() {
                writeln!(out, "No matching books found.")?;
            }
            for entry in &hits {
                let position = library
                    .position_of(entry.id)
                    .map(|idx| idx + 1)
                    .unwrap_or_default();
                write_entry(out, position, entry)?;
            }
        }
        Command::Stats => {
            let summary = library.summary();
            writeln!(out, "Total books:     {}", summary.total)?;
            writeln!(out, "Read books:      {}", summary.read_count)?;
            writeln!(out, "Unread books:    {}", summary.unread_count)?;
            writeln!(out, "Completion rate: {:.1}%", summary.percent_read)?;

            let genres = crate::stats::genres_by_count(library.records());
            if !genres.is_empty() {
                writeln!(out)?;
                writeln!(out, "Genre distribution:")?;
                for (genre, count) in genres {
                    writeln!(out, "  {genre}: {count}")?;
                }
            }

            let growth = library.growth_series();
            if !growth.is_empty() {
                writeln!(out)?;
                writeln!(out, "Reading progress:")?;
                for point in growth {
                    writeln!(
                        out,
                        "  {}  {}",
                        point.added_at.format("%Y-%m-%d %H:%M:%S"),
                        point.cumulative
                    )?;
                }
            }
        }
    }
    Ok(())
}

fn write_entries(out: &mut impl Write, entries: &[BookEntry]) -> Result<()> {
    for (idx, entry) in entries.iter().enumerate() {
        write_entry(out, idx + 1, entry)?;
    }
    Ok(())
}

fn write_entry(out: &mut impl Write, position: usize, entry: &BookEntry) -> Result<()> {
    let record = &entry.record;
    writeln!(
        out,
        "{position:>3}. {} by {} ({}) [{}] {}",
        record.title,
        record.author,
        record.year,
        record.genre,
        record.status_label()
    )?;
    Ok(())
}
