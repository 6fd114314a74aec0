use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{BookField, BookId};

/// Everything the record store can report back to its caller. None of these
/// are retried or swallowed internally.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("{field} is missing or invalid")]
    Validation { field: BookField },

    #[error("no book at position {position} (library holds {len})")]
    IndexOutOfRange { position: usize, len: usize },

    #[error("book {0} is not in the library")]
    UnknownBook(BookId),

    #[error("failed to write library to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read library from {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("library file {} is corrupt", path.display())]
    CorruptStore {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl LibraryError {
    /// The offending field for validation failures.
    pub fn field(&self) -> Option<BookField> {
        match self {
            LibraryError::Validation { field } => Some(*field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
