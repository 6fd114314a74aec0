//! Core library surface for the personal library manager.
//!
//! `store` owns the book list and its file, `stats` derives aggregates from
//! it, and `ui`/`cli` are the two front-ends the binary can start.
pub mod cli;
pub mod error;
pub mod models;
pub mod stats;
pub mod store;
pub mod ui;

/// Typed failures reported by the record store.
pub use error::{LibraryError, Result};

/// Domain types other layers manipulate.
pub use models::{BookEntry, BookField, BookId, BookRecord};

/// The store object and its clock seam.
pub use store::{default_store_path, Clock, Library, SystemClock};

/// Aggregates over a library snapshot.
pub use stats::{GrowthPoint, Summary};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
