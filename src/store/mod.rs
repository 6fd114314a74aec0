//! Record store: the in-memory library and the JSON file it mirrors.

mod file;
mod library;

pub use file::{data_dir, default_store_path, load, quarantine, save, DATA_DIR_NAME, STORE_FILE_NAME};
pub use library::{Clock, Library, SystemClock};
