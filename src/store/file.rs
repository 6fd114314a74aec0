use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result as AnyResult};
use directories::BaseDirs;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{LibraryError, Result};
use crate::models::BookRecord;

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".personal-library";
/// Store file name inside the application data directory.
pub const STORE_FILE_NAME: &str = "library.txt";

/// Resolve `~/.personal-library/library.txt`.
pub fn default_store_path() -> AnyResult<PathBuf> {
    Ok(data_dir()?.join(STORE_FILE_NAME))
}

/// Directory that holds the store and the session log.
pub fn data_dir() -> AnyResult<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Read the record sequence from `path`. A missing file is an empty library;
/// a file that exists but does not parse is `CorruptStore`.
pub fn load(path: &Path) -> Result<Vec<BookRecord>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "no library file yet, starting empty");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(LibraryError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let records: Vec<BookRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            if source.is_io() {
                LibraryError::Read {
                    path: path.to_path_buf(),
                    source: source.into(),
                }
            } else {
                LibraryError::CorruptStore {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

    debug!(path = %path.display(), count = records.len(), "loaded library");
    Ok(records)
}

/// Replace the store file with `records`. The data goes to a temporary file in
/// the same directory first and is renamed over the target once synced, so a
/// reader never observes a half-written library.
pub fn save(path: &Path, records: &[BookRecord]) -> Result<()> {
    write_atomically(path, records).map_err(|source| LibraryError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), count = records.len(), "saved library");
    Ok(())
}

fn write_atomically(path: &Path, records: &[BookRecord]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

/// Move an unreadable store out of the way as `<name>.corrupt` so a fresh
/// library can be started without destroying the old bytes.
pub fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| STORE_FILE_NAME.into());
    name.push(".corrupt");
    let target = path.with_file_name(name);
    fs::rename(path, &target)?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    use super::*;

    fn record(title: &str, second: u32) -> BookRecord {
        BookRecord {
            title: title.into(),
            author: "Author".into(),
            year: 2001,
            genre: "Essay".into(),
            read: second % 2 == 0,
            added_at: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(12, 0, second))
                .unwrap(),
        }
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let dir = tempdir().unwrap();
        let records = load(&dir.path().join("library.txt")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        let records = vec![record("B", 3), record("A", 1), record("C", 2)];

        save(&path, &records).unwrap();
        assert_eq!(load(&path).unwrap(), records);
    }

    #[test]
    fn empty_library_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        save(&path, &[]).unwrap();
        assert_eq!(load(&path).unwrap(), Vec::<BookRecord>::new());
    }

    #[test]
    fn save_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("library.txt");
        save(&path, &[record("A", 0)]).unwrap();
        assert_eq!(load(&path).unwrap().len(), 1);
    }

    #[test]
    fn save_leaves_no_temporary_files_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        save(&path, &[record("A", 0)]).unwrap();
        save(&path, &[record("A", 0), record("B", 1)]).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("library.txt")]);
    }

    #[test]
    fn compact_legacy_file_is_accepted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(
            &path,
            r#"[{"title": "Dune", "author": "Herbert", "year": 1965, "genre": "SciFi", "read": true, "added_date": "2024-05-01 08:00:00"}]"#,
        )
        .unwrap();

        let records = load(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Dune");
        assert!(records[0].read);
    }

    #[test]
    fn garbage_is_reported_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(&path, "{ not json").unwrap();

        match load(&path) {
            Err(LibraryError::CorruptStore { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected corrupt store, got {other:?}"),
        }
    }

    #[test]
    fn unreadable_path_is_a_read_error_not_corruption() {
        let dir = tempdir().unwrap();
        match load(dir.path()) {
            Err(LibraryError::Read { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected read error, got {other:?}"),
        }
    }

    #[test]
    fn wrong_shape_is_reported_as_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(&path, r#"[{"title": "Dune"}]"#).unwrap();
        assert!(matches!(
            load(&path),
            Err(LibraryError::CorruptStore { .. })
        ));
    }

    #[test]
    fn save_into_a_file_path_parent_fails_with_write_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let err = save(&blocker.join("library.txt"), &[]).unwrap_err();
        assert!(matches!(err, LibraryError::Write { .. }));
    }

    #[test]
    fn quarantine_moves_file_aside() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(&path, "garbage").unwrap();

        let moved = quarantine(&path).unwrap();
        assert_eq!(moved, dir.path().join("library.txt.corrupt"));
        assert!(!path.exists());
        assert_eq!(fs::read_to_string(moved).unwrap(), "garbage");
    }
}
