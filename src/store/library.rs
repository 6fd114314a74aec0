use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, NaiveDateTime, Timelike};
use tracing::warn;

use crate::error::{LibraryError, Result};
use crate::models::{BookEntry, BookField, BookId, BookRecord, MIN_YEAR};
use crate::stats::{self, GrowthPoint, Summary};

use super::file;

/// Source of "now" for record timestamps and the upper year bound.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in local time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// The in-memory library plus the file it mirrors. Every successful mutation
/// rewrites the whole file; memory stays authoritative when that write fails.
pub struct Library {
    path: PathBuf,
    entries: Vec<BookEntry>,
    clock: Box<dyn Clock>,
    dirty: bool,
}

impl fmt::Debug for Library {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Library")
            .field("path", &self.path)
            .field("entries", &self.entries)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl Library {
    /// Load the library stored at `path` using the system clock.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_with_clock(path, Box::new(SystemClock))
    }

    pub fn open_with_clock(path: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Result<Self> {
        let path = path.into();
        let entries = file::load(&path)?
            .into_iter()
            .map(BookEntry::new)
            .collect();
        Ok(Self {
            path,
            entries,
            clock,
            dirty: false,
        })
    }

    /// Start an empty library bound to `path` without reading it. Used after
    /// the host decided to discard a corrupt store.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            clock: Box::new(SystemClock),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True when the last write to disk failed and memory holds changes the
    /// file does not.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rewrite the store file with the current contents.
    pub fn save(&mut self) -> Result<()> {
        let records: Vec<BookRecord> = self.records().cloned().collect();
        match file::save(&self.path, &records) {
            Ok(()) => {
                self.dirty = false;
                Ok(())
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "library write failed");
                self.dirty = true;
                Err(err)
            }
        }
    }

    /// Validate and append a new book, then persist. On a write failure the
    /// book stays in memory and the error is returned.
    pub fn add(
        &mut self,
        title: &str,
        author: &str,
        year: i32,
        genre: &str,
        read: bool,
    ) -> Result<BookEntry> {
        let now = self.clock.now();
        let title = required(title, BookField::Title)?;
        let author = required(author, BookField::Author)?;
        if !(MIN_YEAR..=now.year()).contains(&year) {
            return Err(LibraryError::Validation {
                field: BookField::Year,
            });
        }
        let genre = required(genre, BookField::Genre)?;

        let entry = BookEntry::new(BookRecord {
            title,
            author,
            year,
            genre,
            read,
            added_at: now.with_nanosecond(0).unwrap_or(now),
        });
        self.entries.push(entry.clone());
        self.save()?;
        Ok(entry)
    }

    /// Remove the book at `position`, shifting later books down by one.
    pub fn remove(&mut self, position: usize) -> Result<BookEntry> {
        if position >= self.entries.len() {
            return Err(LibraryError::IndexOutOfRange {
                position,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(position);
        self.save()?;
        Ok(removed)
    }

    /// Remove the book with `id`, wherever it currently sits.
    pub fn remove_by_id(&mut self, id: BookId) -> Result<BookEntry> {
        let position = self
            .position_of(id)
            .ok_or(LibraryError::UnknownBook(id))?;
        self.remove(position)
    }

    pub fn list(&self) -> &[BookEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&BookEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn position_of(&self, id: BookId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// Records in insertion order, without their ids.
    pub fn records(&self) -> impl Iterator<Item = &BookRecord> + '_ {
        self.entries.iter().map(|entry| &entry.record)
    }

    /// Case-insensitive substring match on title or author. A blank term
    /// matches nothing.
    pub fn search(&self, term: &str) -> Vec<BookEntry> {
        if term.is_empty() {
            return Vec::new();
        }
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| {
                entry.record.title.to_lowercase().contains(&needle)
                    || entry.record.author.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    pub fn summary(&self) -> Summary {
        stats::summary(self.records())
    }

    pub fn genre_distribution(&self) -> BTreeMap<String, usize> {
        stats::genre_distribution(self.records())
    }

    pub fn growth_series(&self) -> Vec<GrowthPoint> {
        stats::growth_series(self.records())
    }
}

fn required(value: &str, field: BookField) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(LibraryError::Validation { field })
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::fs;
    use std::rc::Rc;

    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    use super::*;

    /// Clock that starts at a fixed instant and advances one second per read.
    struct SteppingClock {
        next: Rc<Cell<NaiveDateTime>>,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> NaiveDateTime {
            let now = self.next.get();
            self.next.set(now + Duration::seconds(1));
            now
        }
    }

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_milli_opt(10, 0, 0, 250))
            .unwrap()
    }

    fn library() -> (TempDir, Library) {
        let dir = tempdir().unwrap();
        let clock = SteppingClock {
            next: Rc::new(Cell::new(start())),
        };
        let library =
            Library::open_with_clock(dir.path().join("library.txt"), Box::new(clock)).unwrap();
        (dir, library)
    }

    fn titles(library: &Library) -> Vec<String> {
        library.records().map(|r| r.title.clone()).collect()
    }

    #[test]
    fn adding_dune_to_an_empty_library() {
        let (_dir, mut library) = library();
        let entry = library
            .add("Dune", "Herbert", 1965, "SciFi", false)
            .unwrap();

        assert_eq!(library.list(), &[entry.clone()]);
        assert_eq!(entry.record.title, "Dune");
        assert_eq!(entry.record.author, "Herbert");
        assert_eq!(entry.record.year, 1965);
        assert!(!entry.record.read);
        assert_eq!(
            library.summary(),
            Summary {
                total: 1,
                read_count: 0,
                unread_count: 1,
                percent_read: 0.0,
            }
        );
    }

    #[test]
    fn add_truncates_timestamp_to_seconds() {
        let (_dir, mut library) = library();
        let entry = library.add("A", "B", 2000, "C", true).unwrap();
        assert_eq!(entry.record.added_at, start().with_nanosecond(0).unwrap());
    }

    #[test]
    fn add_trims_surrounding_whitespace() {
        let (_dir, mut library) = library();
        let entry = library.add("  Dune ", "Herbert\t", 1965, " SciFi", false).unwrap();
        assert_eq!(entry.record.title, "Dune");
        assert_eq!(entry.record.author, "Herbert");
        assert_eq!(entry.record.genre, "SciFi");
    }

    #[test]
    fn empty_title_is_rejected_without_mutation() {
        let (dir, mut library) = library();
        let err = library.add("", "X", 2000, "Y", false).unwrap_err();

        assert_eq!(err.field(), Some(BookField::Title));
        assert!(library.is_empty());
        assert!(!dir.path().join("library.txt").exists());
    }

    #[test]
    fn each_required_field_is_named() {
        let (_dir, mut library) = library();
        let cases = [
            (("T", " ", 2000, "G"), BookField::Author),
            (("T", "A", 2000, ""), BookField::Genre),
            (("T", "A", 999, "G"), BookField::Year),
            (("T", "A", 2026, "G"), BookField::Year),
        ];
        for ((title, author, year, genre), field) in cases {
            let err = library.add(title, author, year, genre, false).unwrap_err();
            assert_eq!(err.field(), Some(field), "{title}/{author}/{year}/{genre}");
        }
        assert!(library.is_empty());
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let (_dir, mut library) = library();
        library.add("Old", "A", MIN_YEAR, "G", false).unwrap();
        library.add("New", "A", 2025, "G", false).unwrap();
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn every_mutation_is_written_through() {
        let (dir, mut library) = library();
        let path = dir.path().join("library.txt");
        library.add("A", "X", 2000, "G", false).unwrap();
        library.add("B", "X", 2000, "G", true).unwrap();
        assert_eq!(file::load(&path).unwrap().len(), 2);

        library.remove(0).unwrap();
        let on_disk = file::load(&path).unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk[0].title, "B");
    }

    #[test]
    fn remove_shifts_later_books_down() {
        let (_dir, mut library) = library();
        for title in ["A", "B", "C", "D"] {
            library.add(title, "X", 2000, "G", false).unwrap();
        }
        let removed = library.remove(1).unwrap();
        assert_eq!(removed.record.title, "B");
        assert_eq!(titles(&library), vec!["A", "C", "D"]);
    }

    #[test]
    fn remove_out_of_range_leaves_library_untouched() {
        let (_dir, mut library) = library();
        library.add("A", "X", 2000, "G", false).unwrap();
        library.add("B", "X", 2000, "G", false).unwrap();

        let err = library.remove(5).unwrap_err();
        assert!(matches!(
            err,
            LibraryError::IndexOutOfRange { position: 5, len: 2 }
        ));
        assert_eq!(titles(&library), vec!["A", "B"]);
    }

    #[test]
    fn removing_last_position_twice_fails_the_second_time() {
        let (_dir, mut library) = library();
        library.add("A", "X", 2000, "G", false).unwrap();
        library.add("B", "X", 2000, "G", false).unwrap();

        library.remove(1).unwrap();
        assert!(matches!(
            library.remove(1),
            Err(LibraryError::IndexOutOfRange { position: 1, len: 1 })
        ));
    }

    #[test]
    fn remove_by_id_survives_earlier_removals() {
        let (_dir, mut library) = library();
        let a = library.add("A", "X", 2000, "G", false).unwrap();
        let b = library.add("B", "X", 2000, "G", false).unwrap();
        let c = library.add("C", "X", 2000, "G", false).unwrap();

        library.remove_by_id(a.id).unwrap();
        assert_eq!(library.position_of(c.id), Some(1));
        let removed = library.remove_by_id(c.id).unwrap();
        assert_eq!(removed, c);
        assert_eq!(library.list(), &[b]);

        assert!(matches!(
            library.remove_by_id(a.id),
            Err(LibraryError::UnknownBook(id)) if id == a.id
        ));
    }

    #[test]
    fn search_matches_title_or_author_case_insensitively() {
        let (_dir, mut library) = library();
        library.add("Dune", "Frank Herbert", 1965, "SciFi", false).unwrap();
        library.add("Emma", "Jane Austen", 1815, "Romance", true).unwrap();
        library.add("Children of Dune", "Frank Herbert", 1976, "SciFi", false).unwrap();

        let hits: Vec<_> = library.search("DUNE").into_iter().map(|e| e.record.title).collect();
        assert_eq!(hits, vec!["Dune", "Children of Dune"]);

        let hits: Vec<_> = library.search("austen").into_iter().map(|e| e.record.title).collect();
        assert_eq!(hits, vec!["Emma"]);

        assert!(library.search("").is_empty());
        assert!(library.search("tolkien").is_empty());
    }

    #[test]
    fn reopening_yields_the_same_records() {
        let (dir, mut library) = library();
        library.add("A", "X", 1999, "G", true).unwrap();
        library.add("B", "Y", 2001, "H", false).unwrap();

        let reopened = Library::open(dir.path().join("library.txt")).unwrap();
        let before: Vec<_> = library.records().cloned().collect();
        let after: Vec<_> = reopened.records().cloned().collect();
        assert_eq!(after, before);
    }

    #[test]
    fn failed_write_keeps_memory_and_marks_dirty() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let mut library = Library::empty(blocker.join("library.txt"));

        let err = library.add("A", "X", 2000, "G", false).unwrap_err();
        assert!(matches!(err, LibraryError::Write { .. }));
        assert_eq!(library.len(), 1);
        assert!(library.is_dirty());

        fs::remove_file(&blocker).unwrap();
        library.save().unwrap();
        assert!(!library.is_dirty());
        assert_eq!(file::load(library.path()).unwrap().len(), 1);
    }

    #[test]
    fn corrupt_file_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("library.txt");
        fs::write(&path, "[oops").unwrap();
        assert!(matches!(
            Library::open(&path),
            Err(LibraryError::CorruptStore { .. })
        ));
    }
}
