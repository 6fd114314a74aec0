//! Domain models shared by the store, the statistics functions and the TUI.
//! `BookRecord` is the unit that gets written to disk; `BookEntry` pairs it
//! with the session-local id the rest of the program uses to address it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Smallest publication year the store accepts.
pub const MIN_YEAR: i32 = 1000;

static NEXT_BOOK_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique handle for a catalogued book. Ids are handed out when a
/// record enters the store (either through `add` or while loading) and are
/// never written to disk, so they only stay meaningful for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BookId(u64);

impl BookId {
    pub(crate) fn next() -> Self {
        Self(NEXT_BOOK_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One catalogued book exactly as it appears in the store file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
    pub read: bool,
    /// Creation time with second precision. Serialized as `added_date`.
    #[serde(rename = "added_date", with = "added_date")]
    pub added_at: NaiveDateTime,
}

impl BookRecord {
    /// `Title - Author (Year)`, used by confirmation dialogs and CLI output.
    pub fn display_title(&self) -> String {
        format!("{} - {} ({})", self.title, self.author, self.year)
    }

    pub fn status_label(&self) -> &'static str {
        if self.read {
            "Read"
        } else {
            "Unread"
        }
    }
}

impl fmt::Display for BookRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// A record together with the id the store assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookEntry {
    pub id: BookId,
    pub record: BookRecord,
}

impl BookEntry {
    pub(crate) fn new(record: BookRecord) -> Self {
        Self {
            id: BookId::next(),
            record,
        }
    }
}

/// Fields a caller can get wrong when adding a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Year,
    Genre,
}

impl BookField {
    pub fn as_str(self) -> &'static str {
        match self {
            BookField::Title => "title",
            BookField::Author => "author",
            BookField::Year => "year",
            BookField::Genre => "genre",
        }
    }
}

impl fmt::Display for BookField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `YYYY-MM-DD HH:MM:SS` encoding for the `added_date` field.
pub(crate) mod added_date {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(crate) const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub(crate) fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;

    fn dune() -> BookRecord {
        BookRecord {
            title: "Dune".into(),
            author: "Herbert".into(),
            year: 1965,
            genre: "SciFi".into(),
            read: false,
            added_at: NaiveDate::from_ymd_opt(2024, 3, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 5))
                .unwrap(),
        }
    }

    #[test]
    fn record_serializes_with_store_field_names() {
        let json = serde_json::to_value(dune()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "title": "Dune",
                "author": "Herbert",
                "year": 1965,
                "genre": "SciFi",
                "read": false,
                "added_date": "2024-03-01 09:30:05",
            })
        );
    }

    #[test]
    fn malformed_added_date_is_rejected() {
        let raw = r#"{"title":"Dune","author":"Herbert","year":1965,"genre":"SciFi","read":false,"added_date":"March 1st"}"#;
        assert!(serde_json::from_str::<BookRecord>(raw).is_err());
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let first = BookId::next();
        let second = BookId::next();
        assert!(second > first);
    }

    #[test]
    fn display_title_includes_author_and_year() {
        assert_eq!(dune().display_title(), "Dune - Herbert (1965)");
        assert_eq!(dune().status_label(), "Unread");
    }
}
