//! Data models for Shelf
//!
//! Defines the `Book` record stored in the library file, and `NewBook`,
//! the input used to create one.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format of `Book::added_date` as written to the library file
pub const ADDED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Earliest publication year accepted by default
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

/// Genres offered when adding a book.
///
/// The library file accepts any genre text; this list only drives input.
pub const GENRES: &[&str] = &[
    "Fiction",
    "Non-Fiction",
    "Science",
    "Technology",
    "History",
    "Romance",
    "Poetry",
];

/// Genre used when none is given
pub const DEFAULT_GENRE: &str = "Fiction";

/// A book in the library
///
/// Missing numeric and boolean fields default when reading older files,
/// and a fresh `id` is generated for entries written without one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Stable identifier, assigned at creation
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub publication_year: i32,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub read_status: bool,
    /// Set once at creation, never modified
    #[serde(default)]
    added_date: String,
}

impl Book {
    /// Create a book from input, stamping it with a new id and the current time
    pub fn new(input: NewBook) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            author: input.author,
            publication_year: input.publication_year,
            genre: input.genre,
            read_status: input.read_status,
            added_date: Local::now().format(ADDED_DATE_FORMAT).to_string(),
        }
    }

    /// When this book was added, as stored
    pub fn added_date(&self) -> &str {
        &self.added_date
    }

    /// Parsed `added_date`, or `None` if the stored text is not in the expected format
    pub fn added_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.added_date, ADDED_DATE_FORMAT).ok()
    }

    /// The decade bucket of the publication year (1965 -> 1960)
    ///
    /// Widened to `i64` so years near `i32::MIN` cannot overflow.
    pub fn decade(&self) -> i64 {
        i64::from(self.publication_year).div_euclid(10) * 10
    }

    /// Flip the read status, returning the new value
    pub fn toggle_read(&mut self) -> bool {
        self.read_status = !self.read_status;
        self.read_status
    }

    /// Short form of the id used for display and prefix lookups
    pub fn short_id(&self) -> String {
        self.id.to_string()[..8].to_string()
    }
}

/// Input for adding a book to the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub genre: String,
    pub read_status: bool,
}

impl NewBook {
    /// Create input with the default genre, marked unread
    pub fn new(title: impl Into<String>, author: impl Into<String>, publication_year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            publication_year,
            genre: DEFAULT_GENRE.to_string(),
            read_status: false,
        }
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn read(mut self, read_status: bool) -> Self {
        self.read_status = read_status;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_book_new() {
        let book = Book::new(NewBook::new("Dune", "Herbert", 1965).genre("Science"));
        assert_eq!(book.title, "Dune");
        assert_eq!(book.author, "Herbert");
        assert_eq!(book.publication_year, 1965);
        assert_eq!(book.genre, "Science");
        assert!(!book.read_status);
        assert!(book.added_at().is_some());
    }

    #[test]
    fn test_new_book_defaults() {
        let input = NewBook::new("Dune", "Herbert", 1965);
        assert_eq!(input.genre, DEFAULT_GENRE);
        assert!(!input.read_status);
        assert!(input.read(true).read_status);
    }

    #[test]
    fn test_unique_ids() {
        let a = Book::new(NewBook::new("Dune", "Herbert", 1965));
        let b = Book::new(NewBook::new("Dune", "Herbert", 1965));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_decade() {
        let mut book = Book::new(NewBook::new("Dune", "Herbert", 1965));
        assert_eq!(book.decade(), 1960);
        book.publication_year = 1950;
        assert_eq!(book.decade(), 1950);
        book.publication_year = 2009;
        assert_eq!(book.decade(), 2000);
        book.publication_year = -5;
        assert_eq!(book.decade(), -10);
        book.publication_year = i32::MIN;
        assert_eq!(book.decade(), -2_147_483_650);
    }

    #[test]
    fn test_toggle_read() {
        let mut book = Book::new(NewBook::new("Dune", "Herbert", 1965));
        assert!(book.toggle_read());
        assert!(!book.toggle_read());
        assert!(!book.read_status);
    }

    #[test]
    fn test_short_id() {
        let book = Book::new(NewBook::new("Dune", "Herbert", 1965));
        assert_eq!(book.short_id().len(), 8);
        assert!(book.id.to_string().starts_with(&book.short_id()));
    }

    #[test]
    fn test_serialized_keys() {
        let book = Book::new(NewBook::new("Dune", "Herbert", 1965).read(true));
        let value = serde_json::to_value(&book).unwrap();
        for key in [
            "id",
            "title",
            "author",
            "publication_year",
            "genre",
            "read_status",
            "added_date",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["read_status"], true);
    }

    #[test]
    fn test_permissive_deserialization() {
        let json = r#"{"title": "Dune", "author": "Herbert"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.publication_year, 0);
        assert_eq!(book.genre, "");
        assert!(!book.read_status);
        assert_eq!(book.added_date(), "");
        assert!(book.added_at().is_none());
    }

    #[test]
    fn test_missing_title_is_rejected() {
        let json = r#"{"author": "Herbert", "publication_year": 1965}"#;
        assert!(serde_json::from_str::<Book>(json).is_err());
    }

    #[test]
    fn test_legacy_record_keeps_added_date() {
        let json = r#"{
            "title": "Foundation",
            "author": "Asimov",
            "publication_year": 1951,
            "genre": "Science",
            "read_status": true,
            "added_date": "2024-03-01 12:30:00"
        }"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.added_date(), "2024-03-01 12:30:00");
        let parsed = book.added_at().unwrap();
        assert_eq!(parsed.format("%Y").to_string(), "2024");
    }
}
