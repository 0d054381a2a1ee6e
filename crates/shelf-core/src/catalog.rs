//! The in-memory library
//!
//! `Catalog` owns the ordered list of books and the file they are saved
//! to. Every mutation rewrites the whole file before returning.
//!
//! ## Usage
//!
//! ```ignore
//! let mut catalog = Catalog::open(&config);
//!
//! let book = catalog.add(NewBook::new("Dune", "Herbert", 1965))?;
//! catalog.toggle_read(book.id)?;
//!
//! let hits = catalog.search("dune", SearchField::Title);
//! let stats = catalog.statistics();
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Book, NewBook};
use crate::stats::LibraryStats;
use crate::storage::{InitOutcome, LibraryFile, StorageError};

/// Book field that `Catalog::search` matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Genre,
}

impl SearchField {
    pub const ALL: [SearchField; 3] = [SearchField::Title, SearchField::Author, SearchField::Genre];

    /// The text of this field on `book`
    pub fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SearchField::Title => &book.title,
            SearchField::Author => &book.author,
            SearchField::Genre => &book.genre,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Genre => "genre",
        }
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "genre" => Ok(SearchField::Genre),
            other => anyhow::bail!(
                "Unknown search field '{}'. Use one of: title, author, genre",
                other
            ),
        }
    }
}

/// The user's library, loaded from and saved to a single JSON file
pub struct Catalog {
    books: Vec<Book>,
    file: LibraryFile,
    /// Problems recovered from while opening
    warnings: Vec<StorageError>,
    /// Set when the file could not be loaded; saving would overwrite it
    read_only: bool,
}

impl Catalog {
    /// Open the library at the configured path
    pub fn open(config: &Config) -> Self {
        Self::open_at(config.library_path())
    }

    /// Open the library file at `path`, creating it if needed
    ///
    /// Never fails: a corrupt file is backed up and reset, and an
    /// unreadable one yields an empty, read-only catalog. Either case is
    /// recorded in `warnings()`.
    pub fn open_at(path: impl Into<PathBuf>) -> Self {
        let file = LibraryFile::new(path);
        let mut warnings = Vec::new();

        match file.initialize() {
            Ok(InitOutcome::Reset {
                backup_path,
                details,
            }) => warnings.push(StorageError::CorruptDocument {
                path: file.path().to_path_buf(),
                backup_path,
                details,
            }),
            Ok(_) => {}
            Err(err) => {
                warn!("Failed to initialize library: {}", err);
                warnings.push(err);
            }
        }

        let outcome = file.load_or_empty();
        let load_failed = outcome.error.is_some();
        warnings.extend(outcome.error);

        let mut catalog = Self {
            books: outcome.books,
            file,
            warnings,
            read_only: load_failed,
        };

        // Persist ids assigned to entries from older files so they stay stable
        if outcome.missing_ids > 0 && !load_failed {
            info!("Assigned ids to {} book(s)", outcome.missing_ids);
            if let Err(err) = catalog.file.save(&catalog.books) {
                warn!("Failed to persist assigned ids: {}", err);
                catalog.warnings.push(err);
            }
        }

        catalog
    }

    /// Problems encountered while opening the library
    pub fn warnings(&self) -> &[StorageError] {
        &self.warnings
    }

    /// Whether mutations are refused because the library failed to load
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The underlying library file
    pub fn file(&self) -> &LibraryFile {
        &self.file
    }

    /// All books in display order
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Get a book by id
    pub fn get(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Position of a book in display order
    pub fn position(&self, id: Uuid) -> Option<usize> {
        self.books.iter().position(|b| b.id == id)
    }

    /// Books whose id starts with `prefix`
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<&Book> {
        let prefix = prefix.to_lowercase();
        self.books
            .iter()
            .filter(|b| b.id.to_string().starts_with(&prefix))
            .collect()
    }

    // ==================== Mutations ====================

    /// Append a new book and save
    ///
    /// Inputs are stored as given; validation belongs to the caller.
    pub fn add(&mut self, input: NewBook) -> Result<Book> {
        let book = Book::new(input);
        info!("Adding book {} ({})", book.id, book.title);
        self.books.push(book.clone());
        self.save().context("Failed to save after adding book")?;
        Ok(book)
    }

    /// Remove a book by id
    ///
    /// Returns `None` without saving when no book has that id.
    pub fn remove(&mut self, id: Uuid) -> Result<Option<Book>> {
        match self.position(id) {
            Some(index) => self.remove_at(index),
            None => Ok(None),
        }
    }

    /// Remove the book at `index` in display order
    ///
    /// Out-of-range indices are ignored. Indices of later books shift
    /// down by one, so positions captured before this call go stale.
    pub fn remove_at(&mut self, index: usize) -> Result<Option<Book>> {
        if index >= self.books.len() {
            return Ok(None);
        }
        let removed = self.books.remove(index);
        info!("Removed book {} ({})", removed.id, removed.title);
        self.save().context("Failed to save after removing book")?;
        Ok(Some(removed))
    }

    /// Flip the read status of a book by id, returning the new status
    pub fn toggle_read(&mut self, id: Uuid) -> Result<Option<bool>> {
        match self.position(id) {
            Some(index) => self.toggle_read_at(index),
            None => Ok(None),
        }
    }

    /// Flip the read status of the book at `index`; out-of-range is ignored
    pub fn toggle_read_at(&mut self, index: usize) -> Result<Option<bool>> {
        let Some(book) = self.books.get_mut(index) else {
            return Ok(None);
        };
        let status = book.toggle_read();
        info!("Marked book {} as {}", book.id, if status { "read" } else { "unread" });
        self.save().context("Failed to save after toggling read status")?;
        Ok(Some(status))
    }

    /// Write the whole collection to disk
    ///
    /// On failure the in-memory collection keeps its changes.
    pub fn save(&self) -> Result<()> {
        if self.read_only {
            anyhow::bail!(
                "Library at {:?} could not be loaded; refusing to overwrite it",
                self.file.path()
            );
        }
        self.file
            .save(&self.books)
            .with_context(|| format!("Failed to save library to {:?}", self.file.path()))
    }

    // ==================== Queries ====================

    /// Case-insensitive substring search on one field, in display order
    ///
    /// An empty term matches nothing.
    pub fn search(&self, term: &str, field: SearchField) -> Vec<&Book> {
        if term.is_empty() {
            return Vec::new();
        }
        let term = term.to_lowercase();
        self.books
            .iter()
            .filter(|b| field.value(b).to_lowercase().contains(&term))
            .collect()
    }

    /// Aggregate counts over the whole library
    pub fn statistics(&self) -> LibraryStats {
        LibraryStats::from_books(&self.books)
    }
}
