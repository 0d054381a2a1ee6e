//! Library file persistence
//!
//! Reads and writes the whole book collection as one JSON array.
//! Uses atomic writes (write to temp file, then rename) so the file is
//! never left partially written.
//!
//! Storage location: `~/.local/share/shelf/library.json` (configurable via `Config`)

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use tracing::{debug, warn};

use super::error::{StorageError, StorageResult};
use crate::models::Book;

/// Contents written to a fresh or reset library file
const EMPTY_LIBRARY: &[u8] = b"[]";

/// Numbered backup names tried per second before giving up
const MAX_BACKUP_ATTEMPTS: u32 = 1000;

/// What `LibraryFile::initialize` found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// File was absent or empty and an empty library was written
    Created,
    /// File already held a valid library
    Existing,
    /// File could not be parsed; it was copied to `backup_path` and reset
    Reset {
        backup_path: PathBuf,
        details: String,
    },
}

/// Result of a lossy load
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Books read from disk, empty on failure
    pub books: Vec<Book>,
    /// Number of entries that had no `id` and were assigned one
    pub missing_ids: usize,
    /// The failure, if reading or parsing did not succeed
    pub error: Option<StorageError>,
}

/// The JSON document holding the library
#[derive(Debug, Clone)]
pub struct LibraryFile {
    path: PathBuf,
}

impl LibraryFile {
    /// Create a handle for the library file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the library file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if the library file exists on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Size of the library file in bytes, 0 if absent
    pub fn size_on_disk(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Make sure the file holds a valid library
    ///
    /// An absent or empty file gets an empty array. A file that does not
    /// parse as a list of books is copied aside and then reset.
    pub fn initialize(&self) -> StorageResult<InitOutcome> {
        let is_empty = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(StorageError::from_read(e, self.path.clone())),
        };

        if is_empty {
            debug!("Creating empty library at {:?}", self.path);
            atomic_write(&self.path, EMPTY_LIBRARY)?;
            return Ok(InitOutcome::Created);
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::from_read(e, self.path.clone()))?;

        match parse_books(&self.path, &content) {
            Ok(_) => Ok(InitOutcome::Existing),
            Err(err) => {
                let details = match err {
                    StorageError::InvalidFormat { details, .. } => details,
                    other => other.to_string(),
                };
                let backup_path = self.write_backup(content.as_bytes())?;
                atomic_write(&self.path, EMPTY_LIBRARY)?;

                warn!(
                    "Library at {:?} was corrupted ({}); backed up to {:?} and reset",
                    self.path, details, backup_path
                );
                Ok(InitOutcome::Reset {
                    backup_path,
                    details,
                })
            }
        }
    }

    /// Read and parse the library
    pub fn load(&self) -> StorageResult<Vec<Book>> {
        self.read_books().map(|(books, _)| books)
    }

    /// Read the library, degrading to an empty list on any failure
    pub fn load_or_empty(&self) -> LoadOutcome {
        match self.read_books() {
            Ok((books, missing_ids)) => LoadOutcome {
                books,
                missing_ids,
                error: None,
            },
            Err(err) => {
                warn!("Failed to load library: {}", err);
                LoadOutcome {
                    error: Some(err),
                    ..LoadOutcome::default()
                }
            }
        }
    }

    /// Overwrite the library with `books`
    ///
    /// Written with four-space indentation.
    pub fn save(&self, books: &[Book]) -> StorageResult<()> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        books.serialize(&mut ser)?;

        atomic_write(&self.path, &buf)?;
        debug!("Saved {} book(s) to {:?}", books.len(), self.path);
        Ok(())
    }

    fn read_books(&self) -> StorageResult<(Vec<Book>, usize)> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::from_read(e, self.path.clone()))?;
        let parsed = parse_books(&self.path, &content)?;
        debug!("Loaded {} book(s) from {:?}", parsed.0.len(), self.path);
        Ok(parsed)
    }

    /// Copy `content` to a backup file that did not exist before
    ///
    /// Named `library.json.corrupt-<timestamp>.bak`; a numbered suffix is
    /// added when that name is already taken.
    fn write_backup(&self, content: &[u8]) -> StorageResult<PathBuf> {
        let stamp = Local::now().format("%Y%m%d-%H%M%S").to_string();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "library.json".to_string());

        for attempt in 0..MAX_BACKUP_ATTEMPTS {
            let file_name = match attempt {
                0 => format!("{}.corrupt-{}.bak", name, stamp),
                n => format!("{}.corrupt-{}-{}.bak", name, stamp, n),
            };
            let backup_path = self.path.with_file_name(file_name);

            let mut file = match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&backup_path)
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(StorageError::from_io(e, backup_path)),
            };
            file.write_all(content)
                .and_then(|()| file.sync_all())
                .map_err(|e| StorageError::from_io(e, backup_path.clone()))?;
            return Ok(backup_path);
        }

        let exhausted = io::Error::new(
            io::ErrorKind::AlreadyExists,
            "no free backup name for this second",
        );
        Err(StorageError::from_io(
            exhausted,
            self.path.with_file_name(format!("{}.corrupt-{}.bak", name, stamp)),
        ))
    }
}

/// Parse a JSON array of books, counting entries written without an `id`
fn parse_books(path: &Path, content: &str) -> StorageResult<(Vec<Book>, usize)> {
    let invalid = |details: String| StorageError::InvalidFormat {
        path: path.to_path_buf(),
        details,
    };

    let value: Value = serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;
    let entries = value
        .as_array()
        .ok_or_else(|| invalid("top-level value is not an array".to_string()))?;
    let missing_ids = entries.iter().filter(|e| e.get("id").is_none()).count();

    let books: Vec<Book> = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
    Ok((books, missing_ids))
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
fn atomic_write(path: &Path, data: &[u8]) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StorageError::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    let temp_path = temp_path_for(path);

    let mut file =
        File::create(&temp_path).map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.write_all(data)
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;
    file.sync_all()
        .map_err(|e| StorageError::from_io(e, temp_path.clone()))?;

    fs::rename(&temp_path, path).map_err(|e| StorageError::AtomicWriteFailed {
        from: temp_path.clone(),
        to: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

/// `library.json` -> `library.json.tmp`, in the same directory so the
/// rename stays on one filesystem
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("library"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewBook;
    use tempfile::TempDir;

    fn library_in(temp_dir: &TempDir) -> LibraryFile {
        LibraryFile::new(temp_dir.path().join("library.json"))
    }

    fn sample_books() -> Vec<Book> {
        vec![
            Book::new(NewBook::new("Dune", "Herbert", 1965).genre("Science")),
            Book::new(
                NewBook::new("Foundation", "Asimov", 1951)
                    .genre("Science")
                    .read(true),
            ),
        ]
    }

    #[test]
    fn test_initialize_creates_empty_library() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        assert!(!file.exists());

        assert_eq!(file.initialize().unwrap(), InitOutcome::Created);
        assert!(file.exists());
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "[]");
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_fills_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        fs::write(file.path(), "").unwrap();

        assert_eq!(file.initialize().unwrap(), InitOutcome::Created);
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "[]");
    }

    #[test]
    fn test_initialize_keeps_valid_library() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        let books = sample_books();
        file.save(&books).unwrap();

        assert_eq!(file.initialize().unwrap(), InitOutcome::Existing);
        assert_eq!(file.load().unwrap(), books);
    }

    #[test]
    fn test_initialize_backs_up_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        fs::write(file.path(), "{not json").unwrap();

        let outcome = file.initialize().unwrap();
        let backup_path = match outcome {
            InitOutcome::Reset { backup_path, .. } => backup_path,
            other => panic!("expected reset, got {:?}", other),
        };

        assert_eq!(fs::read_to_string(&backup_path).unwrap(), "{not json");
        assert!(backup_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("library.json.corrupt-"));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_initialize_resets_non_array() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        fs::write(file.path(), r#"{"title": "Dune"}"#).unwrap();

        assert!(matches!(
            file.initialize().unwrap(),
            InitOutcome::Reset { .. }
        ));
        assert!(file.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        let books = sample_books();

        file.save(&books).unwrap();
        let loaded = file.load().unwrap();

        assert_eq!(loaded, books);
    }

    #[test]
    fn test_save_load_save_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);

        file.save(&sample_books()).unwrap();
        let first = fs::read_to_string(file.path()).unwrap();

        let loaded = file.load().unwrap();
        file.save(&loaded).unwrap();
        let second = fs::read_to_string(file.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_save_uses_four_space_indent() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        file.save(&sample_books()).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("[\n    {\n        \""));
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);

        assert!(matches!(file.load(), Err(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_load_or_empty_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        fs::write(file.path(), "[{\"title\": 1}]").unwrap();

        let outcome = file.load_or_empty();
        assert!(outcome.books.is_empty());
        assert!(matches!(
            outcome.error,
            Some(StorageError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_load_counts_missing_ids() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        fs::write(
            file.path(),
            r#"[
                {"title": "Dune", "author": "Herbert", "publication_year": 1965,
                 "genre": "Science", "read_status": false, "added_date": "2024-01-01 10:00:00"},
                {"id": "67e55044-10b1-426f-9247-bb680e5fe0c8", "title": "Emma", "author": "Austen"}
            ]"#,
        )
        .unwrap();

        let outcome = file.load_or_empty();
        assert!(outcome.error.is_none());
        assert_eq!(outcome.books.len(), 2);
        assert_eq!(outcome.missing_ids, 1);
        assert_eq!(
            outcome.books[1].id.to_string(),
            "67e55044-10b1-426f-9247-bb680e5fe0c8"
        );
    }

    #[test]
    fn test_size_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);
        assert_eq!(file.size_on_disk(), 0);

        file.save(&sample_books()).unwrap();
        assert!(file.size_on_disk() > 0);
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir
            .path()
            .join("a")
            .join("b")
            .join("library.json");

        atomic_write(&nested_path, b"[]").unwrap();

        assert!(nested_path.exists());
        assert!(!temp_path_for(&nested_path).exists());
        assert_eq!(fs::read_to_string(&nested_path).unwrap(), "[]");
    }

    #[test]
    fn test_initialize_twice_keeps_both_backups() {
        let temp_dir = TempDir::new().unwrap();
        let file = library_in(&temp_dir);

        let mut backups = Vec::new();
        for content in ["first corrupt", "second corrupt"] {
            fs::write(file.path(), content).unwrap();
            match file.initialize().unwrap() {
                InitOutcome::Reset { backup_path, .. } => backups.push(backup_path),
                other => panic!("expected reset, got {:?}", other),
            }
        }

        assert_ne!(backups[0], backups[1]);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "first corrupt");
        assert_eq!(fs::read_to_string(&backups[1]).unwrap(), "second corrupt");
    }

    #[test]
    fn test_temp_path_appends_to_full_name() {
        let dir = Path::new("/data");
        assert_eq!(
            temp_path_for(&dir.join("library.json")),
            dir.join("library.json.tmp")
        );
        assert_eq!(temp_path_for(&dir.join("a.tmp")), dir.join("a.tmp.tmp"));
        assert_ne!(
            temp_path_for(&dir.join("a.json")),
            temp_path_for(&dir.join("a.bak"))
        );
    }

    #[test]
    fn test_save_to_tmp_named_library() {
        let temp_dir = TempDir::new().unwrap();
        let file = LibraryFile::new(temp_dir.path().join("library.tmp"));
        let books = sample_books();

        file.save(&books).unwrap();
        assert_eq!(file.load().unwrap(), books);
        assert!(!temp_dir.path().join("library.tmp.tmp").exists());
    }
}
