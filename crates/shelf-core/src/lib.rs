//! Shelf Core Library
//!
//! This crate provides the core functionality for Shelf, a personal
//! library tracker: a list of books kept in a single JSON file.
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let mut catalog = Catalog::open(&config);
//!
//! // Add a book
//! let book = catalog.add(NewBook::new("Dune", "Frank Herbert", 1965).genre("Science"))?;
//!
//! // Query
//! let hits = catalog.search("herbert", SearchField::Author);
//! let stats = catalog.statistics();
//! ```
//!
//! # Modules
//!
//! - `catalog`: In-memory library with mutations and queries (main entry point)
//! - `models`: The `Book` record
//! - `stats`: Aggregate statistics
//! - `storage`: JSON file persistence
//! - `config`: Application configuration

pub mod catalog;
pub mod config;
pub mod models;
pub mod stats;
pub mod storage;

pub use catalog::{Catalog, SearchField};
pub use config::Config;
pub use models::{Book, NewBook, DEFAULT_GENRE, GENRES, MIN_PUBLICATION_YEAR};
pub use stats::LibraryStats;
pub use storage::{InitOutcome, LibraryFile, LoadOutcome, StorageError, StorageResult};
