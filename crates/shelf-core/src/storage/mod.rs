//! Storage layer
//!
//! The whole library lives in a single JSON file, rewritten in full on
//! every change.
//!
//! - `persistence`: reading, writing and recovering the library file
//! - `error`: typed storage errors with recovery suggestions

pub mod error;
pub mod persistence;

pub use error::{StorageError, StorageResult};
pub use persistence::{InitOutcome, LibraryFile, LoadOutcome};
