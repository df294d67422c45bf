//! Snapshot persistence for the collection and its settings.
//!
//! Backends store opaque strings under versioned keys; [`Store`] layers
//! JSON and the seed/default policy on top. The application writes the
//! whole snapshot after every mutation and re-reads it only at startup.

mod file;
mod memory;
mod sqlite;
mod store;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use store::{BOOKS_KEY, SETTINGS_KEY, Store, seed_books};

use crate::error::Result;

/// A keyed blob store. Implementations persist exactly what they are
/// handed and report `None` for keys never written.
pub trait StorageBackend {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// What a typed snapshot read produced. Resolved once at the load
/// boundary; everything past it works with a plain value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome<T> {
    /// A snapshot was present and parsed.
    Loaded(T),
    /// Nothing stored under the key yet.
    Absent,
    /// Present but unreadable; the next save overwrites it.
    Corrupted,
}

impl<T> LoadOutcome<T> {
    /// The parsed value, or `fallback` for both the first-run and the
    /// corrupt-snapshot case.
    pub fn unwrap_or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Loaded(value) => value,
            Self::Absent | Self::Corrupted => fallback(),
        }
    }
}
