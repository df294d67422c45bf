use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{FileBackend, LoadOutcome, SqliteBackend, StorageBackend};
use crate::config::{AppConfig, StorageKind};
use crate::error::Result;
use crate::models::{Book, BookId, Preferences, ReadingStatus};

/// Key holding the serialized book collection.
pub const BOOKS_KEY: &str = "bibler.books.v1";
/// Key holding the serialized display preferences.
pub const SETTINGS_KEY: &str = "bibler.settings.v1";

/// Typed snapshot store over a [`StorageBackend`].
///
/// Loads always produce a usable value: a missing books snapshot yields
/// the starter collection, a missing settings snapshot yields defaults,
/// and an unreadable snapshot of either kind is logged and replaced in
/// memory, to be overwritten by the next save. Saves are best-effort;
/// a failed write is logged and the in-memory state stays authoritative
/// for the rest of the session.
pub struct Store {
    backend: Box<dyn StorageBackend>,
}

impl Store {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
        }
    }

    /// Picks the backend named by the config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(match config.storage.backend {
            StorageKind::File => Self::new(FileBackend::new(config.store_dir())),
            StorageKind::Sqlite => Self::new(SqliteBackend::open(&config.database_path())?),
        })
    }

    /// The stored collection, or the starter collection stamped around
    /// `now_ms` when nothing usable is stored.
    pub fn load_books(&self, now_ms: i64) -> Vec<Book> {
        self.load_json(BOOKS_KEY)
            .unwrap_or_else(|| seed_books(now_ms))
    }

    /// The stored preferences, or defaults when nothing usable is stored.
    pub fn load_preferences(&self) -> Preferences {
        self.load_json(SETTINGS_KEY).unwrap_or_else(Preferences::default)
    }

    pub fn save_books(&self, books: &[Book]) {
        self.save_json(BOOKS_KEY, &books);
    }

    pub fn save_preferences(&self, preferences: &Preferences) {
        self.save_json(SETTINGS_KEY, preferences);
    }

    /// Reads and parses one snapshot, classifying the result.
    pub fn load_json<T: DeserializeOwned>(&self, key: &str) -> LoadOutcome<T> {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no snapshot under {key}, starting fresh");
                return LoadOutcome::Absent;
            }
            Err(e) => {
                warn!("failed to read snapshot {key}: {e}");
                return LoadOutcome::Corrupted;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => LoadOutcome::Loaded(value),
            Err(e) => {
                warn!("discarding corrupt snapshot {key}: {e}");
                LoadOutcome::Corrupted
            }
        }
    }

    /// Serializes and writes one snapshot, swallowing failures.
    pub fn save_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            warn!("failed to persist snapshot {key}: {e}");
        }
    }

    fn try_save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.backend.write(key, &json)
    }
}

/// The three-book collection a first run starts from.
pub fn seed_books(now_ms: i64) -> Vec<Book> {
    fn entry(
        id: BookId,
        title: &str,
        author: &str,
        status: ReadingStatus,
        cover: &str,
        added_at: i64,
        rating: u8,
    ) -> Book {
        Book {
            id,
            title: title.to_string(),
            author: author.to_string(),
            status,
            cover: cover.to_string(),
            added_at: Some(added_at),
            rating,
            review: None,
            audio_review: None,
        }
    }

    vec![
        entry(
            1,
            "1984",
            "George Orwell",
            ReadingStatus::Finished,
            "https://covers.openlibrary.org/b/id/10521279-M.jpg",
            now_ms - 3000,
            9,
        ),
        entry(
            2,
            "The Pragmatic Programmer",
            "Andrew Hunt, David Thomas",
            ReadingStatus::Reading,
            "https://covers.openlibrary.org/b/id/12629965-M.jpg",
            now_ms - 2000,
            8,
        ),
        entry(
            3,
            "El nombre de la rosa",
            "Umberto Eco",
            ReadingStatus::ToRead,
            "https://covers.openlibrary.org/b/id/8373226-M.jpg",
            now_ms - 1000,
            0,
        ),
    ]
}
