pub mod config;
pub mod error;
pub mod library;
pub mod media;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod storage;
pub mod view;

pub use config::{AppConfig, CatalogConfig, StorageConfig, StorageKind};
pub use error::{BiblerError, Result};
pub use models::*;

pub use library::{Library, MAX_REVIEW_LEN, Notice};
pub use media::{
    AudioClip, AudioClipStore, FsAudioStore, MemoryAudioStore, audio_id, export_file_name,
};
pub use migrate::backfill_added_at;
pub use normalize::{normalize, slug};
pub use storage::{
    BOOKS_KEY, FileBackend, LoadOutcome, MemoryBackend, SETTINGS_KEY, SqliteBackend,
    StorageBackend, Store, seed_books,
};
pub use view::visible_books;
