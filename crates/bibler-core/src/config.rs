use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Root application configuration, loaded from `~/.config/bibler/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub backend: StorageKind,
}

/// Which backend holds the persisted snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    File,
    Sqlite,
}

/// Settings for the metadata lookups done while adding a book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub suggest_limit: usize,
    pub open_library_base_url: String,
    pub google_books_base_url: String,
    pub covers_base_url: String,
    pub google_books_api_key_env: String,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("bibler");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
            backend: StorageKind::File,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            suggest_limit: 5,
            open_library_base_url: "https://openlibrary.org".to_string(),
            google_books_base_url: "https://www.googleapis.com/books/v1".to_string(),
            covers_base_url: "https://covers.openlibrary.org".to_string(),
            google_books_api_key_env: "BIBLER_GOOGLE_BOOKS_KEY".to_string(),
        }
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path: `~/.config/bibler/config.toml`
    pub fn config_path() -> PathBuf {
        // Allow override via env var
        if let Ok(path) = std::env::var("BIBLER_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bibler")
            .join("config.toml")
    }

    /// Load config from disk, falling back to defaults if file doesn't exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to the standard path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    // ─── Derived paths ─────────────────────────────────────

    /// Where the configured backend keeps the collection: the snapshot
    /// directory for `file`, the database file for `sqlite`.
    pub fn books_path(&self) -> PathBuf {
        match self.storage.backend {
            StorageKind::File => self.store_dir(),
            StorageKind::Sqlite => self.database_path(),
        }
    }

    /// Directory holding the file backend's snapshots.
    pub fn store_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("store")
    }

    /// Path to the SQLite database file.
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("bibler.db")
    }

    /// Directory holding recorded audio reviews.
    pub fn audio_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("audio")
    }
}
