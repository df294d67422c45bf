//! Blob storage for recorded audio reviews.
//!
//! The book record keeps only audio metadata; the bytes live here, keyed
//! by the `audio_id` the record points at. A clip recorded on one device
//! is simply missing on another, and callers treat that as a normal state
//! rather than an error.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::Result;
use crate::models::BookId;
use crate::normalize::slug;

/// Extensions the store knows how to read back, probe order.
const EXTENSIONS: [&str; 5] = [".webm", ".ogg", ".m4a", ".mp3", ".wav"];

/// One stored recording: the encoded bytes plus their mime type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// Keyed clip storage, last-write-wins per id. Retrieving an id that was
/// never stored on this device returns `Ok(None)`.
pub trait AudioClipStore {
    fn store(&self, id: &str, clip: &AudioClip) -> Result<()>;
    fn retrieve(&self, id: &str) -> Result<Option<AudioClip>>;
    fn remove(&self, id: &str) -> Result<()>;
}

/// Clip id for a recording made now: `audio-<book id>-<timestamp>`.
/// Re-recordings reuse the id already on the record instead.
pub fn audio_id(book_id: BookId, now_ms: i64) -> String {
    format!("audio-{book_id}-{now_ms}")
}

/// Download name for an exported review clip, `<title slug>-resena<ext>`.
pub fn export_file_name(title: &str, mime: &str) -> String {
    format!("{}-resena{}", slug(title), extension_for_mime(mime))
}

/// File extension for a recorder mime type. Matches on substrings so
/// codec-qualified types like `audio/webm;codecs=opus` map cleanly;
/// anything unrecognized falls back to `.webm`.
pub fn extension_for_mime(mime: &str) -> &'static str {
    let m = mime.to_lowercase();
    if m.contains("webm") {
        ".webm"
    } else if m.contains("ogg") {
        ".ogg"
    } else if m.contains("mp4") || m.contains("m4a") || m.contains("aac") {
        ".m4a"
    } else if m.contains("mpeg") || m.contains("mp3") {
        ".mp3"
    } else if m.contains("wav") {
        ".wav"
    } else {
        ".webm"
    }
}

/// Mime type recovered from a stored file's extension.
pub fn mime_for_extension(ext: &str) -> &'static str {
    match ext {
        ".ogg" => "audio/ogg",
        ".m4a" => "audio/mp4",
        ".mp3" => "audio/mpeg",
        ".wav" => "audio/wav",
        _ => "audio/webm",
    }
}

/// Clips as files on disk: `{dir}/{id}{ext}`, extension derived from the
/// clip's mime type. One clip per id; storing a clip in a new format
/// removes the files the id pointed at before.
pub struct FsAudioStore {
    dir: PathBuf,
}

impl FsAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn clip_path(&self, id: &str, ext: &str) -> PathBuf {
        self.dir.join(format!("{id}{ext}"))
    }
}

impl AudioClipStore for FsAudioStore {
    fn store(&self, id: &str, clip: &AudioClip) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let target = extension_for_mime(&clip.mime);
        for ext in EXTENSIONS {
            if ext != target {
                let stale = self.clip_path(id, ext);
                if stale.exists() {
                    fs::remove_file(&stale)?;
                }
            }
        }
        fs::write(self.clip_path(id, target), &clip.bytes)?;
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Option<AudioClip>> {
        for ext in EXTENSIONS {
            match fs::read(self.clip_path(id, ext)) {
                Ok(bytes) => {
                    return Ok(Some(AudioClip::new(bytes, mime_for_extension(ext))));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(None)
    }

    fn remove(&self, id: &str) -> Result<()> {
        for ext in EXTENSIONS {
            let path = self.clip_path(id, ext);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        Ok(())
    }
}

/// In-memory clip store for tests. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryAudioStore {
    clips: Arc<Mutex<HashMap<String, AudioClip>>>,
}

impl MemoryAudioStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.clips.lock().unwrap().contains_key(id)
    }
}

impl AudioClipStore for MemoryAudioStore {
    fn store(&self, id: &str, clip: &AudioClip) -> Result<()> {
        self.clips.lock().unwrap().insert(id.to_string(), clip.clone());
        Ok(())
    }

    fn retrieve(&self, id: &str) -> Result<Option<AudioClip>> {
        Ok(self.clips.lock().unwrap().get(id).cloned())
    }

    fn remove(&self, id: &str) -> Result<()> {
        self.clips.lock().unwrap().remove(id);
        Ok(())
    }
}
