use serde::{Deserialize, Serialize};

/// Cover shown whenever a record has no usable cover URL.
pub const PLACEHOLDER_COVER: &str = "https://placehold.co/400x600?text=Sin+portada";

/// Collection-local integer id, assigned as `max(existing) + 1`.
pub type BookId = u64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    ToRead,
    Reading,
    Finished,
}

impl ReadingStatus {
    /// Position in the status sort order.
    pub fn rank(self) -> u8 {
        match self {
            Self::ToRead => 0,
            Self::Reading => 1,
            Self::Finished => 2,
        }
    }

    /// Wrapping advance: to-read → reading → finished → to-read.
    pub fn next(self) -> Self {
        match self {
            Self::ToRead => Self::Reading,
            Self::Reading => Self::Finished,
            Self::Finished => Self::ToRead,
        }
    }
}

impl std::fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToRead => write!(f, "toread"),
            Self::Reading => write!(f, "reading"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl std::str::FromStr for ReadingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toread" => Ok(Self::ToRead),
            "reading" => Ok(Self::Reading),
            "finished" => Ok(Self::Finished),
            _ => Err(format!("Invalid ReadingStatus: {s}")),
        }
    }
}

/// Text review attached to a book. The record owns the text itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextReview {
    pub text: String,
    pub is_public: bool,
    pub updated_at: i64,
}

/// Audio review metadata. `audio_id` is a foreign key into the clip
/// store; the record owns metadata only, the store owns the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioReview {
    pub audio_id: String,
    pub is_public: bool,
    pub duration_ms: u64,
    pub updated_at: i64,
}

/// One tracked book. Field names on the wire are camelCase so stored
/// collections from any era of the app load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,

    #[serde(default)]
    pub status: ReadingStatus,

    #[serde(default)]
    pub cover: String,

    /// Millisecond timestamp; `None` only for legacy records that
    /// predate the field, until the migration pass backfills it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_at: Option<i64>,

    /// 0–10, where 0 means unrated.
    #[serde(default)]
    pub rating: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review: Option<TextReview>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_review: Option<AudioReview>,
}

impl Book {
    /// A fresh record assembled from an add-form draft.
    pub fn new(id: BookId, draft: BookDraft, added_at: i64) -> Self {
        Self {
            id,
            title: draft.title,
            author: draft.author,
            status: draft.status.unwrap_or_default(),
            cover: draft.cover.unwrap_or_default(),
            added_at: Some(added_at),
            rating: 0,
            review: None,
            audio_review: None,
        }
    }

    /// Cover URL with the placeholder substituted for blank values.
    pub fn cover_url(&self) -> &str {
        if self.cover.trim().is_empty() {
            PLACEHOLDER_COVER
        } else {
            &self.cover
        }
    }

    /// Shallow-merge a patch into this record. `review`/`audio_review`
    /// replace at whole-object granularity; rating is clamped to 10.
    pub fn apply(&mut self, patch: BookPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(author) = patch.author {
            self.author = author;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(cover) = patch.cover {
            self.cover = cover;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating.min(10);
        }
        if let Some(review) = patch.review {
            self.review = review;
        }
        if let Some(audio_review) = patch.audio_review {
            self.audio_review = audio_review;
        }
    }
}

/// Input for the add operation. Title and author are required after
/// trimming; everything else falls back to defaults.
#[derive(Debug, Clone, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub status: Option<ReadingStatus>,
    pub cover: Option<String>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            ..Default::default()
        }
    }
}

/// Partial update applied through the single write path. `None` leaves
/// a field untouched; for the two review fields the inner `Option`
/// distinguishes "set" from "clear".
#[derive(Debug, Clone, Default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub status: Option<ReadingStatus>,
    pub cover: Option<String>,
    pub rating: Option<u8>,
    pub review: Option<Option<TextReview>>,
    pub audio_review: Option<Option<AudioReview>>,
}

impl BookPatch {
    pub fn status(status: ReadingStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn rating(rating: u8) -> Self {
        Self {
            rating: Some(rating),
            ..Default::default()
        }
    }
}
