//! The collection view-model.
//!
//! [`Library`] owns the authoritative in-memory collection plus the display
//! preferences and writes both through to the store on every mutation. All
//! record changes funnel through [`Library::update`], so memory and storage
//! cannot diverge. User-facing confirmations queue as [`Notice`] values for
//! the presentation layer to drain and render.

use tracing::warn;

use crate::media::{AudioClip, AudioClipStore, audio_id};
use crate::migrate::backfill_added_at;
use crate::models::{
    AudioReview, Book, BookDraft, BookId, BookPatch, FilterPatch, PLACEHOLDER_COVER, Preferences,
    ReadingStatus, SortDirection, SortField, SortKey, TextReview,
};
use crate::storage::Store;
use crate::view::visible_books;

/// Longest accepted review text, in characters. Longer input is rejected
/// outright rather than truncated.
pub const MAX_REVIEW_LEN: usize = 25_000;

/// A queued user-facing confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    BookAdded { id: BookId, title: String },
    BookDeleted { title: String },
    StatusChanged { title: String, status: ReadingStatus },
    /// A record references a recording whose bytes are not on this device.
    AudioMissing { title: String },
}

pub struct Library {
    books: Vec<Book>,
    preferences: Preferences,
    store: Store,
    notices: Vec<Notice>,
}

impl Library {
    /// Loads collection and preferences (seeding first runs and corrupt
    /// snapshots), then backfills records missing `addedAt`. A repaired
    /// collection is written back exactly once; an untouched one not at all.
    pub fn open(store: Store) -> Self {
        let now = now_ms();
        let mut books = store.load_books(now);
        let preferences = store.load_preferences();

        if backfill_added_at(&mut books, now) {
            store.save_books(&books);
        }

        Self {
            books,
            preferences,
            store,
            notices: Vec::new(),
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// The filtered, sorted view of the collection; always a fresh sequence.
    pub fn visible(&self) -> Vec<Book> {
        visible_books(
            &self.books,
            &self.preferences.filters,
            self.preferences.sort,
        )
    }

    /// Queued confirmations, oldest first. The queue empties.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ─── Mutations ─────────────────────────────────────────

    /// Adds a book from the draft and returns its id, or `None` when title
    /// or author is blank after trimming (the add is silently rejected).
    ///
    /// New records go to the collection tail with `id = max + 1`; where the
    /// book shows up is the sort's business, not storage order's.
    pub fn add(&mut self, draft: BookDraft) -> Option<BookId> {
        let title = draft.title.trim().to_string();
        let author = draft.author.trim().to_string();
        if title.is_empty() || author.is_empty() {
            return None;
        }

        let id = self.books.iter().map(|b| b.id).max().unwrap_or(0) + 1;
        let cover = draft
            .cover
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| PLACEHOLDER_COVER.to_string());

        let book = Book::new(
            id,
            BookDraft {
                title: title.clone(),
                author,
                status: draft.status,
                cover: Some(cover),
            },
            now_ms(),
        );
        self.books.push(book);
        self.store.save_books(&self.books);
        self.notices.push(Notice::BookAdded { id, title });
        Some(id)
    }

    /// Removes the record if present; absent ids are a quiet no-op.
    pub fn delete(&mut self, id: BookId) -> bool {
        let Some(idx) = self.books.iter().position(|b| b.id == id) else {
            return false;
        };

        let removed = self.books.remove(idx);
        self.store.save_books(&self.books);
        self.notices.push(Notice::BookDeleted {
            title: removed.title,
        });
        true
    }

    /// Shallow-merges the patch into the record with this id; no-op when
    /// the id is absent. Every mutation of an existing record goes through
    /// here, and each call writes the collection through to the store.
    pub fn update(&mut self, id: BookId, patch: BookPatch) -> bool {
        let Some(book) = self.books.iter_mut().find(|b| b.id == id) else {
            return false;
        };

        book.apply(patch);
        self.store.save_books(&self.books);
        true
    }

    /// Advances to-read → reading → finished → to-read.
    pub fn cycle_status(&mut self, id: BookId) {
        let Some(book) = self.get(id) else { return };
        let title = book.title.clone();
        let next = book.status.next();

        if self.update(id, BookPatch::status(next)) {
            self.notices.push(Notice::StatusChanged {
                title,
                status: next,
            });
        }
    }

    pub fn set_rating(&mut self, id: BookId, rating: u8) -> bool {
        self.update(id, BookPatch::rating(rating))
    }

    /// Saves a text review. Text is trimmed; blank or over-length text is
    /// rejected without touching the record.
    pub fn set_review(&mut self, id: BookId, text: &str, is_public: bool) -> bool {
        let text = text.trim();
        if text.is_empty() || text.chars().count() > MAX_REVIEW_LEN {
            return false;
        }

        let review = TextReview {
            text: text.to_string(),
            is_public,
            updated_at: now_ms(),
        };
        self.update(
            id,
            BookPatch {
                review: Some(Some(review)),
                ..Default::default()
            },
        )
    }

    /// Drops the text review, leaving the record otherwise untouched.
    pub fn clear_review(&mut self, id: BookId) -> bool {
        self.update(
            id,
            BookPatch {
                review: Some(None),
                ..Default::default()
            },
        )
    }

    /// Applies a partial filter update and persists the preferences.
    pub fn set_filters(&mut self, patch: FilterPatch) {
        if let Some(query) = patch.query {
            self.preferences.filters.query = query;
        }
        if let Some(status) = patch.status {
            self.preferences.filters.status = status;
        }
        self.store.save_preferences(&self.preferences);
    }

    pub fn set_sort(&mut self, field: SortField, direction: SortDirection) {
        self.preferences.sort = SortKey::new(field, direction);
        self.store.save_preferences(&self.preferences);
    }

    // ─── Audio reviews ─────────────────────────────────────

    /// Saves a recording. The bytes land in the clip store first; the
    /// record is updated only after they are safely down, so a failed
    /// blob write leaves the record unchanged. Re-recordings reuse the
    /// clip id already on the record.
    pub fn attach_audio_review(
        &mut self,
        id: BookId,
        clip: &AudioClip,
        duration_ms: u64,
        is_public: bool,
        clips: &dyn AudioClipStore,
    ) -> bool {
        let Some(book) = self.get(id) else {
            return false;
        };
        let now = now_ms();
        let clip_id = book
            .audio_review
            .as_ref()
            .map(|a| a.audio_id.clone())
            .unwrap_or_else(|| audio_id(id, now));

        if let Err(e) = clips.store(&clip_id, clip) {
            warn!("failed to store audio clip {clip_id}: {e}");
            return false;
        }

        let review = AudioReview {
            audio_id: clip_id,
            is_public,
            duration_ms,
            updated_at: now,
        };
        self.update(
            id,
            BookPatch {
                audio_review: Some(Some(review)),
                ..Default::default()
            },
        )
    }

    /// Flips visibility on an existing recording without touching the
    /// stored bytes or the duration.
    pub fn set_audio_visibility(&mut self, id: BookId, is_public: bool) -> bool {
        let Some(book) = self.get(id) else {
            return false;
        };
        let Some(current) = book.audio_review.clone() else {
            return false;
        };

        let review = AudioReview {
            is_public,
            updated_at: now_ms(),
            ..current
        };
        self.update(
            id,
            BookPatch {
                audio_review: Some(Some(review)),
                ..Default::default()
            },
        )
    }

    /// Deletes the recording's bytes best-effort and clears the record.
    /// A blob that cannot be removed is logged and forgotten; the record
    /// is cleared regardless.
    pub fn remove_audio_review(&mut self, id: BookId, clips: &dyn AudioClipStore) -> bool {
        let Some(book) = self.get(id) else {
            return false;
        };
        let Some(review) = book.audio_review.clone() else {
            return false;
        };

        if let Err(e) = clips.remove(&review.audio_id) {
            warn!("failed to remove audio clip {}: {e}", review.audio_id);
        }
        self.update(
            id,
            BookPatch {
                audio_review: Some(None),
                ..Default::default()
            },
        )
    }

    /// Whether the recording this record references can be played here.
    /// A clip recorded on another device is missing locally; that queues
    /// a recoverable [`Notice::AudioMissing`] and the record stays valid.
    pub fn audio_available(&mut self, id: BookId, clips: &dyn AudioClipStore) -> bool {
        let Some(book) = self.get(id) else {
            return false;
        };
        let Some(review) = book.audio_review.clone() else {
            return false;
        };
        let title = book.title.clone();

        match clips.retrieve(&review.audio_id) {
            Ok(Some(_)) => true,
            Ok(None) => {
                self.notices.push(Notice::AudioMissing { title });
                false
            }
            Err(e) => {
                warn!("failed to read audio clip {}: {e}", review.audio_id);
                self.notices.push(Notice::AudioMissing { title });
                false
            }
        }
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MemoryAudioStore;
    use crate::storage::{BOOKS_KEY, MemoryBackend, SETTINGS_KEY};

    fn book(id: u64, title: &str, author: &str, added_at: i64) -> Book {
        Book::new(id, BookDraft::new(title, author), added_at)
    }

    fn library_with(books: &[Book]) -> (Library, MemoryBackend) {
        let backend = MemoryBackend::new();
        backend.preload(BOOKS_KEY, &serde_json::to_string(books).unwrap());
        let library = Library::open(Store::new(backend.clone()));
        (library, backend)
    }

    #[test]
    fn test_open_first_run_seeds_without_writing() {
        let backend = MemoryBackend::new();
        let library = Library::open(Store::new(backend.clone()));

        assert_eq!(library.books().len(), 3);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_open_migrates_legacy_records_with_one_write() {
        let backend = MemoryBackend::new();
        backend.preload(
            BOOKS_KEY,
            r#"[{"id":1,"title":"old","author":"a"},{"id":2,"title":"new","author":"b","addedAt":99}]"#,
        );

        let library = Library::open(Store::new(backend.clone()));

        assert!(library.books().iter().all(|b| b.added_at.is_some()));
        assert_eq!(library.get(2).unwrap().added_at, Some(99));
        assert_eq!(backend.write_count(), 1);
    }

    #[test]
    fn test_open_complete_collection_does_not_rewrite() {
        let (_, backend) = library_with(&[book(1, "t", "a", 500)]);
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_add_assigns_one_on_empty_collection() {
        let (mut library, backend) = library_with(&[]);

        let id = library.add(BookDraft::new("1984", "Orwell")).unwrap();
        assert_eq!(id, 1);

        let added = library.get(1).unwrap();
        assert_eq!(added.rating, 0);
        assert_eq!(added.status, ReadingStatus::ToRead);
        assert!(added.added_at.is_some());
        assert!(added.review.is_none());
        assert_eq!(backend.write_count(), 1);
        assert_eq!(
            library.drain_notices(),
            vec![Notice::BookAdded {
                id: 1,
                title: "1984".to_string()
            }]
        );
    }

    #[test]
    fn test_add_assigns_max_plus_one_never_reusing_ids() {
        let (mut library, _) = library_with(&[
            book(1, "a", "a", 1),
            book(2, "b", "b", 2),
            book(3, "c", "c", 3),
        ]);

        library.delete(2);
        let id = library.add(BookDraft::new("d", "d")).unwrap();
        assert_eq!(id, 4);
    }

    #[test]
    fn test_add_rejects_blank_title_or_author() {
        let (mut library, backend) = library_with(&[]);

        assert_eq!(library.add(BookDraft::new("   ", "X")), None);
        assert_eq!(library.add(BookDraft::new("X", "")), None);
        assert!(library.books().is_empty());
        assert_eq!(backend.write_count(), 0);
        assert!(library.drain_notices().is_empty());
    }

    #[test]
    fn test_add_trims_fields_and_defaults_cover() {
        let (mut library, _) = library_with(&[]);

        let id = library.add(BookDraft::new("  Dune  ", " Frank Herbert ")).unwrap();
        let added = library.get(id).unwrap();
        assert_eq!(added.title, "Dune");
        assert_eq!(added.author, "Frank Herbert");
        assert_eq!(added.cover, PLACEHOLDER_COVER);

        let mut draft = BookDraft::new("Dune Messiah", "Frank Herbert");
        draft.cover = Some("  https://example.com/c.jpg ".to_string());
        let id = library.add(draft).unwrap();
        assert_eq!(library.get(id).unwrap().cover, "https://example.com/c.jpg");
    }

    #[test]
    fn test_delete_removes_and_notifies() {
        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);

        assert!(library.delete(1));
        assert!(library.books().is_empty());
        assert_eq!(backend.write_count(), 1);
        assert_eq!(
            library.drain_notices(),
            vec![Notice::BookDeleted {
                title: "t".to_string()
            }]
        );
    }

    #[test]
    fn test_delete_absent_id_is_noop() {
        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);

        assert!(!library.delete(99));
        assert_eq!(library.books().len(), 1);
        assert_eq!(backend.write_count(), 0);
        assert!(library.drain_notices().is_empty());
    }

    #[test]
    fn test_update_writes_through() {
        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);

        assert!(library.update(1, BookPatch::rating(7)));
        assert_eq!(library.get(1).unwrap().rating, 7);
        assert!(backend.raw(BOOKS_KEY).unwrap().contains("\"rating\":7"));
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);

        assert!(!library.update(9, BookPatch::rating(7)));
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_cycle_status_wraps_in_three_steps() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);

        library.cycle_status(1);
        assert_eq!(library.get(1).unwrap().status, ReadingStatus::Reading);
        library.cycle_status(1);
        assert_eq!(library.get(1).unwrap().status, ReadingStatus::Finished);
        library.cycle_status(1);
        assert_eq!(library.get(1).unwrap().status, ReadingStatus::ToRead);

        let notices = library.drain_notices();
        assert_eq!(notices.len(), 3);
        assert_eq!(
            notices[0],
            Notice::StatusChanged {
                title: "t".to_string(),
                status: ReadingStatus::Reading
            }
        );
    }

    #[test]
    fn test_set_review_trims_and_stamps() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);

        assert!(library.set_review(1, "  una joya  ", true));
        let review = library.get(1).unwrap().review.as_ref().unwrap();
        assert_eq!(review.text, "una joya");
        assert!(review.is_public);
        assert!(review.updated_at > 0);
    }

    #[test]
    fn test_set_review_rejects_blank_and_oversized() {
        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);

        assert!(!library.set_review(1, "   ", false));
        let oversized = "x".repeat(MAX_REVIEW_LEN + 1);
        assert!(!library.set_review(1, &oversized, false));
        assert!(library.get(1).unwrap().review.is_none());
        assert_eq!(backend.write_count(), 0);

        let at_limit = "x".repeat(MAX_REVIEW_LEN);
        assert!(library.set_review(1, &at_limit, false));
    }

    #[test]
    fn test_clear_review() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);

        library.set_review(1, "texto", false);
        assert!(library.clear_review(1));
        assert!(library.get(1).unwrap().review.is_none());
    }

    #[test]
    fn test_set_filters_merges_and_persists() {
        let (mut library, backend) = library_with(&[
            book(1, "1984", "Orwell", 1),
            book(2, "Dune", "Herbert", 2),
        ]);

        library.set_filters(FilterPatch::query("dune"));
        assert_eq!(library.visible().len(), 1);

        // A later status-only patch keeps the query.
        library.set_filters(FilterPatch::status(crate::models::StatusFilter::All));
        assert_eq!(library.preferences().filters.query, "dune");

        let raw = backend.raw(SETTINGS_KEY).unwrap();
        assert!(raw.contains("\"query\":\"dune\""));
    }

    #[test]
    fn test_set_sort_persists_and_reorders() {
        let (mut library, backend) = library_with(&[
            book(1, "Zorba", "k", 1),
            book(2, "Abaco", "a", 2),
        ]);

        library.set_sort(SortField::Title, SortDirection::Asc);
        let visible = library.visible();
        assert_eq!(visible[0].title, "Abaco");
        assert!(backend.raw(SETTINGS_KEY).unwrap().contains("title-asc"));
    }

    #[test]
    fn test_visible_is_pure_and_fresh() {
        let (library, _) = library_with(&[book(1, "t", "a", 1), book(2, "u", "b", 2)]);
        assert_eq!(library.visible(), library.visible());
    }

    #[test]
    fn test_attach_audio_review_stores_blob_then_record() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        let clips = MemoryAudioStore::new();
        let clip = AudioClip::new(vec![1, 2], "audio/webm");

        assert!(library.attach_audio_review(1, &clip, 1500, true, &clips));

        let review = library.get(1).unwrap().audio_review.as_ref().unwrap();
        assert!(review.audio_id.starts_with("audio-1-"));
        assert_eq!(review.duration_ms, 1500);
        assert!(clips.contains(&review.audio_id));
    }

    #[test]
    fn test_attach_audio_review_failure_leaves_record_unchanged() {
        struct FailingClips;

        impl AudioClipStore for FailingClips {
            fn store(&self, _id: &str, _clip: &AudioClip) -> crate::error::Result<()> {
                Err(std::io::Error::other("no space").into())
            }

            fn retrieve(&self, _id: &str) -> crate::error::Result<Option<AudioClip>> {
                Ok(None)
            }

            fn remove(&self, _id: &str) -> crate::error::Result<()> {
                Ok(())
            }
        }

        let (mut library, backend) = library_with(&[book(1, "t", "a", 1)]);
        let clip = AudioClip::new(vec![1], "audio/webm");

        assert!(!library.attach_audio_review(1, &clip, 100, false, &FailingClips));
        assert!(library.get(1).unwrap().audio_review.is_none());
        assert_eq!(backend.write_count(), 0);
    }

    #[test]
    fn test_rerecording_reuses_clip_id() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        let clips = MemoryAudioStore::new();

        library.attach_audio_review(1, &AudioClip::new(vec![1], "audio/webm"), 100, false, &clips);
        let first_id = library.get(1).unwrap().audio_review.as_ref().unwrap().audio_id.clone();

        library.attach_audio_review(1, &AudioClip::new(vec![2], "audio/ogg"), 200, false, &clips);
        let second = library.get(1).unwrap().audio_review.as_ref().unwrap();

        assert_eq!(second.audio_id, first_id);
        assert_eq!(second.duration_ms, 200);
        assert_eq!(clips.retrieve(&first_id).unwrap().unwrap().bytes, vec![2]);
    }

    #[test]
    fn test_set_audio_visibility_preserves_duration() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        let clips = MemoryAudioStore::new();

        library.attach_audio_review(1, &AudioClip::new(vec![1], "audio/webm"), 900, false, &clips);
        assert!(library.set_audio_visibility(1, true));

        let review = library.get(1).unwrap().audio_review.as_ref().unwrap();
        assert!(review.is_public);
        assert_eq!(review.duration_ms, 900);
    }

    #[test]
    fn test_remove_audio_review_clears_record_even_without_blob() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        let clips = MemoryAudioStore::new();

        library.attach_audio_review(1, &AudioClip::new(vec![1], "audio/webm"), 100, false, &clips);
        let clip_id = library.get(1).unwrap().audio_review.as_ref().unwrap().audio_id.clone();
        clips.remove(&clip_id).unwrap();

        assert!(library.remove_audio_review(1, &clips));
        assert!(library.get(1).unwrap().audio_review.is_none());
    }

    #[test]
    fn test_audio_available_flags_clip_missing_on_this_device() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        let clips = MemoryAudioStore::new();

        library.attach_audio_review(1, &AudioClip::new(vec![1], "audio/webm"), 100, false, &clips);
        library.drain_notices();
        assert!(library.audio_available(1, &clips));

        // Same record on a device that never saw the bytes.
        let elsewhere = MemoryAudioStore::new();
        assert!(!library.audio_available(1, &elsewhere));
        assert_eq!(
            library.drain_notices(),
            vec![Notice::AudioMissing {
                title: "t".to_string()
            }]
        );
        assert!(library.get(1).unwrap().audio_review.is_some());
    }

    #[test]
    fn test_audio_available_without_audio_review_is_false() {
        let (mut library, _) = library_with(&[book(1, "t", "a", 1)]);
        assert!(!library.audio_available(1, &MemoryAudioStore::new()));
        assert!(library.drain_notices().is_empty());
    }

    #[test]
    fn test_drain_notices_empties_queue() {
        let (mut library, _) = library_with(&[]);
        library.add(BookDraft::new("a", "b"));

        assert_eq!(library.drain_notices().len(), 1);
        assert!(library.drain_notices().is_empty());
    }
}
