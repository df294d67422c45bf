//! One-shot repair of records written before `addedAt` existed.

use crate::models::Book;

/// Backfills `added_at` on records that predate the field.
///
/// A record at index `idx` in a collection of `n` books receives
/// `now_ms - (n - idx) * 1000`, so missing timestamps land one second
/// apart, in collection order, ending one second before `now_ms`. The
/// offsets are anchored to the collection length, not to how many
/// records were actually missing; collections repaired at different
/// sizes therefore get different absolute values, which is the
/// long-standing behavior stored data already depends on.
///
/// Returns `true` when at least one record was patched, so the caller
/// knows whether the collection needs to be written back.
pub fn backfill_added_at(books: &mut [Book], now_ms: i64) -> bool {
    let n = books.len() as i64;
    let mut changed = false;
    for (idx, book) in books.iter_mut().enumerate() {
        if book.added_at.is_none() {
            book.added_at = Some(now_ms - (n - idx as i64) * 1000);
            changed = true;
        }
    }
    changed
}
