//! Pure derivation of the visible collection.
//!
//! Filtering and sorting never touch stored state: the same books, filters
//! and sort key always produce the same list, and callers re-derive after
//! every mutation instead of patching a cached view.

use crate::models::{Book, Filters, SortDirection, SortField, SortKey};
use crate::normalize::normalize;

/// Applies the filters, then orders the survivors by the sort key.
///
/// The text query matches accent- and case-insensitively against title and
/// author; a blank query matches everything. Sorting is stable and a
/// descending key reverses the comparator rather than the list, so books
/// that compare equal keep their stored order either way. The result is a
/// fresh owned sequence that never aliases the stored collection.
pub fn visible_books(books: &[Book], filters: &Filters, sort: SortKey) -> Vec<Book> {
    let query = normalize(&filters.query);
    let mut visible: Vec<Book> = books
        .iter()
        .filter(|book| filters.status.matches(book.status))
        .filter(|book| {
            query.is_empty()
                || normalize(&book.title).contains(&query)
                || normalize(&book.author).contains(&query)
        })
        .cloned()
        .collect();

    visible.sort_by(|a, b| {
        let ordering = match sort.field {
            SortField::Title => normalize(&a.title).cmp(&normalize(&b.title)),
            SortField::Author => normalize(&a.author).cmp(&normalize(&b.author)),
            SortField::Status => a.status.rank().cmp(&b.status.rank()),
            // Legacy records without a timestamp sort as the epoch.
            SortField::AddedAt => a.added_at.unwrap_or(0).cmp(&b.added_at.unwrap_or(0)),
            SortField::Rating => a.rating.cmp(&b.rating),
        };
        match sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookDraft, ReadingStatus, StatusFilter};

    fn book(id: u64, title: &str, author: &str, added_at: i64) -> Book {
        Book::new(id, BookDraft::new(title, author), added_at)
    }

    fn titles(books: &[Book]) -> Vec<String> {
        books.iter().map(|b| b.title.clone()).collect()
    }

    #[test]
    fn test_query_ignores_case_and_accents() {
        let books = vec![
            book(1, "Cien años de soledad", "Gabriel García Márquez", 1),
            book(2, "Dune", "Frank Herbert", 2),
        ];
        let filters = Filters {
            query: "GARCIA".to_string(),
            status: StatusFilter::All,
        };

        let visible = visible_books(&books, &filters, SortKey::default());
        assert_eq!(titles(&visible), vec!["Cien años de soledad"]);
    }

    #[test]
    fn test_empty_query_matches_everything() {
        let books = vec![book(1, "a", "x", 1), book(2, "b", "y", 2)];
        let filters = Filters {
            query: String::new(),
            status: StatusFilter::All,
        };

        let visible = visible_books(&books, &filters, SortKey::default());
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_query_whitespace_is_significant() {
        // The query is matched verbatim, so trailing padding only matches
        // titles or authors that actually contain it.
        let books = vec![book(1, "Ficciones", "Jorge Luis Borges", 1)];
        let filters = Filters {
            query: "borges ".to_string(),
            status: StatusFilter::All,
        };

        let visible = visible_books(&books, &filters, SortKey::default());
        assert!(visible.is_empty());

        let filters = Filters {
            query: "luis b".to_string(),
            status: StatusFilter::All,
        };
        let visible = visible_books(&books, &filters, SortKey::default());
        assert_eq!(titles(&visible), vec!["Ficciones"]);
    }

    #[test]
    fn test_status_filter_composes_with_query() {
        let mut reading = book(1, "Dune", "Frank Herbert", 1);
        reading.status = ReadingStatus::Reading;
        let finished = book(2, "Dune Messiah", "Frank Herbert", 2);

        let books = vec![reading, finished];
        let filters = Filters {
            query: "dune".to_string(),
            status: StatusFilter::Only(ReadingStatus::Reading),
        };

        let visible = visible_books(&books, &filters, SortKey::default());
        assert_eq!(titles(&visible), vec!["Dune"]);
    }

    #[test]
    fn test_sort_by_title_both_directions() {
        let books = vec![
            book(1, "Zorba", "k", 1),
            book(2, "Ábaco", "a", 2),
            book(3, "mitad", "m", 3),
        ];
        let filters = Filters::default();

        let asc = visible_books(
            &books,
            &filters,
            SortKey::new(SortField::Title, SortDirection::Asc),
        );
        assert_eq!(titles(&asc), vec!["Ábaco", "mitad", "Zorba"]);

        let desc = visible_books(
            &books,
            &filters,
            SortKey::new(SortField::Title, SortDirection::Desc),
        );
        assert_eq!(titles(&desc), vec!["Zorba", "mitad", "Ábaco"]);
    }

    #[test]
    fn test_default_sort_is_newest_first_and_missing_timestamps_sink() {
        let mut legacy = book(3, "legacy", "c", 0);
        legacy.added_at = None;
        let books = vec![book(1, "old", "a", 1000), legacy, book(2, "new", "b", 2000)];

        let visible = visible_books(&books, &Filters::default(), SortKey::default());
        assert_eq!(titles(&visible), vec!["new", "old", "legacy"]);
    }

    #[test]
    fn test_status_sort_orders_by_pipeline_stage() {
        let mut finished = book(1, "f", "a", 1);
        finished.status = ReadingStatus::Finished;
        let mut reading = book(2, "r", "b", 2);
        reading.status = ReadingStatus::Reading;
        let toread = book(3, "t", "c", 3);

        let books = vec![finished, reading, toread];
        let visible = visible_books(
            &books,
            &Filters::default(),
            SortKey::new(SortField::Status, SortDirection::Asc),
        );
        assert_eq!(titles(&visible), vec!["t", "r", "f"]);
    }

    #[test]
    fn test_descending_sort_keeps_stored_order_for_ties() {
        let ratings = [3, 7, 0, 7];
        let books: Vec<Book> = ratings
            .iter()
            .enumerate()
            .map(|(idx, rating)| {
                let mut b = book(idx as u64 + 1, &format!("book-{idx}"), "a", idx as i64);
                b.rating = *rating;
                b
            })
            .collect();

        let visible = visible_books(
            &books,
            &Filters::default(),
            SortKey::new(SortField::Rating, SortDirection::Desc),
        );
        // The two 7s keep their stored relative order.
        assert_eq!(
            titles(&visible),
            vec!["book-1", "book-3", "book-0", "book-2"]
        );
    }
}
