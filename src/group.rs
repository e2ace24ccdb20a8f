//! Grouping and sorting of the missing-book list.
//!
//! Reduces the flat pipeline output into [`SeriesGroup`]s for display and
//! export. Grouping walks each book's series memberships in catalog order,
//! skips hidden series, and attributes the book to at most one group when
//! sub-series are excluded. Output order is deterministic: groups sorted
//! case-insensitively by series name, books in acceptance order, stable on
//! ties.

use crate::{
    types::{BookRecord, SeriesGroup},
    visibility::HiddenSet,
};

/// Groups missing books by series name.
///
/// For each book, memberships are visited in order; memberships whose series
/// is hidden are skipped. With `include_sub_series` off, a book lands only in
/// its first non-hidden series' group. Groups are created on first encounter
/// and finally sorted case-insensitively, ascending, by series name; ties
/// keep insertion order.
///
/// A book whose only memberships are hidden (or that has none) appears in no
/// group; that is not an error.
pub fn group_by_series(
    books: &[BookRecord],
    hidden: &HiddenSet,
    include_sub_series: bool,
) -> Vec<SeriesGroup> {
    let mut groups: Vec<SeriesGroup> = Vec::new();

    for book in books {
        for membership in &book.series {
            if let Some(series_asin) = &membership.asin {
                if hidden.is_hidden_by_asin(series_asin) {
                    continue;
                }
            }
            if hidden.is_hidden_series(&membership.name) {
                continue;
            }

            match groups.iter_mut().find(|g| g.series == membership.name) {
                Some(group) => group.books.push(book.clone()),
                None => groups.push(SeriesGroup {
                    series: membership.name.clone(),
                    books: vec![book.clone()],
                }),
            }

            if !include_sub_series {
                break;
            }
        }
    }

    groups.sort_by(|a, b| a.series.to_lowercase().cmp(&b.series.to_lowercase()));
    groups
}

/// Sorts any `(series, title)`-bearing records by series name then title,
/// both case-insensitive, stable on ties.
///
/// # Examples
///
/// ```rust
/// use shelfgap::group::sort_by_series_then_title;
///
/// let mut rows = vec![
///     ("wayward children".to_string(), "Down Among the Sticks and Bones".to_string()),
///     ("Broken Earth".to_string(), "the Obelisk Gate".to_string()),
///     ("Broken Earth".to_string(), "The Fifth Season".to_string()),
/// ];
/// sort_by_series_then_title(&mut rows, |r| (r.0.clone(), r.1.clone()));
/// assert_eq!(rows[0].1, "The Fifth Season");
/// ```
pub fn sort_by_series_then_title<T>(rows: &mut [T], key: impl Fn(&T) -> (String, String)) {
    rows.sort_by(|a, b| {
        let (series_a, title_a) = key(a);
        let (series_b, title_b) = key(b);
        series_a
            .to_lowercase()
            .cmp(&series_b.to_lowercase())
            .then_with(|| title_a.to_lowercase().cmp(&title_b.to_lowercase()))
    });
}
