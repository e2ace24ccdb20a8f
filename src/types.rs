//! Core data types for books, series, hidden items, and filter options.
//!
//! This module defines the fundamental data structures used throughout
//! shelfgap:
//!
//! - [`BookRecord`] - One catalog entry for an audiobook
//! - [`SeriesMembership`] - A book's place within one series
//! - [`SeriesPosition`] - Parsed series-position variant
//! - [`SeriesBooks`] - A collected series roster
//! - [`SeriesGroup`] - Missing books aggregated under one series name
//! - [`HiddenItem`] - A user preference excluding a series or book
//! - [`LibraryContents`] / [`LibraryBookRef`] - The user's existing library
//! - [`FilterOptions`] - Toggleable exclusion rules for the filter pipeline
//!
//! # Examples
//!
//! ```rust
//! use shelfgap::types::{FilterOptionsBuilder, SeriesPosition};
//!
//! let options = FilterOptionsBuilder::default()
//!     .region("uk")
//!     .only_unabridged(true)
//!     .build()
//!     .unwrap();
//! assert_eq!(options.region, "uk");
//!
//! assert_eq!(SeriesPosition::parse(Some("3.5")), SeriesPosition::Decimal(3.5));
//! ```

use chrono::NaiveDate;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Sentinel used when a series membership carries no position string.
pub const NO_POSITION: &str = "N/A";

/// A book's membership in one series.
///
/// Books can belong to several series (a main series plus sub-series); the
/// order of memberships on a [`BookRecord`] is the order the catalog reports
/// and is significant for grouping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMembership {
    /// Display name of the series
    pub name: String,

    /// Catalog identifier of the series, when the catalog reports one
    #[serde(default)]
    pub asin: Option<String>,

    /// Free-form position string ("3", "3.5", "1-2"), absent for companion
    /// works the catalog does not number
    #[serde(default)]
    pub position: Option<String>,
}

impl SeriesMembership {
    /// Creates a membership with a position.
    pub fn new(name: impl Into<String>, position: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            asin: None,
            position: Some(position.into()),
        }
    }

    /// The raw position key used for exact-match comparisons, with missing
    /// positions defaulted to [`NO_POSITION`].
    pub fn position_key(&self) -> &str {
        self.position.as_deref().unwrap_or(NO_POSITION)
    }

    /// Parses this membership's position string into a [`SeriesPosition`].
    pub fn parsed_position(&self) -> SeriesPosition {
        SeriesPosition::parse(self.position.as_deref())
    }
}

/// Parsed series-position variant.
///
/// Position strings from the catalog are free-form. Parsing happens once at
/// ingestion so the filter gates can pattern-match instead of re-inspecting
/// strings:
///
/// - `Unknown` - no position at all
/// - `Single(n)` - a whole-number slot ("3")
/// - `Decimal(n)` - an in-between slot ("3.5")
/// - `Range(a, b)` - a span of slots ("1-2", omnibus editions)
/// - `Text(s)` - anything non-numeric ("Prequel")
///
/// # Examples
///
/// ```rust
/// use shelfgap::types::SeriesPosition;
///
/// assert_eq!(SeriesPosition::parse(Some("3")), SeriesPosition::Single(3.0));
/// assert_eq!(SeriesPosition::parse(Some("1-2")), SeriesPosition::Range(1.0, 2.0));
/// assert_eq!(SeriesPosition::parse(None), SeriesPosition::Unknown);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesPosition {
    /// No position defined
    Unknown,
    /// Whole-number slot
    Single(f64),
    /// Sub-position slot ("3.5")
    Decimal(f64),
    /// Spans multiple slots ("1-2")
    Range(f64, f64),
    /// Non-numeric free text
    Text(String),
}

impl SeriesPosition {
    /// Parses a raw catalog position string.
    ///
    /// `None` and empty strings parse to `Unknown`. Hyphenated strings whose
    /// halves are both numeric parse to `Range`; strings with a decimal point
    /// to `Decimal`; whole numbers to `Single`. Everything else is kept
    /// verbatim as `Text`.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s.trim(),
            _ => return SeriesPosition::Unknown,
        };

        if let Some((a, b)) = raw.split_once('-') {
            if let (Ok(start), Ok(end)) = (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                return SeriesPosition::Range(start, end);
            }
            return SeriesPosition::Text(raw.to_string());
        }

        if raw.contains('.') {
            if let Ok(n) = raw.parse::<f64>() {
                return SeriesPosition::Decimal(n);
            }
            return SeriesPosition::Text(raw.to_string());
        }

        match raw.parse::<f64>() {
            Ok(n) => SeriesPosition::Single(n),
            Err(_) => SeriesPosition::Text(raw.to_string()),
        }
    }

    /// Whether this position spans multiple series slots.
    ///
    /// Detection follows the raw string: any hyphen counts, even when the
    /// halves are not numeric.
    pub fn spans_multiple(&self) -> bool {
        match self {
            SeriesPosition::Range(_, _) => true,
            SeriesPosition::Text(s) => s.contains('-'),
            _ => false,
        }
    }

    /// Whether this position carries a sub-position ("3.5"-style) slot.
    ///
    /// Detection follows the raw string: a range like "1.5-2" still carries
    /// a decimal point and counts as a sub-position.
    pub fn is_sub_position(&self) -> bool {
        match self {
            SeriesPosition::Decimal(_) => true,
            SeriesPosition::Range(a, b) => a.fract() != 0.0 || b.fract() != 0.0,
            SeriesPosition::Text(s) => s.contains('.'),
            _ => false,
        }
    }
}

/// One catalog entry for an audiobook.
///
/// Created when metadata is fetched from the external catalog. Immutable
/// except for the single `series_asin` assignment made when the book is
/// accepted into the missing list; discarded at the end of a run.
///
/// # Examples
///
/// ```rust
/// use shelfgap::types::{BookRecord, SeriesMembership};
///
/// let book = BookRecord {
///     asin: "B0EXAMPLE".to_string(),
///     title: "The Fifth Season".to_string(),
///     region: "us".to_string(),
///     is_available: true,
///     series: vec![SeriesMembership::new("The Broken Earth", "1")],
///     ..Default::default()
/// };
/// assert!(book.series_asin.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRecord {
    /// Opaque catalog identifier, the primary key
    pub asin: String,

    /// Main title
    pub title: String,

    /// Subtitle, when the catalog carries one
    #[serde(default)]
    pub subtitle: Option<String>,

    /// Catalog region code ("us", "uk", ...)
    pub region: String,

    /// Whether the catalog currently offers this book
    #[serde(default)]
    pub is_available: bool,

    /// Edition format, e.g. "unabridged" or "abridged"
    #[serde(default)]
    pub book_format: Option<String>,

    /// Catalog release date
    #[serde(default)]
    pub release_date: Option<NaiveDate>,

    /// Series memberships in catalog order
    #[serde(default)]
    pub series: Vec<SeriesMembership>,

    /// The series identifier this book was discovered under; assigned once,
    /// when the book is accepted into the missing list
    #[serde(default)]
    pub series_asin: Option<String>,

    /// Author names
    #[serde(default)]
    pub authors: Vec<String>,

    /// Narrator names
    #[serde(default)]
    pub narrators: Vec<String>,

    /// Publisher name
    #[serde(default)]
    pub publisher: Option<String>,

    /// Genre labels
    #[serde(default)]
    pub genres: Vec<String>,

    /// Stock keeping unit
    #[serde(default)]
    pub sku: Option<String>,

    /// SKU group (shared across editions)
    #[serde(default)]
    pub sku_group: Option<String>,

    /// ISBN, when known
    #[serde(default)]
    pub isbn: Option<String>,
}

impl BookRecord {
    /// The series names this book belongs to, in catalog order.
    pub fn series_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(|m| m.name.as_str())
    }

    /// Whether this book shares at least one series name with `other`.
    pub fn shares_series_with(&self, other: &BookRecord) -> bool {
        self.series
            .iter()
            .any(|m| other.series.iter().any(|o| o.name == m.name))
    }
}

/// A collected series roster: all catalog books filed under one series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesBooks {
    /// Catalog identifier of the series
    pub series_asin: String,

    /// Books the catalog files under this series, in catalog order
    pub response: Vec<BookRecord>,
}

impl SeriesBooks {
    /// Wraps a fetched roster under the series it was requested for.
    pub fn new(series_asin: impl Into<String>, response: Vec<BookRecord>) -> Self {
        Self {
            series_asin: series_asin.into(),
            response,
        }
    }
}

/// Missing books aggregated under one series name.
///
/// Created fresh each run by the grouping stage; unique by name within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesGroup {
    /// Display name of the series
    pub series: String,

    /// Missing books attributed to this series, in acceptance order
    pub books: Vec<BookRecord>,
}

/// Whether a [`HiddenItem`] hides a whole series or a single book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenKind {
    Series,
    Book,
}

/// A user preference marking a series or book as permanently excluded.
///
/// Uniqueness is by `(kind, series, title-if-book)`; the ASIN is carried for
/// fast lookup but is not part of the dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenItem {
    /// Whether the whole series or a single book is hidden
    #[serde(rename = "type")]
    pub kind: HiddenKind,

    /// Series name
    pub series: String,

    /// Book title, present only for book-level items
    #[serde(default)]
    pub title: Option<String>,

    /// Catalog identifier, carried for fast lookup
    pub asin: String,
}

impl HiddenItem {
    /// Creates a series-level hidden item.
    pub fn series(series: impl Into<String>, asin: impl Into<String>) -> Self {
        Self {
            kind: HiddenKind::Series,
            series: series.into(),
            title: None,
            asin: asin.into(),
        }
    }

    /// Creates a book-level hidden item.
    pub fn book(
        series: impl Into<String>,
        title: impl Into<String>,
        asin: impl Into<String>,
    ) -> Self {
        Self {
            kind: HiddenKind::Book,
            series: series.into(),
            title: Some(title.into()),
            asin: asin.into(),
        }
    }
}

/// A reference to one book in the user's existing library.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryBookRef {
    /// Series name the library shelves this book under
    pub series: String,

    /// Book title
    pub title: String,

    /// Catalog identifier
    pub asin: String,

    /// Subtitle, when the library carries one
    #[serde(default)]
    pub subtitle: Option<String>,

    /// Raw series-position string as stored by the library
    #[serde(default)]
    pub series_position: Option<String>,

    /// Numeric position, when the library could parse one
    #[serde(default)]
    pub series_position_number: Option<f64>,
}

/// The user's existing library contents, as reported by the media server.
///
/// `series_first_asin` lists each book once, under its first series;
/// `series_all_asin` repeats books under every series they belong to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryContents {
    #[serde(rename = "seriesFirstASIN")]
    pub series_first_asin: Vec<LibraryBookRef>,

    #[serde(rename = "seriesAllASIN")]
    pub series_all_asin: Vec<LibraryBookRef>,
}

/// Toggleable exclusion rules for the missing-book filter pipeline.
///
/// Every rule defaults to inactive; `region` is the only required field. The
/// generated [`FilterOptionsBuilder`] provides the fluent construction API.
///
/// # Examples
///
/// ```rust
/// use shelfgap::types::FilterOptionsBuilder;
///
/// let options = FilterOptionsBuilder::default()
///     .region("us")
///     .ignore_future_date_books(true)
///     .ignore_sub_position_books(true)
///     .build()
///     .unwrap();
/// assert!(!options.only_unabridged);
/// ```
#[derive(Debug, Clone, Builder)]
#[builder(setter(into))]
pub struct FilterOptions {
    /// Catalog region; candidates from any other region are never viable
    pub region: String,

    /// Exclude books whose format is not "unabridged"
    #[builder(default)]
    pub only_unabridged: bool,

    /// Exclude books with no defined series position
    #[builder(default)]
    pub ignore_no_position_books: bool,

    /// Exclude books whose position spans multiple slots ("1-2")
    #[builder(default)]
    pub ignore_multi_books: bool,

    /// Exclude books with sub-position slots ("3.5")
    #[builder(default)]
    pub ignore_sub_position_books: bool,

    /// Exclude books releasing today or later
    #[builder(default)]
    pub ignore_future_date_books: bool,

    /// Exclude books released strictly before today
    #[builder(default)]
    pub ignore_past_date_books: bool,

    /// Exclude candidates matching an owned book's title+subtitle within a
    /// shared series
    #[builder(default)]
    pub ignore_title_subtitle: bool,

    /// Exclude candidates matching an owned book's series name and position
    #[builder(default)]
    pub ignore_same_series_position: bool,

    /// Exclude candidates matching an already-accepted missing book's
    /// title+subtitle within a shared series
    #[builder(default)]
    pub ignore_title_subtitle_in_missing: bool,

    /// Exclude candidates matching an already-accepted missing book's series
    /// name and position
    #[builder(default)]
    pub ignore_same_series_position_in_missing: bool,

    /// Reference date for the release-date gates; defaults to the current
    /// local date at the start of the run. Injectable for deterministic tests.
    #[builder(default)]
    pub today: Option<NaiveDate>,
}

impl FilterOptions {
    /// Creates options with only the required region set; every rule inactive.
    pub fn for_region(region: impl Into<String>) -> Self {
        FilterOptionsBuilder::default()
            .region(region)
            .build()
            .expect("region is the only required field")
    }
}
