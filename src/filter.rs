//! Missing-book filter pipeline.
//!
//! Given the user's existing library and freshly collected series rosters,
//! the pipeline produces the ordered list of books the user is missing. Each
//! candidate runs through an ordered chain of exclusion gates; the first
//! rejecting gate wins and no further gates are evaluated for that book.
//! A candidate surviving every active gate is appended to the missing list
//! and stamped with the series identifier it was discovered under.
//!
//! Gates are pure predicates over an ephemeral [`GateContext`]; business
//! rejections are normal control flow, never errors. The pipeline driver
//! alone invokes the optional rejection sink, so diagnostics can never
//! affect the returned list.
//!
//! Given identical inputs and options, two runs produce identical output in
//! identical order. The only order-dependence is the monotonically growing
//! accepted list consulted by the "missing so far" de-dup gates, which is
//! intentional: the first-seen book wins.
//!
//! # Examples
//!
//! ```rust
//! use shelfgap::filter::find_missing_books;
//! use shelfgap::types::{BookRecord, FilterOptions, SeriesBooks, SeriesMembership};
//!
//! let owned = vec![BookRecord {
//!     asin: "A1".to_string(),
//!     region: "uk".to_string(),
//!     ..Default::default()
//! }];
//! let rosters = vec![SeriesBooks::new("S1", vec![
//!     BookRecord {
//!         asin: "A2".to_string(),
//!         region: "uk".to_string(),
//!         is_available: true,
//!         series: vec![SeriesMembership::new("X", "2")],
//!         ..Default::default()
//!     },
//! ])];
//!
//! let missing = find_missing_books(&owned, &rosters, &FilterOptions::for_region("uk"), None);
//! assert_eq!(missing.len(), 1);
//! assert_eq!(missing[0].series_asin.as_deref(), Some("S1"));
//! ```

use std::collections::HashSet;

use chrono::NaiveDate;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::types::{BookRecord, FilterOptions, SeriesBooks, SeriesPosition};

/// Reason code returned by a rejecting gate, in gate-chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The catalog no longer offers the book
    Unavailable,
    /// The book's region differs from the configured region
    RegionMismatch,
    /// The book's ASIN is already in the existing library
    AlreadyOwned,
    /// Format is not "unabridged"
    NotUnabridged,
    /// No series position defined
    NoPosition,
    /// Position spans multiple slots ("1-2")
    MultiSlotPosition,
    /// Sub-position slot ("3.5")
    SubPosition,
    /// Releases today or later
    FutureRelease,
    /// Released strictly before today
    PastRelease,
    /// An owned book shares title+subtitle and a series
    TitleMatchesOwned,
    /// An owned book shares series name and position
    PositionMatchesOwned,
    /// An accepted missing book shares title+subtitle and a series
    TitleMatchesMissing,
    /// An accepted missing book shares series name and position
    PositionMatchesMissing,
    /// The ASIN is already in the missing list (de-dup safety net)
    AlreadyAccepted,
}

impl Rejection {
    /// Short identifier of the gate that rejected, for diagnostics.
    pub fn check_name(&self) -> &'static str {
        match self {
            Rejection::Unavailable => "available",
            Rejection::RegionMismatch => "region",
            Rejection::AlreadyOwned => "alreadyOwned",
            Rejection::NotUnabridged => "unabridged",
            Rejection::NoPosition => "noPosition",
            Rejection::MultiSlotPosition => "multiPosition",
            Rejection::SubPosition => "subPosition",
            Rejection::FutureRelease => "futureDate",
            Rejection::PastRelease => "pastDate",
            Rejection::TitleMatchesOwned => "titleSubtitle",
            Rejection::PositionMatchesOwned => "sameSeriesPosition",
            Rejection::TitleMatchesMissing => "titleSubtitleInMissing",
            Rejection::PositionMatchesMissing => "sameSeriesPositionInMissing",
            Rejection::AlreadyAccepted => "alreadyInMissing",
        }
    }

    /// Whether the candidate failed viability outright rather than being
    /// skipped by an option gate.
    pub fn is_viability(&self) -> bool {
        matches!(self, Rejection::Unavailable | Rejection::RegionMismatch)
    }
}

/// Notification passed to the rejection sink for every excluded candidate.
#[derive(Debug)]
pub struct RejectNotice<'a> {
    /// The excluded candidate
    pub book: &'a BookRecord,
    /// The series the candidate was discovered under
    pub series_asin: &'a str,
    /// Which gate rejected it
    pub rejection: Rejection,
}

/// Normalizes text for diacritic-, punctuation-, and case-insensitive
/// comparison.
///
/// Unicode-decomposes, strips combining marks, collapses punctuation,
/// symbols, and whitespace runs to single spaces, trims, and lowercases.
///
/// # Examples
///
/// ```rust
/// use shelfgap::filter::normalize_text;
///
/// assert_eq!(normalize_text("Élantris: Part One!"), "elantris part one");
/// assert_eq!(normalize_text("  Mañana  "), "manana");
/// ```
pub fn normalize_text(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn title_key(book: &BookRecord) -> String {
    match &book.subtitle {
        Some(subtitle) => normalize_text(&format!("{} {}", book.title, subtitle)),
        None => normalize_text(&book.title),
    }
}

/// Per-candidate evaluation state threaded through the gate chain.
///
/// Constructed once per candidate book and discarded as soon as the chain
/// has run. Derived fields (normalized title, parsed positions) are computed
/// here so individual gates stay cheap and pure.
struct GateContext<'a> {
    book: &'a BookRecord,
    title_key: String,
    positions: Vec<SeriesPosition>,
    existing: &'a ExistingIndex<'a>,
    missing: &'a [BookRecord],
    options: &'a FilterOptions,
    today: NaiveDate,
}

impl<'a> GateContext<'a> {
    fn new(
        book: &'a BookRecord,
        existing: &'a ExistingIndex<'a>,
        missing: &'a [BookRecord],
        options: &'a FilterOptions,
        today: NaiveDate,
    ) -> Self {
        Self {
            book,
            title_key: title_key(book),
            positions: book.series.iter().map(|m| m.parsed_position()).collect(),
            existing,
            missing,
            options,
            today,
        }
    }
}

/// Pre-indexed view of the existing library, built once per run.
struct ExistingIndex<'a> {
    books: &'a [BookRecord],
    asins: HashSet<&'a str>,
    title_keys: Vec<String>,
}

impl<'a> ExistingIndex<'a> {
    fn new(books: &'a [BookRecord]) -> Self {
        Self {
            books,
            asins: books.iter().map(|b| b.asin.as_str()).collect(),
            title_keys: books.iter().map(title_key).collect(),
        }
    }
}

fn shares_position(a: &BookRecord, b: &BookRecord) -> bool {
    a.series.iter().any(|m| {
        b.series
            .iter()
            .any(|o| o.name == m.name && o.position_key() == m.position_key())
    })
}

// Gate chain, in evaluation order. Each gate is a pure predicate over the
// context returning the rejection reason, or None to pass.

fn gate_viability(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.book.is_available {
        return Some(Rejection::Unavailable);
    }
    if ctx.book.region != ctx.options.region {
        return Some(Rejection::RegionMismatch);
    }
    None
}

fn gate_already_owned(ctx: &GateContext) -> Option<Rejection> {
    ctx.existing
        .asins
        .contains(ctx.book.asin.as_str())
        .then_some(Rejection::AlreadyOwned)
}

fn gate_unabridged(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.only_unabridged {
        return None;
    }
    let unabridged = ctx
        .book
        .book_format
        .as_deref()
        .map(|f| f.eq_ignore_ascii_case("unabridged"))
        .unwrap_or(false);
    (!unabridged).then_some(Rejection::NotUnabridged)
}

fn gate_no_position(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_no_position_books {
        return None;
    }
    ctx.positions
        .iter()
        .all(|p| *p == SeriesPosition::Unknown)
        .then_some(Rejection::NoPosition)
}

fn gate_multi_position(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_multi_books {
        return None;
    }
    ctx.positions
        .iter()
        .any(|p| p.spans_multiple())
        .then_some(Rejection::MultiSlotPosition)
}

fn gate_sub_position(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_sub_position_books {
        return None;
    }
    ctx.positions
        .iter()
        .any(|p| p.is_sub_position())
        .then_some(Rejection::SubPosition)
}

fn gate_future_release(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_future_date_books {
        return None;
    }
    match ctx.book.release_date {
        Some(date) if date >= ctx.today => Some(Rejection::FutureRelease),
        _ => None,
    }
}

fn gate_past_release(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_past_date_books {
        return None;
    }
    match ctx.book.release_date {
        Some(date) if date < ctx.today => Some(Rejection::PastRelease),
        _ => None,
    }
}

fn gate_title_vs_owned(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_title_subtitle {
        return None;
    }
    ctx.existing
        .books
        .iter()
        .zip(&ctx.existing.title_keys)
        .any(|(owned, key)| *key == ctx.title_key && owned.shares_series_with(ctx.book))
        .then_some(Rejection::TitleMatchesOwned)
}

fn gate_position_vs_owned(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_same_series_position {
        return None;
    }
    ctx.existing
        .books
        .iter()
        .any(|owned| shares_position(owned, ctx.book))
        .then_some(Rejection::PositionMatchesOwned)
}

fn gate_title_vs_missing(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_title_subtitle_in_missing {
        return None;
    }
    ctx.missing
        .iter()
        .any(|accepted| title_key(accepted) == ctx.title_key && accepted.shares_series_with(ctx.book))
        .then_some(Rejection::TitleMatchesMissing)
}

fn gate_position_vs_missing(ctx: &GateContext) -> Option<Rejection> {
    if !ctx.options.ignore_same_series_position_in_missing {
        return None;
    }
    ctx.missing
        .iter()
        .any(|accepted| shares_position(accepted, ctx.book))
        .then_some(Rejection::PositionMatchesMissing)
}

const GATES: &[fn(&GateContext) -> Option<Rejection>] = &[
    gate_viability,
    gate_already_owned,
    gate_unabridged,
    gate_no_position,
    gate_multi_position,
    gate_sub_position,
    gate_future_release,
    gate_past_release,
    gate_title_vs_owned,
    gate_position_vs_owned,
    gate_title_vs_missing,
    gate_position_vs_missing,
];

fn evaluate(ctx: &GateContext) -> Option<Rejection> {
    GATES.iter().find_map(|gate| gate(ctx))
}

/// Reduces collected series rosters against the existing library into the
/// ordered missing-book list.
///
/// Series are processed in the order given, and books within a series in
/// catalog order; these orders decide which duplicate wins for the
/// "missing so far" de-dup gates. Every rejection is reported to `on_reject`
/// when a sink is supplied; the sink can never affect the returned list.
pub fn find_missing_books(
    existing: &[BookRecord],
    series_metadata: &[SeriesBooks],
    options: &FilterOptions,
    mut on_reject: Option<&mut dyn FnMut(RejectNotice<'_>)>,
) -> Vec<BookRecord> {
    let today = options
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let index = ExistingIndex::new(existing);

    let mut missing: Vec<BookRecord> = Vec::new();
    let mut accepted_asins: HashSet<String> = HashSet::new();

    for roster in series_metadata {
        for book in &roster.response {
            let ctx = GateContext::new(book, &index, &missing, options, today);
            let rejection = match evaluate(&ctx) {
                Some(rejection) => Some(rejection),
                // Safety net: the same book can appear in several rosters.
                None if accepted_asins.contains(&book.asin) => Some(Rejection::AlreadyAccepted),
                None => None,
            };

            match rejection {
                Some(rejection) => {
                    if let Some(sink) = on_reject.as_deref_mut() {
                        sink(RejectNotice {
                            book,
                            series_asin: &roster.series_asin,
                            rejection,
                        });
                    }
                }
                None => {
                    let mut found = book.clone();
                    found.series_asin = Some(roster.series_asin.clone());
                    accepted_asins.insert(found.asin.clone());
                    missing.push(found);
                }
            }
        }
    }

    missing
}
