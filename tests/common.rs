//! Common test fixtures
//!
//! Shared builders used across all test modules.

use chrono::NaiveDate;
use shelfgap::types::{BookRecord, SeriesMembership};

/// An available book in the given region with no series memberships.
#[allow(dead_code)]
pub fn book(asin: &str, region: &str) -> BookRecord {
    BookRecord {
        asin: asin.to_string(),
        title: format!("Title {}", asin),
        region: region.to_string(),
        is_available: true,
        ..Default::default()
    }
}

/// Adds a positioned series membership.
#[allow(dead_code)]
pub fn in_series(mut book: BookRecord, name: &str, position: &str) -> BookRecord {
    book.series.push(SeriesMembership::new(name, position));
    book
}

/// Adds a position-less series membership.
#[allow(dead_code)]
pub fn in_series_unpositioned(mut book: BookRecord, name: &str) -> BookRecord {
    book.series.push(SeriesMembership {
        name: name.to_string(),
        asin: None,
        position: None,
    });
    book
}

/// Adds a series membership that also carries the series ASIN.
#[allow(dead_code)]
pub fn in_series_with_asin(
    mut book: BookRecord,
    name: &str,
    series_asin: &str,
    position: Option<&str>,
) -> BookRecord {
    book.series.push(SeriesMembership {
        name: name.to_string(),
        asin: Some(series_asin.to_string()),
        position: position.map(|p| p.to_string()),
    });
    book
}

#[allow(dead_code)]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
