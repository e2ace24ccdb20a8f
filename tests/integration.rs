//! Full-workflow tests
//!
//! Drives the whole run against an in-memory catalog: discovery, roster
//! collection, filtering, grouping, and export.

use std::collections::HashMap;

use async_trait::async_trait;
use shelfgap::catalog::{CatalogClient, FetchPayload, RateInfo};
use shelfgap::collect::{Collector, NullSink};
use shelfgap::error::{Error, Result};
use shelfgap::export::{rows_from_groups, to_csv};
use shelfgap::filter::find_missing_books;
use shelfgap::group::group_by_series;
use shelfgap::trace::FilterTrace;
use shelfgap::types::{BookRecord, FilterOptionsBuilder};
use shelfgap::visibility::HiddenSet;

mod common;
use common::{book, in_series_with_asin};

struct StaticCatalog {
    books: HashMap<String, BookRecord>,
    series: HashMap<String, Vec<BookRecord>>,
}

#[async_trait]
impl CatalogClient for StaticCatalog {
    async fn book(&self, asin: &str, _region: &str) -> Result<FetchPayload<BookRecord>> {
        let data = self.books.get(asin).cloned().ok_or_else(|| Error::http(404))?;
        Ok(FetchPayload {
            data,
            rate: RateInfo {
                limit: Some(100),
                remaining: Some(99),
                cached: true,
            },
        })
    }

    async fn series(&self, asin: &str, _region: &str) -> Result<FetchPayload<Vec<BookRecord>>> {
        let data = self.series.get(asin).cloned().ok_or_else(|| Error::http(404))?;
        Ok(FetchPayload {
            data,
            rate: RateInfo {
                limit: Some(100),
                remaining: Some(99),
                cached: true,
            },
        })
    }
}

fn named(mut b: BookRecord, title: &str) -> BookRecord {
    b.title = title.to_string();
    b
}

/// The user owns book 1 of a three-book series; books 2 and 3 are missing.
fn fixture() -> (Vec<BookRecord>, StaticCatalog) {
    let owned = named(
        in_series_with_asin(book("A1", "us"), "Broken Earth", "S1", Some("1")),
        "The Fifth Season",
    );
    let roster = vec![
        owned.clone(),
        named(
            in_series_with_asin(book("A2", "us"), "Broken Earth", "S1", Some("2")),
            "The Obelisk Gate",
        ),
        named(
            in_series_with_asin(book("A3", "us"), "Broken Earth", "S1", Some("3")),
            "The Stone Sky",
        ),
    ];

    let catalog = StaticCatalog {
        books: HashMap::from([("A1".to_string(), owned.clone())]),
        series: HashMap::from([("S1".to_string(), roster)]),
    };
    (vec![owned], catalog)
}

#[tokio::test]
async fn full_run_surfaces_the_two_missing_sequels() {
    let (existing, catalog) = fixture();
    let hidden = HiddenSet::default();

    let mut collector = Collector::new(&catalog, "us");
    let owned_asins: Vec<String> = existing.iter().map(|b| b.asin.clone()).collect();
    let series = collector.discover_series(&owned_asins, false, &NullSink).await;
    assert_eq!(series, vec!["S1".to_string()]);

    let rosters = collector.collect_series(&series, &hidden, &NullSink).await;

    let options = FilterOptionsBuilder::default().region("us").build().unwrap();
    let trace = FilterTrace::start();
    let mut sink = trace.reject_sink();
    let missing = find_missing_books(&existing, &rosters, &options, Some(&mut sink));

    let titles: Vec<&str> = missing.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["The Obelisk Gate", "The Stone Sky"]);
    assert!(missing.iter().all(|b| b.series_asin.as_deref() == Some("S1")));

    // The owned book was rejected by the already-owned gate, once.
    let events = trace.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].check, "alreadyOwned");
    assert_eq!(events[0].asin, "A1");

    let groups = group_by_series(&missing, &hidden, false);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].series, "Broken Earth");
    assert_eq!(groups[0].books.len(), 2);

    let csv = to_csv(&rows_from_groups(&groups));
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("The Obelisk Gate"));
}
