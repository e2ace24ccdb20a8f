//! Collector tests
//!
//! Runs both collection passes against an in-memory catalog. Every fake
//! response is marked cached so no test ever sleeps.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shelfgap::catalog::{CatalogClient, FetchPayload, RateInfo};
use shelfgap::collect::{Collector, ProgressSink};
use shelfgap::error::{Error, Result};
use shelfgap::types::{BookRecord, HiddenItem};
use shelfgap::visibility::HiddenSet;

mod common;
use common::{book, in_series, in_series_with_asin};

#[derive(Default)]
struct FakeCatalog {
    books: HashMap<String, BookRecord>,
    series: HashMap<String, Vec<BookRecord>>,
    fail: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn with_book(mut self, b: BookRecord) -> Self {
        self.books.insert(b.asin.clone(), b);
        self
    }

    fn with_series(mut self, asin: &str, roster: Vec<BookRecord>) -> Self {
        self.series.insert(asin.to_string(), roster);
        self
    }

    fn failing(mut self, asin: &str) -> Self {
        self.fail.insert(asin.to_string());
        self
    }

    fn cached_rate() -> RateInfo {
        RateInfo {
            limit: Some(100),
            remaining: Some(50),
            cached: true,
        }
    }
}

#[async_trait]
impl CatalogClient for FakeCatalog {
    async fn book(&self, asin: &str, _region: &str) -> Result<FetchPayload<BookRecord>> {
        self.calls.lock().push(format!("book:{}", asin));
        if self.fail.contains(asin) {
            return Err(Error::http(500));
        }
        let data = self.books.get(asin).cloned().ok_or_else(|| Error::http(404))?;
        Ok(FetchPayload {
            data,
            rate: Self::cached_rate(),
        })
    }

    async fn series(&self, asin: &str, _region: &str) -> Result<FetchPayload<Vec<BookRecord>>> {
        self.calls.lock().push(format!("series:{}", asin));
        if self.fail.contains(asin) {
            return Err(Error::http(500));
        }
        let data = self.series.get(asin).cloned().ok_or_else(|| Error::http(404))?;
        Ok(FetchPayload {
            data,
            rate: Self::cached_rate(),
        })
    }
}

#[derive(Default)]
struct CountingSink {
    progress: Mutex<Vec<(usize, usize)>>,
}

impl ProgressSink for CountingSink {
    fn progress(&self, done: usize, total: usize) {
        self.progress.lock().push((done, total));
    }
    fn rate_limit_started(&self, _wait: Duration) {}
    fn rate_limit_ended(&self) {}
}

fn asins(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn discovery_dedups_series_in_first_seen_order() {
    let catalog = FakeCatalog::default()
        .with_book(in_series_with_asin(book("A1", "us"), "X", "S1", Some("1")))
        .with_book(in_series_with_asin(book("A2", "us"), "Y", "S2", Some("1")))
        .with_book(in_series_with_asin(book("A3", "us"), "X", "S1", Some("2")));

    let mut collector = Collector::new(&catalog, "us");
    let sink = CountingSink::default();
    let series = collector
        .discover_series(&asins(&["A1", "A2", "A3"]), false, &sink)
        .await;

    assert_eq!(series, vec!["S1".to_string(), "S2".to_string()]);
    assert_eq!(
        *sink.progress.lock(),
        vec![(1, 3), (2, 3), (3, 3)]
    );
}

#[tokio::test]
async fn discovery_harvests_only_first_membership_by_default() {
    let multi = in_series_with_asin(
        in_series_with_asin(book("A1", "us"), "Main", "S1", Some("1")),
        "Sub",
        "S2",
        Some("1"),
    );
    let catalog = FakeCatalog::default().with_book(multi);

    let mut collector = Collector::new(&catalog, "us");
    let sink = CountingSink::default();
    let series = collector
        .discover_series(&asins(&["A1"]), false, &sink)
        .await;
    assert_eq!(series, vec!["S1".to_string()]);

    let mut collector = Collector::new(&catalog, "us");
    let series = collector.discover_series(&asins(&["A1"]), true, &sink).await;
    assert_eq!(series, vec!["S1".to_string(), "S2".to_string()]);
}

#[tokio::test]
async fn discovery_skips_failed_items_and_continues() {
    let catalog = FakeCatalog::default()
        .with_book(in_series_with_asin(book("A1", "us"), "X", "S1", Some("1")))
        .failing("A2")
        .with_book(in_series_with_asin(book("A3", "us"), "Y", "S2", Some("1")));

    let mut collector = Collector::new(&catalog, "us");
    let sink = CountingSink::default();
    let series = collector
        .discover_series(&asins(&["A1", "A2", "A3"]), false, &sink)
        .await;

    assert_eq!(series, vec!["S1".to_string(), "S2".to_string()]);
    // Failed items report no progress.
    assert_eq!(*sink.progress.lock(), vec![(1, 3), (3, 3)]);
}

#[tokio::test]
async fn series_pass_fetches_rosters_in_order() {
    let catalog = FakeCatalog::default()
        .with_series("S1", vec![in_series(book("A1", "us"), "X", "1")])
        .with_series("S2", vec![in_series(book("A2", "us"), "Y", "1")]);

    let mut collector = Collector::new(&catalog, "us");
    let rosters = collector
        .collect_series(
            &asins(&["S1", "S2"]),
            &HiddenSet::default(),
            &CountingSink::default(),
        )
        .await;

    assert_eq!(rosters.len(), 2);
    assert_eq!(rosters[0].series_asin, "S1");
    assert_eq!(rosters[1].series_asin, "S2");
    assert_eq!(
        *catalog.calls.lock(),
        vec!["series:S1".to_string(), "series:S2".to_string()]
    );
}

#[tokio::test]
async fn hidden_series_is_skipped_without_a_fetch() {
    let catalog = FakeCatalog::default()
        .with_series("S1", vec![in_series(book("A1", "us"), "X", "1")])
        .with_series("S2", vec![in_series(book("A2", "us"), "Y", "1")]);
    let hidden = HiddenSet::from_items(&[HiddenItem::series("X", "S1")]);

    let mut collector = Collector::new(&catalog, "us");
    let rosters = collector
        .collect_series(&asins(&["S1", "S2"]), &hidden, &CountingSink::default())
        .await;

    assert_eq!(rosters.len(), 1);
    assert_eq!(rosters[0].series_asin, "S2");
    assert_eq!(*catalog.calls.lock(), vec!["series:S2".to_string()]);
}

#[tokio::test]
async fn hidden_books_are_dropped_from_rosters() {
    let mut kept = in_series(book("A1", "us"), "X", "1");
    kept.title = "Mort".to_string();
    let mut dropped = in_series(book("A2", "us"), "X", "2");
    dropped.title = "Eric".to_string();
    let catalog = FakeCatalog::default().with_series("S1", vec![kept, dropped]);
    let hidden = HiddenSet::from_items(&[HiddenItem::book("X", "Eric", "A2")]);

    let mut collector = Collector::new(&catalog, "us");
    let rosters = collector
        .collect_series(&asins(&["S1"]), &hidden, &CountingSink::default())
        .await;

    assert_eq!(rosters.len(), 1);
    assert_eq!(rosters[0].response.len(), 1);
    assert_eq!(rosters[0].response[0].asin, "A1");
}

#[tokio::test]
async fn series_pass_skips_failed_series_and_continues() {
    let catalog = FakeCatalog::default()
        .failing("S1")
        .with_series("S2", vec![in_series(book("A2", "us"), "Y", "1")]);

    let mut collector = Collector::new(&catalog, "us");
    let rosters = collector
        .collect_series(
            &asins(&["S1", "S2"]),
            &HiddenSet::default(),
            &CountingSink::default(),
        )
        .await;

    assert_eq!(rosters.len(), 1);
    assert_eq!(rosters[0].series_asin, "S2");
}
