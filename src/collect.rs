//! Rate-limited sequential collection of catalog metadata.
//!
//! The collector walks a list of identifiers in order and fetches metadata
//! for each through a [`CatalogClient`], self-throttling from the quota
//! headers every response carries. Fetches are deliberately *not*
//! parallelized: the throttling logic depends on observing one response's
//! headers before deciding whether and how long to delay the next request,
//! so parallel requests would make the remaining-quota feedback unreliable.
//!
//! Per-item failures (network error, malformed payload) are logged as
//! warnings and the item is skipped; the batch never aborts on a single
//! item's failure.
//!
//! # Examples
//!
//! ```rust,no_run
//! use shelfgap::collect::{Collector, NullSink};
//! use shelfgap::catalog::HttpCatalogClient;
//! use shelfgap::visibility::HiddenSet;
//!
//! # async fn example() {
//! let client = HttpCatalogClient::new("https://api.audnex.us");
//! let mut collector = Collector::new(&client, "us");
//!
//! let owned = vec!["B0AAA".to_string(), "B0BBB".to_string()];
//! let series = collector
//!     .discover_series(&owned, false, &NullSink)
//!     .await;
//! let rosters = collector
//!     .collect_series(&series, &HiddenSet::default(), &NullSink)
//!     .await;
//! # let _ = rosters;
//! # }
//! ```

use std::time::{Duration, Instant};

use crate::{
    catalog::{CatalogClient, RateInfo},
    types::SeriesBooks,
    visibility::HiddenSet,
};

/// Default length of the catalog's shared rate-limit window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Fixed overhead added per remaining request when estimating a wait.
const PER_REQUEST_OVERHEAD: Duration = Duration::from_millis(500);

/// Receiver for collection progress and rate-limit status.
///
/// The collector reports after every successfully processed item and around
/// every throttling pause. [`NullSink`] discards everything.
pub trait ProgressSink: Send + Sync {
    /// Called after each successfully processed item.
    fn progress(&self, done: usize, total: usize);

    /// Called when a throttling pause begins.
    fn rate_limit_started(&self, wait: Duration);

    /// Called when the throttling pause ends.
    fn rate_limit_ended(&self);
}

/// Progress sink that discards all notifications.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&self, _done: usize, _total: usize) {}
    fn rate_limit_started(&self, _wait: Duration) {}
    fn rate_limit_ended(&self) {}
}

/// Timing policy for the catalog's shared rate-limit window.
///
/// Tracks when the current window started and computes how long to pause
/// when the quota runs out. The arithmetic lives in [`RateGovernor::backoff`]
/// so it is testable without a clock.
#[derive(Debug)]
pub struct RateGovernor {
    window: Duration,
    window_start: Instant,
}

impl RateGovernor {
    /// Creates a governor with the given window length.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
        }
    }

    /// Pure wait computation: time left in the window, plus an estimated
    /// extra delay of one full window per `limit` remaining requests, plus a
    /// fixed overhead for each remaining request beyond those full windows.
    pub fn backoff(
        window_left: Duration,
        window: Duration,
        limit: u32,
        remaining_in_batch: u32,
    ) -> Duration {
        if limit == 0 {
            return window_left;
        }
        let full_windows = remaining_in_batch / limit;
        let leftover = remaining_in_batch % limit;
        window_left + window * full_windows + PER_REQUEST_OVERHEAD * leftover
    }

    /// How long to pause after a response, if at all.
    ///
    /// Cached responses never trigger a pause. A pause happens only when the
    /// quota is exhausted (`remaining == 0`).
    pub fn delay_after(&self, rate: &RateInfo, remaining_in_batch: usize) -> Option<Duration> {
        if rate.cached || rate.remaining != Some(0) {
            return None;
        }
        let window_left = self
            .window
            .checked_sub(self.window_start.elapsed())
            .unwrap_or(Duration::ZERO);
        let limit = rate.limit.unwrap_or(0);
        Some(Self::backoff(
            window_left,
            self.window,
            limit,
            remaining_in_batch as u32,
        ))
    }

    /// Marks the start of a fresh window, called once a pause ends.
    pub fn reset_window(&mut self) {
        self.window_start = Instant::now();
    }
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

/// Sequential, rate-limit-aware metadata collector.
///
/// Runs two passes against the catalog: the book pass resolves the user's
/// owned books to canonical series identifiers, and the series pass fetches
/// the full roster for each of those series.
pub struct Collector<'a, C: CatalogClient + ?Sized> {
    client: &'a C,
    region: String,
    governor: RateGovernor,
}

impl<'a, C: CatalogClient + ?Sized> Collector<'a, C> {
    /// Creates a collector for the given client and region with the default
    /// rate-limit window.
    pub fn new(client: &'a C, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
            governor: RateGovernor::default(),
        }
    }

    /// Overrides the rate-limit window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.governor = RateGovernor::new(window);
        self
    }

    async fn throttle(&mut self, rate: &RateInfo, remaining_in_batch: usize, sink: &dyn ProgressSink) {
        if let Some(wait) = self.governor.delay_after(rate, remaining_in_batch) {
            sink.rate_limit_started(wait);
            tokio::time::sleep(wait).await;
            sink.rate_limit_ended();
            self.governor.reset_window();
        }
    }

    /// Book pass: resolves owned book ASINs to the series they belong to.
    ///
    /// Returns the discovered series ASINs de-duplicated in first-seen order.
    /// Only the first series membership of each book is harvested unless
    /// `include_sub_series` is set. The throttling estimate assumes each
    /// remaining book may cost two future requests: its own lookup plus an
    /// anticipated series lookup.
    pub async fn discover_series(
        &mut self,
        book_asins: &[String],
        include_sub_series: bool,
        sink: &dyn ProgressSink,
    ) -> Vec<String> {
        let total = book_asins.len();
        let mut seen = std::collections::HashSet::new();
        let mut discovered = Vec::new();

        for (index, asin) in book_asins.iter().enumerate() {
            let payload = match self.client.book(asin, &self.region).await {
                Ok(payload) => payload,
                Err(e) => {
                    log::warn!("skipping book {}: {}", asin, e);
                    continue;
                }
            };

            let memberships: &[_] = if include_sub_series {
                &payload.data.series
            } else {
                &payload.data.series[..payload.data.series.len().min(1)]
            };
            for membership in memberships {
                if let Some(series_asin) = &membership.asin {
                    if seen.insert(series_asin.clone()) {
                        discovered.push(series_asin.clone());
                    }
                }
            }

            sink.progress(index + 1, total);

            // Each unprocessed book may still trigger its own lookup plus a
            // series lookup afterwards.
            let remaining = total - (index + 1) + total;
            self.throttle(&payload.rate, remaining, sink).await;
        }

        discovered
    }

    /// Series pass: fetches the full roster of each series.
    ///
    /// Series hidden by ASIN are skipped before any fetch; books that are
    /// themselves hidden are dropped from the roster before inclusion.
    pub async fn collect_series(
        &mut self,
        series_asins: &[String],
        hidden: &HiddenSet,
        sink: &dyn ProgressSink,
    ) -> Vec<SeriesBooks> {
        let total = series_asins.len();
        let mut collected = Vec::new();

        for (index, series_asin) in series_asins.iter().enumerate() {
            if hidden.is_hidden_by_asin(series_asin) {
                sink.progress(index + 1, total);
                continue;
            }

            let payload = match self.client.series(series_asin, &self.region).await {
                Ok(payload) => payload,
                Err(e) => {
                    log::warn!("skipping series {}: {}", series_asin, e);
                    continue;
                }
            };

            let books = payload
                .data
                .into_iter()
                .filter(|book| {
                    !hidden.is_hidden_by_asin(&book.asin)
                        && !book
                            .series
                            .iter()
                            .any(|m| hidden.is_hidden_book(&m.name, &book.title))
                })
                .collect();
            collected.push(SeriesBooks::new(series_asin.clone(), books));

            sink.progress(index + 1, total);

            let remaining = total - (index + 1);
            self.throttle(&payload.rate, remaining, sink).await;
        }

        collected
    }
}
