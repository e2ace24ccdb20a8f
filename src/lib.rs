//! # shelfgap - Find the missing books in series you already own
//!
//! shelfgap compares a personal audiobook library (hosted on a self-run
//! media server) against canonical series metadata from a public catalog and
//! surfaces which books in owned series are missing. It features a
//! rate-limit-aware sequential collector, an ordered chain of toggleable
//! exclusion gates, de-duplication against both the existing library and the
//! in-progress result set, and deterministic grouping for display and export.
//!
//! ## Features
//!
//! - **Rate-Limited Collection**: sequential catalog fetches self-throttled
//!   from quota headers, so a throttled API never aborts a batch
//! - **Gated Filter Pipeline**: twelve independently toggleable exclusion
//!   rules evaluated in a fixed order, first rejection wins
//! - **Hidden Items**: user-hidden series and books excluded everywhere,
//!   backed by a pluggable store
//! - **Deterministic Output**: identical inputs and options always produce
//!   identical ordered results
//! - **Structured Diagnostics**: optional append-only recording of every
//!   filtering decision, with zero effect on results
//! - **Export**: flat CSV/JSON rows downstream of grouping
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shelfgap::prelude::*;
//! use shelfgap::error::Result;
//! use shelfgap::catalog::HttpCatalogClient;
//! use shelfgap::library::{Credentials, LibraryClient};
//! use shelfgap::visibility::HiddenSet;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let credentials = Credentials {
//!         server_url: "https://abs.example.com".to_string(),
//!         username: "me".to_string(),
//!         password: "secret".to_string(),
//!     };
//!     let contents = LibraryClient::fetch_contents(&credentials).await?;
//!
//!     let client = HttpCatalogClient::new("https://api.audnex.us");
//!     let mut collector = Collector::new(&client, "us");
//!
//!     let owned: Vec<String> = contents
//!         .series_first_asin
//!         .iter()
//!         .map(|b| b.asin.clone())
//!         .collect();
//!     let series = collector.discover_series(&owned, false, &NullSink).await;
//!     let rosters = collector
//!         .collect_series(&series, &HiddenSet::default(), &NullSink)
//!         .await;
//!
//!     let options = FilterOptionsBuilder::default()
//!         .region("us")
//!         .only_unabridged(true)
//!         .build()
//!         .unwrap();
//!     let existing = Vec::new(); // owned books resolved to BookRecords
//!     let missing = find_missing_books(&existing, &rosters, &options, None);
//!
//!     let groups = group_by_series(&missing, &HiddenSet::default(), false);
//!     for group in &groups {
//!         println!("{}: {} missing", group.series, group.books.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`collect`]: rate-limited sequential metadata collection
//! - [`filter`]: the missing-book filter pipeline
//! - [`group`]: grouping and deterministic sorting
//! - [`catalog`] / [`library`]: the two external HTTP collaborators
//! - [`visibility`]: user-hidden series and books
//! - [`trace`]: structured diagnostics
//! - [`export`]: CSV/JSON row production
//! - [`error`]: error taxonomy
//!
//! ## Why sequential fetches?
//!
//! The catalog enforces a shared rate-limit window and reports remaining
//! quota on every response. The collector must observe one response's
//! headers before deciding whether to delay the next request, so fetches are
//! awaited one at a time by design; parallel requests would make the quota
//! feedback unreliable.

pub mod catalog;
pub mod collect;
pub mod error;
pub mod export;
pub mod filter;
pub mod group;
pub mod library;
pub mod trace;
pub mod types;
pub mod visibility;

/// Prelude module for convenient imports.
///
/// Re-exports the most commonly used types and functions so a single
/// `use shelfgap::prelude::*;` covers typical usage.
pub mod prelude {
    pub use crate::{
        collect::{Collector, NullSink, ProgressSink},
        filter::{find_missing_books, normalize_text},
        group::{group_by_series, sort_by_series_then_title},
        types::{
            BookRecord, FilterOptions, FilterOptionsBuilder, HiddenItem, SeriesBooks, SeriesGroup,
            SeriesMembership, SeriesPosition,
        },
        visibility::{HiddenSet, VisibilityStore},
    };
}

// Re-export main types at crate root for direct access
pub use catalog::{CatalogClient, FetchPayload, RateInfo};
pub use collect::{Collector, NullSink, ProgressSink, RateGovernor};
pub use error::{Error, Result};
pub use filter::{RejectNotice, Rejection, find_missing_books, normalize_text};
pub use group::{group_by_series, sort_by_series_then_title};
pub use trace::{FilterTrace, RejectEvent};
pub use types::{
    BookRecord, FilterOptions, FilterOptionsBuilder, HiddenItem, SeriesBooks, SeriesGroup,
    SeriesMembership, SeriesPosition,
};
pub use visibility::{HiddenSet, MemoryVisibilityStore, VisibilityStore};
