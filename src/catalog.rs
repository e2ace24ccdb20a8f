//! Metadata fetch client for the public audiobook catalog.
//!
//! This module provides the networking seam between the collector and the
//! catalog API:
//!
//! - **HTTP Client**: a global, configured reqwest client with connection
//!   pooling and a fixed per-request timeout
//! - **Rate feedback**: quota headers from every response, parsed into
//!   [`RateInfo`] and reported upward so the collector can self-throttle
//! - **Error mapping**: transport, protocol, and payload failures normalized
//!   into the crate [`Error`](crate::Error) taxonomy
//!
//! The [`CatalogClient`] trait is what the collector depends on; tests and
//! alternative transports provide their own implementations.
//!
//! # Examples
//!
//! ```rust,no_run
//! use shelfgap::catalog::{CatalogClient, HttpCatalogClient};
//!
//! # async fn example() -> shelfgap::Result<()> {
//! let client = HttpCatalogClient::new("https://api.audnex.us");
//! let payload = client.book("B0EXAMPLE", "us").await?;
//! println!("limit: {:?}", payload.rate.limit);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Response};

use crate::{
    error::{Error, Result},
    types::BookRecord,
};

/// Global HTTP client with connection pooling, compression, and a fixed
/// timeout. Created lazily on first use and shared by all catalog and
/// library requests.
pub(crate) static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(8))
        .user_agent("shelfgap/0.1.0")
        .pool_max_idle_per_host(4)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
});

/// Quota state reported by the catalog on every response.
///
/// `cached` responses do not count against the quota and never trigger a
/// delay. `limit` and `remaining` are absent when the catalog omits the
/// headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateInfo {
    /// Requests allowed per rate-limit window
    pub limit: Option<u32>,

    /// Requests left in the current window
    pub remaining: Option<u32>,

    /// Whether this response was served from the catalog's cache
    pub cached: bool,
}

impl RateInfo {
    /// Parses quota headers from a catalog response.
    pub fn from_response(response: &Response) -> Self {
        let header_u32 = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u32>().ok())
        };
        let cached = response
            .headers()
            .get("cached")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        RateInfo {
            limit: header_u32("requestLimit"),
            remaining: header_u32("requestRemaining"),
            cached,
        }
    }
}

/// A fetched payload together with the quota state observed on the response.
#[derive(Debug, Clone)]
pub struct FetchPayload<T> {
    /// The decoded response body
    pub data: T,

    /// Quota headers from this response
    pub rate: RateInfo,
}

/// Interface the collector fetches catalog metadata through.
///
/// Implementations must perform one HTTP request per call and report the
/// quota headers of that exact response; the collector's throttling depends
/// on observing each response before deciding whether to delay the next
/// request.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one book by ASIN.
    async fn book(&self, asin: &str, region: &str) -> Result<FetchPayload<BookRecord>>;

    /// Fetches the full roster of one series by ASIN.
    async fn series(&self, asin: &str, region: &str) -> Result<FetchPayload<Vec<BookRecord>>>;
}

/// HTTP implementation of [`CatalogClient`] against the public catalog API.
pub struct HttpCatalogClient {
    api_base: String,
}

impl HttpCatalogClient {
    /// Creates a client for the given API base URL (no trailing slash).
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
        }
    }

    async fn get(&self, path: &str, region: &str) -> Result<(serde_json::Value, RateInfo)> {
        let url = format!("{}{}?region={}", self.api_base, path, region);
        let response = CLIENT.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(Error::http(response.status().as_u16()));
        }

        let rate = RateInfo::from_response(&response);
        let body = response.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        Ok((value, rate))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn book(&self, asin: &str, region: &str) -> Result<FetchPayload<BookRecord>> {
        let (value, rate) = self.get(&format!("/books/{}", asin), region).await?;
        let data: BookRecord = serde_json::from_value(value)?;
        Ok(FetchPayload { data, rate })
    }

    async fn series(&self, asin: &str, region: &str) -> Result<FetchPayload<Vec<BookRecord>>> {
        let (value, rate) = self.get(&format!("/series/{}/books", asin), region).await?;

        // A non-array roster fails to decode and surfaces as a Json error;
        // the collector skips this series and the batch continues.
        let data: Vec<BookRecord> = serde_json::from_value(value)?;
        Ok(FetchPayload { data, rate })
    }
}
