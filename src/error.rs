//! Error types and result handling for shelfgap operations.
//!
//! All fallible operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Validation errors**: missing or malformed credentials/identifiers,
//!   raised before any network call and never retried
//! - **Network errors**: connection failures, timeouts, transport problems
//! - **Http errors**: non-2xx responses from the catalog or library server
//! - **Json errors**: malformed payloads
//! - **Login failures**: the library server rejected the credentials
//!
//! Rate-limit signals are deliberately *not* an error: the collector treats
//! them as first-class data and self-throttles (see [`crate::collect`]).
//!
//! # Examples
//!
//! ```rust
//! use shelfgap::error::{Error, Result};
//!
//! fn check_asin(asin: &str) -> Result<()> {
//!     if asin.trim().is_empty() {
//!         return Err(Error::validation("ASIN must not be empty"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(matches!(check_asin(""), Err(Error::Validation(_))));
//! ```

use thiserror::Error;

/// Type alias for Results with shelfgap errors.
///
/// All public APIs in shelfgap return this Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all shelfgap operations.
///
/// Each variant corresponds to one failure class of the system: input
/// validation, transport, protocol, payload decoding, or authentication.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed input, detected before any network call.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shelfgap::Error;
    ///
    /// let error = Error::validation("server URL must not be empty");
    /// ```
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from the underlying HTTP client (reqwest): connection
    /// timeouts, DNS resolution failures, TLS errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx HTTP response from the catalog or library server.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shelfgap::Error;
    ///
    /// let error = Error::http(404);
    /// ```
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON deserialization failures.
    ///
    /// Wraps errors from serde_json when a response body cannot be decoded
    /// into the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The library server rejected the supplied credentials.
    ///
    /// Surfaced as a blocking failure; the caller is expected to re-prompt
    /// for credentials rather than retry.
    #[error("Login failed")]
    LoginFailed,

    /// Generic error messages that fit no other category.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a validation error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shelfgap::Error;
    ///
    /// let error = Error::validation("username must not be empty");
    /// ```
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Creates an HTTP error for the given status code.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use shelfgap::Error;
    ///
    /// let error = Error::http(503);
    /// ```
    pub fn http(status: u16) -> Self {
        Error::Http { status }
    }

    /// Creates a generic error with the given message.
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }
}
