//! Append-only structured recording of filtering decisions.
//!
//! The recorder is diagnostic only: the pipeline works identically with or
//! without one attached, and the pipeline never reads events back. A
//! [`FilterTrace`] is an explicit session object handed to the caller; wiring
//! it into the pipeline happens through the `on_reject` sink.
//!
//! # Examples
//!
//! ```rust
//! use shelfgap::trace::FilterTrace;
//! use shelfgap::filter::find_missing_books;
//! use shelfgap::types::FilterOptions;
//!
//! let trace = FilterTrace::start();
//! let mut sink = trace.reject_sink();
//! let missing = find_missing_books(&[], &[], &FilterOptions::for_region("us"), Some(&mut sink));
//! assert!(missing.is_empty());
//! assert!(trace.events().is_empty());
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::filter::RejectNotice;

/// Whether a rejection failed viability outright or was skipped by an
/// option gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Skipped,
    Failed,
}

/// Compact context captured with every rejection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickFacts {
    /// Catalog region of the candidate
    pub region: String,

    /// Whether the catalog still offers the candidate
    pub is_available: bool,

    /// Raw position strings of the candidate's memberships
    pub positions: Vec<String>,
}

/// One recorded filtering decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectEvent {
    /// Session this event belongs to
    pub session_id: Uuid,

    /// Position of this event within the session, starting at 0
    pub session_index: u64,

    /// When the rejection happened
    pub timestamp: DateTime<Utc>,

    /// Identifier of the gate that rejected
    pub check: String,

    /// Failed viability vs. skipped by an option gate
    pub outcome: Outcome,

    /// ASIN of the rejected candidate
    pub asin: String,

    /// Title of the rejected candidate
    pub title: String,

    /// Series the candidate was discovered under
    pub series_asin: String,

    /// Compact candidate context
    pub quick_facts: QuickFacts,
}

/// Append-only recorder for one pipeline run.
///
/// Mutex-guarded so embedders can share it across threads; within a run the
/// pipeline appends from a single logical thread of control.
#[derive(Debug)]
pub struct FilterTrace {
    session_id: Uuid,
    events: Mutex<Vec<RejectEvent>>,
}

impl FilterTrace {
    /// Starts a new recording session with a fresh id.
    pub fn start() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            events: Mutex::new(Vec::new()),
        }
    }

    /// The id of this session.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Appends one event, assigning it the next session index.
    pub fn append(&self, notice: &RejectNotice<'_>) {
        let mut events = self.events.lock();
        let session_index = events.len() as u64;
        events.push(RejectEvent {
            session_id: self.session_id,
            session_index,
            timestamp: Utc::now(),
            check: notice.rejection.check_name().to_string(),
            outcome: if notice.rejection.is_viability() {
                Outcome::Failed
            } else {
                Outcome::Skipped
            },
            asin: notice.book.asin.clone(),
            title: notice.book.title.clone(),
            series_asin: notice.series_asin.to_string(),
            quick_facts: QuickFacts {
                region: notice.book.region.clone(),
                is_available: notice.book.is_available,
                positions: notice
                    .book
                    .series
                    .iter()
                    .map(|m| m.position_key().to_string())
                    .collect(),
            },
        });
    }

    /// Snapshot of all events recorded so far.
    pub fn events(&self) -> Vec<RejectEvent> {
        self.events.lock().clone()
    }

    /// A closure suitable as the pipeline's `on_reject` sink.
    pub fn reject_sink(&self) -> impl FnMut(RejectNotice<'_>) + '_ {
        move |notice| self.append(&notice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Rejection;
    use crate::types::BookRecord;

    #[test]
    fn indexes_are_monotonic_within_a_session() {
        let trace = FilterTrace::start();
        let book = BookRecord {
            asin: "A1".to_string(),
            title: "Gone".to_string(),
            region: "us".to_string(),
            ..Default::default()
        };

        for rejection in [Rejection::Unavailable, Rejection::AlreadyOwned] {
            trace.append(&RejectNotice {
                book: &book,
                series_asin: "S1",
                rejection,
            });
        }

        let events = trace.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].session_index, 0);
        assert_eq!(events[1].session_index, 1);
        assert_eq!(events[0].session_id, events[1].session_id);
        assert_eq!(events[0].outcome, Outcome::Failed);
        assert_eq!(events[1].outcome, Outcome::Skipped);
    }

    #[test]
    fn events_serialize_as_camel_case() {
        let trace = FilterTrace::start();
        let book = BookRecord {
            asin: "A1".to_string(),
            region: "us".to_string(),
            ..Default::default()
        };
        trace.append(&RejectNotice {
            book: &book,
            series_asin: "S1",
            rejection: Rejection::RegionMismatch,
        });

        let json = serde_json::to_value(&trace.events()[0]).unwrap();
        assert_eq!(json["check"], "region");
        assert_eq!(json["outcome"], "failed");
        assert!(json.get("sessionIndex").is_some());
        assert!(json.get("quickFacts").is_some());
    }
}
