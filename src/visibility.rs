//! Visibility store: user-hidden series and books.
//!
//! Hidden items are created and destroyed by explicit user action and
//! persisted across runs. The pipeline only ever *reads* them: a snapshot is
//! taken at the start of a run and consulted by the collector (series-level
//! skips) and the grouping stage. Mutation is a presentation-layer concern.
//!
//! # Examples
//!
//! ```rust
//! use shelfgap::visibility::{HiddenSet, MemoryVisibilityStore, VisibilityStore};
//! use shelfgap::types::HiddenItem;
//!
//! let store = MemoryVisibilityStore::default();
//! store.set(&[HiddenItem::series("Dune", "S1")]).unwrap();
//!
//! let hidden = HiddenSet::load(&store).unwrap();
//! assert!(hidden.is_hidden_series("Dune"));
//! assert!(hidden.is_hidden_by_asin("S1"));
//! ```

use std::collections::HashSet;

use parking_lot::Mutex;

use crate::{
    error::Result,
    types::{HiddenItem, HiddenKind},
};

/// Persistence interface for hidden items.
///
/// Implementations wrap whatever key-value persistence the embedder has;
/// [`MemoryVisibilityStore`] is the in-memory fallback used by tests and
/// embedders without a backing store.
pub trait VisibilityStore: Send + Sync {
    /// Returns all hidden items.
    fn get(&self) -> Result<Vec<HiddenItem>>;

    /// Replaces the stored hidden items.
    fn set(&self, items: &[HiddenItem]) -> Result<()>;
}

/// In-memory visibility store.
#[derive(Debug, Default)]
pub struct MemoryVisibilityStore {
    items: Mutex<Vec<HiddenItem>>,
}

impl VisibilityStore for MemoryVisibilityStore {
    fn get(&self) -> Result<Vec<HiddenItem>> {
        Ok(self.items.lock().clone())
    }

    fn set(&self, items: &[HiddenItem]) -> Result<()> {
        *self.items.lock() = items.to_vec();
        Ok(())
    }
}

/// Read-once snapshot of the hidden items, indexed for fast lookup.
///
/// Built at the start of every run so the collector and grouping stages never
/// touch the store mid-run.
#[derive(Debug, Default, Clone)]
pub struct HiddenSet {
    series_names: HashSet<String>,
    book_keys: HashSet<(String, String)>,
    asins: HashSet<String>,
}

impl HiddenSet {
    /// Loads a snapshot from the given store.
    pub fn load(store: &dyn VisibilityStore) -> Result<Self> {
        Ok(Self::from_items(&store.get()?))
    }

    /// Builds a snapshot directly from a list of hidden items.
    pub fn from_items(items: &[HiddenItem]) -> Self {
        let mut set = HiddenSet::default();
        for item in items {
            set.asins.insert(item.asin.clone());
            match item.kind {
                HiddenKind::Series => {
                    set.series_names.insert(item.series.clone());
                }
                HiddenKind::Book => {
                    if let Some(title) = &item.title {
                        set.book_keys.insert((item.series.clone(), title.clone()));
                    }
                }
            }
        }
        set
    }

    /// Whether a whole series is hidden by name.
    pub fn is_hidden_series(&self, series: &str) -> bool {
        self.series_names.contains(series)
    }

    /// Whether a single book is hidden under the given series.
    pub fn is_hidden_book(&self, series: &str, title: &str) -> bool {
        self.book_keys
            .contains(&(series.to_string(), title.to_string()))
    }

    /// Fast ASIN lookup across both series- and book-level items.
    pub fn is_hidden_by_asin(&self, asin: &str) -> bool {
        self.asins.contains(asin)
    }

    /// Whether no items are hidden at all.
    pub fn is_empty(&self) -> bool {
        self.series_names.is_empty() && self.book_keys.is_empty()
    }
}
