//! The search-state reconciliation pipeline.
//!
//! Everything with real ordering and cancellation semantics lives here:
//! the readiness gate over the backing search index, the debounced query
//! stream, the per-attempt result envelopes, and the reconciler that
//! collapses all of them into one authoritative [`state::SearchUiState`].

pub mod envelope;
pub mod query;
pub mod readiness;
pub mod reconciler;
pub mod state;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tuning for the query pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Shortest query that is allowed to reach the network; anything
    /// non-empty but shorter resolves to the empty-query state.
    pub min_query_len: usize,

    /// Quiescence window applied to query edits, in milliseconds.
    pub debounce_ms: u64,

    /// Minimum number of populated search entries before queries are served.
    pub min_index_count: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_len: 6,
            debounce_ms: 300,
            min_index_count: 1,
        }
    }
}

impl SearchSettings {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
