use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Serialize, Deserialize)]
struct SavedQuery {
    query: String,
}

/// The user-edited query text.
///
/// Writes go through `send_if_modified`, so downstream subscribers only wake
/// for real changes (distinct-until-changed). The current value can be
/// carried across process restarts as an opaque blob via
/// [`save`](Self::save) / [`restore`](Self::restore).
#[derive(Debug, Clone)]
pub struct QueryState {
    tx: Arc<watch::Sender<String>>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl QueryState {
    pub fn new(initial: String) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// Restore from a blob produced by [`save`](Self::save).
    pub fn restore(blob: &[u8]) -> Result<Self> {
        let saved: SavedQuery =
            serde_json::from_slice(blob).context("Failed to decode saved query state")?;
        Ok(Self::new(saved.query))
    }

    /// Opaque blob carrying the current query text.
    pub fn save(&self) -> Result<Vec<u8>> {
        let saved = SavedQuery { query: self.current() };
        serde_json::to_vec(&saved).context("Failed to encode query state")
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Set the query text; setting the current value again is a no-op.
    pub fn set(&self, text: &str) {
        self.tx.send_if_modified(|current| {
            if current == text {
                false
            } else {
                text.clone_into(current);
                true
            }
        });
    }
}
