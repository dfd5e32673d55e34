use std::sync::Arc;
use tokio::sync::watch;

/// Publisher for the backing search index's entry count.
///
/// The hosting surface owns one of these and pushes a new count whenever
/// the index changes; the reconciler gates the whole pipeline on the
/// subscribed side. Every published value counts as a change, even when the
/// count itself is the same, matching the switch semantics of the pipeline.
#[derive(Debug, Clone)]
pub struct ReadinessSource {
    tx: Arc<watch::Sender<usize>>,
}

impl Default for ReadinessSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessSource {
    /// Starts at zero entries: not ready until the host publishes a count.
    pub fn new() -> Self {
        Self::with_count(0)
    }

    pub fn with_count(count: usize) -> Self {
        let (tx, _rx) = watch::channel(count);
        Self { tx: Arc::new(tx) }
    }

    pub fn publish(&self, count: usize) {
        self.tx.send_replace(count);
    }

    pub fn count(&self) -> usize {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.tx.subscribe()
    }
}
