use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::model::WeatherSnapshot;
use crate::provider::{FetchError, WeatherProvider};

/// Tri-state outcome of one asynchronous attempt.
///
/// Constructed per attempt and discarded once a newer attempt supersedes it
/// for the same logical query.
#[derive(Debug)]
pub enum ResultEnvelope<T> {
    Loading,
    Success(T),
    Error(FetchError),
}

/// One in-flight fetch attempt.
///
/// The attempt runs on its own task and reports over a channel: `Loading`
/// first, then exactly one terminal envelope. Dropping the attempt aborts
/// the task, so a superseded attempt can never deliver a late result.
#[derive(Debug)]
pub struct Attempt<T> {
    rx: mpsc::Receiver<ResultEnvelope<T>>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Attempt<T> {
    pub(crate) fn spawn<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(2);
        let task = tokio::spawn(async move {
            if tx.send(ResultEnvelope::Loading).await.is_err() {
                return;
            }
            let envelope = match fut.await {
                Ok(value) => ResultEnvelope::Success(value),
                Err(err) => ResultEnvelope::Error(err),
            };
            let _ = tx.send(envelope).await;
        });

        Self { rx, task }
    }

    /// Next envelope, or `None` once the attempt has reported its terminal
    /// outcome.
    pub async fn recv(&mut self) -> Option<ResultEnvelope<T>> {
        self.rx.recv().await
    }
}

impl Attempt<WeatherSnapshot> {
    /// Start a city lookup for `query`.
    pub fn fetch_city(provider: Arc<dyn WeatherProvider>, query: String) -> Self {
        Self::spawn(async move { provider.fetch_by_city(&query).await })
    }
}

impl<T> Drop for Attempt<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::time;

    #[tokio::test]
    async fn reports_loading_then_success() {
        let mut attempt = Attempt::spawn(async { Ok(42) });

        assert!(matches!(attempt.recv().await, Some(ResultEnvelope::Loading)));
        assert!(matches!(attempt.recv().await, Some(ResultEnvelope::Success(42))));
        assert!(attempt.recv().await.is_none());
    }

    #[tokio::test]
    async fn reports_loading_then_error() {
        let mut attempt: Attempt<u32> = Attempt::spawn(async { Err(FetchError::EmptyBody) });

        assert!(matches!(attempt.recv().await, Some(ResultEnvelope::Loading)));
        assert!(matches!(
            attempt.recv().await,
            Some(ResultEnvelope::Error(FetchError::EmptyBody))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_an_attempt_aborts_the_fetch() {
        let completed = Arc::new(AtomicBool::new(false));
        let flag = completed.clone();

        let mut attempt = Attempt::spawn(async move {
            time::sleep(Duration::from_secs(5)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(42)
        });

        assert!(matches!(attempt.recv().await, Some(ResultEnvelope::Loading)));
        drop(attempt);

        // Give the aborted task a full window to (wrongly) finish.
        time::sleep(Duration::from_secs(10)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }
}
