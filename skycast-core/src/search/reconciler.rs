use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, warn};

use crate::cache::LookupCache;
use crate::location::{LocationProvider, Permission};
use crate::model::WeatherSnapshot;
use crate::provider::WeatherProvider;

use super::SearchSettings;
use super::envelope::{Attempt, ResultEnvelope};
use super::query::QueryState;
use super::state::SearchUiState;

/// Collaborators and the writable half of the state surface, shared between
/// the session handle and the driver task.
struct Shared {
    provider: Arc<dyn WeatherProvider>,
    cache: Arc<dyn LookupCache>,
    settings: SearchSettings,
    ui_state: watch::Sender<SearchUiState>,
    is_loading: watch::Sender<bool>,
}

/// The search-state reconciler.
///
/// Owns the single authoritative [`SearchUiState`] and the loading flag.
/// A driver task merges three sources into them: the readiness count of the
/// backing search index, the debounced query text, and the envelopes of the
/// one in-flight lookup attempt. The presentation layer only ever reads the
/// watch receivers and calls the small entry points below.
pub struct SearchSession {
    shared: Arc<Shared>,
    query: QueryState,
    location: Arc<dyn LocationProvider>,
    ui_rx: watch::Receiver<SearchUiState>,
    loading_rx: watch::Receiver<bool>,
    driver: JoinHandle<()>,
}

impl SearchSession {
    /// Start a session. Must be called within a tokio runtime: the driver
    /// task is spawned immediately.
    ///
    /// Before the driver observes its first readiness value, the state is
    /// hydrated from the cache: a snapshot whose location name still matches
    /// the cached city name surfaces as `Success` right away; a cached city
    /// name with a stale snapshot yields `EmptyQuery`; with no cached city
    /// the state stays `Loading` and the host is expected to call
    /// [`fetch_location`](Self::fetch_location).
    pub fn start(
        provider: Arc<dyn WeatherProvider>,
        cache: Arc<dyn LookupCache>,
        location: Arc<dyn LocationProvider>,
        readiness: watch::Receiver<usize>,
        query: QueryState,
        settings: SearchSettings,
    ) -> Self {
        let (ui_tx, ui_rx) = watch::channel(SearchUiState::Loading);
        let (loading_tx, loading_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            provider,
            cache,
            settings,
            ui_state: ui_tx,
            is_loading: loading_tx,
        });

        hydrate(&shared);

        let driver = tokio::spawn(drive(shared.clone(), readiness, query.subscribe()));

        Self {
            shared,
            query,
            location,
            ui_rx,
            loading_rx,
            driver,
        }
    }

    /// The authoritative search state. Never absent: `Loading` until the
    /// pipeline produces something better.
    pub fn ui_state(&self) -> watch::Receiver<SearchUiState> {
        self.ui_rx.clone()
    }

    pub fn is_loading(&self) -> watch::Receiver<bool> {
        self.loading_rx.clone()
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Record a keystroke-level edit of the query text.
    pub fn on_query_changed(&self, text: &str) {
        self.query.set(text);
    }

    /// Record an explicit search submission (enter key, search button).
    pub fn on_query_triggered(&self, text: &str) {
        self.query.set(text);
    }

    /// Clear the loading affordance without touching the search state.
    pub fn stop_loading(&self) {
        self.shared.is_loading.send_replace(false);
    }

    /// Opaque blob carrying the query text across process restarts.
    pub fn save_query_state(&self) -> anyhow::Result<Vec<u8>> {
        self.query.save()
    }

    /// One-shot location lookup, meant for startup when no city has ever
    /// been searched; with a cached city this does nothing.
    ///
    /// Failures are absorbed: a denied permission, a missing position, or a
    /// failed request only clear the loading flag and leave the search
    /// state untouched. Runs on the caller's task and never cancels the
    /// query pipeline; both sides may write the cache, last writer wins.
    pub async fn fetch_location(&self) {
        let cached = self.shared.cache.city_name().unwrap_or_else(|err| {
            warn!("cache read failed: {err:#}");
            None
        });
        if cached.is_some() {
            return;
        }

        self.shared.is_loading.send_replace(true);

        if self.location.check_permission().await == Permission::Denied {
            debug!("location permission denied");
            self.shared.is_loading.send_replace(false);
            return;
        }

        let Some(position) = self.location.last_known_location().await else {
            debug!("no last known location");
            self.shared.is_loading.send_replace(false);
            return;
        };

        match self
            .shared
            .provider
            .fetch_by_coords(position.lat, position.lon)
            .await
        {
            Ok(snapshot) => {
                self.shared.is_loading.send_replace(false);
                save_lookup(&self.shared, &snapshot);
                self.shared
                    .ui_state
                    .send_replace(SearchUiState::Success(snapshot));
            }
            Err(err) => {
                debug!("location weather lookup failed: {err}");
                self.shared.is_loading.send_replace(false);
            }
        }
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Startup fast-path: surface the cached lookup before the pipeline runs.
fn hydrate(shared: &Shared) {
    let city = match shared.cache.city_name() {
        Ok(city) => city,
        Err(err) => {
            warn!("cache read failed: {err:#}");
            return;
        }
    };
    // Never searched: stay on the initial Loading state.
    let Some(city) = city else { return };

    match shared.cache.hydrate() {
        Ok(Some(snapshot)) => {
            debug!(%city, "hydrated last lookup from cache");
            shared
                .ui_state
                .send_replace(SearchUiState::Success(snapshot));
        }
        Ok(None) => {
            shared.ui_state.send_replace(SearchUiState::EmptyQuery);
        }
        Err(err) => {
            warn!("cache read failed: {err:#}");
            shared.ui_state.send_replace(SearchUiState::EmptyQuery);
        }
    }
}

fn save_lookup(shared: &Shared, snapshot: &WeatherSnapshot) {
    if let Err(err) = shared.cache.save_lookup(snapshot) {
        warn!("failed to persist lookup for {}: {err:#}", snapshot.name);
    }
}

/// Outer readiness gate.
///
/// Below the minimum count the state is pinned to `SearchNotReady` and
/// query edits are not observed at all. Every observed readiness change
/// replaces the inner query subscription, cancelling whatever it had in
/// flight (switch semantics, later source wins).
async fn drive(
    shared: Arc<Shared>,
    mut readiness: watch::Receiver<usize>,
    mut query_rx: watch::Receiver<String>,
) {
    loop {
        let count = *readiness.borrow_and_update();
        if count < shared.settings.min_index_count {
            debug!(count, "search index below readiness threshold");
            shared
                .ui_state
                .send_replace(SearchUiState::SearchNotReady);
            if readiness.changed().await.is_err() {
                return;
            }
            continue;
        }

        tokio::select! {
            changed = readiness.changed() => {
                if changed.is_err() {
                    return;
                }
                // re-read the count and re-derive the query pipeline
            }
            () = drive_queries(&shared, &mut query_rx) => {
                // query channel closed: the session is gone
                return;
            }
        }
    }
}

/// Inner query pipeline: debounce, length gating, one attempt at a time
/// with newer queries aborting the one in flight.
async fn drive_queries(shared: &Shared, query_rx: &mut watch::Receiver<String>) {
    'next_query: loop {
        // Let the text settle: every edit inside the window restarts it.
        let query = loop {
            let candidate = query_rx.borrow_and_update().clone();
            tokio::select! {
                changed = query_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
                () = time::sleep(shared.settings.debounce()) => break candidate,
            }
        };

        if query.is_empty() {
            // A cleared box is not a search; wait for the next edit.
            if query_rx.changed().await.is_err() {
                return;
            }
            continue 'next_query;
        }

        if query.chars().count() < shared.settings.min_query_len {
            shared.ui_state.send_replace(SearchUiState::EmptyQuery);
            if query_rx.changed().await.is_err() {
                return;
            }
            continue 'next_query;
        }

        // Show the loading affordance at the earliest point a request is
        // possible.
        if query.chars().count() == shared.settings.min_query_len {
            shared.is_loading.send_replace(true);
        }

        debug!(%query, "starting weather lookup");
        let mut attempt = Attempt::fetch_city(shared.provider.clone(), query);

        loop {
            tokio::select! {
                changed = query_rx.changed() => {
                    if changed.is_err() {
                        return;
                    }
                    // A newer query supersedes this attempt; dropping it
                    // aborts the fetch.
                    continue 'next_query;
                }
                envelope = attempt.recv() => match envelope {
                    Some(envelope) => apply_envelope(shared, envelope),
                    None => {
                        // Attempt finished; nothing to do until the next edit.
                        if query_rx.changed().await.is_err() {
                            return;
                        }
                        continue 'next_query;
                    }
                },
            }
        }
    }
}

fn apply_envelope(shared: &Shared, envelope: ResultEnvelope<WeatherSnapshot>) {
    match envelope {
        ResultEnvelope::Loading => {
            shared.is_loading.send_replace(true);
            shared.ui_state.send_replace(SearchUiState::Loading);
        }
        ResultEnvelope::Success(snapshot) => {
            shared.is_loading.send_replace(false);
            save_lookup(shared, &snapshot);
            shared
                .ui_state
                .send_replace(SearchUiState::Success(snapshot));
        }
        ResultEnvelope::Error(err) => {
            debug!("weather lookup failed: {err}");
            shared.is_loading.send_replace(false);
            shared.ui_state.send_replace(SearchUiState::LoadFailed);
        }
    }
}
