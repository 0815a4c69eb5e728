//! Search session controller

use super::outcome::{FetchOutcome, SessionSnapshot};
use crate::backend::{ProductBackend, SearchRequest};
use crate::cancel::{Generation, TaskSlot, Ticket};
use crate::config::SessionSettings;
use crate::error::LocationError;
use crate::metrics::Metrics;
use crate::products::fixture_products;
use crate::query::{CategorySet, History, Location, SearchState};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives one results fetch per search state revision.
///
/// The history's current location is the only input to the search state.
/// `submit_query`, `set_categories`, `back` and `forward` change the
/// location and then go through [`SearchSession::navigated`], the single
/// path that may start a fetch. Completions are committed only if their
/// revision is still the published one.
///
/// Must be created and driven inside a tokio runtime.
pub struct SearchSession {
    backend: Arc<dyn ProductBackend>,
    settings: SessionSettings,
    metrics: Arc<Metrics>,
    history: History,
    revisions: Generation,
    snapshot: Arc<watch::Sender<SessionSnapshot>>,
    inflight: TaskSlot,
}

impl SearchSession {
    /// Start a session at `settings.start_location`
    pub fn new(
        backend: Arc<dyn ProductBackend>,
        settings: SessionSettings,
        metrics: Arc<Metrics>,
    ) -> Result<Self, LocationError> {
        let start = Location::parse(&settings.start_location)?;
        Ok(Self::at(backend, settings, metrics, start))
    }

    /// Start a session at an explicit location (initial page load)
    pub fn at(
        backend: Arc<dyn ProductBackend>,
        settings: SessionSettings,
        metrics: Arc<Metrics>,
        location: Location,
    ) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        let mut session = Self {
            backend,
            settings,
            metrics,
            history: History::new(location),
            revisions: Generation::new(),
            snapshot: Arc::new(snapshot),
            inflight: TaskSlot::new(),
        };
        session.navigated(true);
        session
    }

    /// Search for `text` with the current categories, as a new history entry.
    ///
    /// Returns false, without navigating, when `text` is blank.
    pub fn submit_query(&mut self, text: &str) -> bool {
        let query = text.trim();
        if query.is_empty() {
            debug!("Ignoring blank submission");
            return false;
        }

        let mut location = self.history.current().clone();
        let mut state = SearchState::from_location(&location);
        state.query = query.to_string();
        location.set_path(self.settings.results_path.as_str());
        state.apply_to(&mut location);

        debug!("Pushing {}", location);
        self.history.push(location);
        self.navigated(false);
        true
    }

    /// Replace the category filter, overwriting the current history entry
    pub fn set_categories(&mut self, categories: &CategorySet) {
        let mut location = self.history.current().clone();
        let mut state = SearchState::from_location(&location);
        state.categories = categories.clone();
        state.apply_to(&mut location);

        debug!("Replacing with {}", location);
        self.history.replace(location);
        self.navigated(false);
    }

    /// Flip one category in the current filter
    pub fn toggle_category(&mut self, label: &str) {
        let mut categories = self.state().categories;
        categories.toggle(label);
        self.set_categories(&categories);
    }

    pub fn back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.navigated(false);
        }
        moved
    }

    pub fn forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.navigated(false);
        }
        moved
    }

    pub fn location(&self) -> &Location {
        self.history.current()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn state(&self) -> SearchState {
        self.snapshot.borrow().state.clone()
    }

    pub fn outcome(&self) -> FetchOutcome {
        self.snapshot.borrow().outcome.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Revision currently published
    pub fn revision(&self) -> u64 {
        self.snapshot.borrow().revision
    }

    /// Observe every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Wait until the current revision is no longer loading
    pub async fn settled(&self) -> SessionSnapshot {
        let mut rx = self.snapshot.subscribe();
        let settled = rx
            .wait_for(|snapshot| !snapshot.outcome.is_loading())
            .await
            .map(|snapshot| (*snapshot).clone());
        settled.unwrap_or_else(|_| self.snapshot.borrow().clone())
    }

    /// Re-derive the search state after a location change
    fn navigated(&mut self, initial: bool) {
        let state = SearchState::from_location(self.history.current());

        if !initial && self.snapshot.borrow().state.canonical() == state.canonical() {
            debug!("Search state unchanged ({}), not refetching", state.canonical());
            // Same search, but categories may have been reordered for display
            self.snapshot.send_if_modified(|current| {
                if current.state.categories.to_vec() == state.categories.to_vec() {
                    return false;
                }
                current.state = state;
                true
            });
            return;
        }

        self.begin_revision(state);
    }

    fn begin_revision(&mut self, state: SearchState) {
        let ticket = self.revisions.issue();
        if self.inflight.cancel() {
            debug!("Aborted request superseded by revision #{}", ticket.id());
        }

        info!("Search revision #{}: {}", ticket.id(), state.canonical());
        self.snapshot.send_replace(SessionSnapshot {
            revision: ticket.id(),
            state: state.clone(),
            outcome: FetchOutcome::Loading,
        });

        if state.is_empty() {
            commit(&self.snapshot, ticket, FetchOutcome::Success(Vec::new()));
            return;
        }

        if self.settings.fixture_query.as_deref() == Some(state.query.as_str()) {
            self.metrics.record_fixture_hit();
            commit(&self.snapshot, ticket, FetchOutcome::Success(fixture_products()));
            return;
        }

        let request = SearchRequest::from(&state);
        let backend = self.backend.clone();
        let snapshot = self.snapshot.clone();
        let metrics = self.metrics.clone();
        metrics.record_search_request();

        self.inflight.spawn(async move {
            let result = backend.search(&request).await;
            let failed = result.is_err();
            if let Err(ref e) = result {
                warn!("Search for '{}' failed: {}", request.query, e);
            }

            if commit(&snapshot, ticket, FetchOutcome::from_result(result)) {
                if failed {
                    metrics.record_search_failure();
                }
            } else {
                metrics.record_stale_results();
                debug!("Discarding stale results for revision #{}", ticket.id());
            }
        });
    }
}

/// Publish `outcome` if `ticket` is still the published revision
fn commit(
    snapshot: &watch::Sender<SessionSnapshot>,
    ticket: Ticket,
    outcome: FetchOutcome,
) -> bool {
    snapshot.send_if_modified(|current| {
        if current.revision != ticket.id() {
            return false;
        }
        current.outcome = outcome;
        true
    })
}
