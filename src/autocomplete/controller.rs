//! Suggestion controller for a single search input

use crate::backend::AutocompleteBackend;
use crate::cancel::{Generation, TaskSlot, Ticket};
use crate::config::AutocompleteSettings;
use crate::metrics::Metrics;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Receiving end of submitted queries
pub type Submissions = mpsc::UnboundedReceiver<String>;

/// Ephemeral state of one input session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionState {
    /// Raw input value
    pub draft_text: String,
    /// Most recent accepted suggestions
    pub suggestions: Vec<String>,
    /// Text the current suggestions were fetched for
    pub suggestions_for: String,
    /// Whether the list should render
    pub visible: bool,
    /// Whether the input has focus
    pub focused: bool,
}

impl SuggestionState {
    fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.suggestions_for.clear();
        self.visible = false;
    }
}

/// Size of the rendered suggestion panel, for layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelMetrics {
    pub visible: bool,
    pub rows: usize,
    pub height_px: u32,
}

struct Shared {
    state: Mutex<SuggestionState>,
    lookups: Generation,
    panel: watch::Sender<PanelMetrics>,
    row_height_px: u32,
}

impl Shared {
    /// Mutate the state under the lock and publish panel changes
    fn update<R>(&self, f: impl FnOnce(&mut SuggestionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);

        let rows = if state.visible { state.suggestions.len() } else { 0 };
        let metrics = PanelMetrics {
            visible: state.visible,
            rows,
            height_px: u32::try_from(rows)
                .unwrap_or(u32::MAX)
                .saturating_mul(self.row_height_px),
        };
        self.panel.send_if_modified(|current| {
            if *current == metrics {
                return false;
            }
            *current = metrics;
            true
        });

        result
    }

    fn snapshot(&self) -> SuggestionState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Issue a lookup ticket; taken under the lock so it orders with commits
    fn issue(&self) -> Ticket {
        self.update(|_| self.lookups.issue())
    }

    /// Supersede in-flight lookups and drop the current list
    fn reset(&self, state: &mut SuggestionState) {
        self.lookups.invalidate();
        state.clear_suggestions();
    }
}

/// Turns keystrokes into debounced suggestion lookups.
///
/// Only the response to the most recently issued lookup may reach the
/// visible list; anything older is discarded when it resolves.
pub struct SuggestionController {
    backend: Arc<dyn AutocompleteBackend>,
    settings: AutocompleteSettings,
    metrics: Arc<Metrics>,
    shared: Arc<Shared>,
    debounce: TaskSlot,
    blur: TaskSlot,
    submissions: mpsc::UnboundedSender<String>,
}

impl SuggestionController {
    pub fn new(
        backend: Arc<dyn AutocompleteBackend>,
        settings: AutocompleteSettings,
        metrics: Arc<Metrics>,
    ) -> (Self, Submissions) {
        let (submissions, receiver) = mpsc::unbounded_channel();
        let (panel, _) = watch::channel(PanelMetrics::default());

        let shared = Arc::new(Shared {
            state: Mutex::new(SuggestionState::default()),
            lookups: Generation::new(),
            panel,
            row_height_px: settings.row_height_px,
        });

        let controller = Self {
            backend,
            settings,
            metrics,
            shared,
            debounce: TaskSlot::new(),
            blur: TaskSlot::new(),
            submissions,
        };
        (controller, receiver)
    }

    /// Record a new input value and (re)start the quiet period
    pub fn on_text_changed(&mut self, text: &str) {
        self.blur.cancel();
        let blank = text.trim().is_empty();

        self.shared.update(|state| {
            state.draft_text = text.to_string();
            state.focused = true;
            if blank {
                self.shared.reset(state);
            }
        });

        if blank || !self.settings.enabled {
            self.debounce.cancel();
            return;
        }

        let shared = self.shared.clone();
        let backend = self.backend.clone();
        let metrics = self.metrics.clone();
        let text = text.to_string();

        self.debounce.schedule(self.settings.debounce(), async move {
            let ticket = shared.issue();
            metrics.record_suggestion_request();
            debug!("Issuing suggestion lookup #{} for '{}'", ticket.id(), text);
            // Detached so that later keystrokes only cancel the timer, not the request
            tokio::spawn(lookup(shared, backend, metrics, text, ticket));
        });
    }

    /// A suggestion was picked: adopt it and submit it
    pub fn on_suggestion_chosen(&mut self, value: &str) {
        self.debounce.cancel();
        self.blur.cancel();
        self.shared.update(|state| {
            state.draft_text = value.to_string();
            self.shared.reset(state);
        });
        self.emit(value.to_string());
    }

    /// The input was submitted as typed
    pub fn on_submit(&mut self) {
        self.debounce.cancel();
        self.blur.cancel();
        let draft = self.shared.update(|state| {
            self.shared.reset(state);
            state.draft_text.clone()
        });
        self.emit(draft);
    }

    /// Hide the list after the grace delay so a pending click still lands
    pub fn on_blur(&mut self) {
        self.shared.update(|state| state.focused = false);

        let shared = self.shared.clone();
        self.blur.schedule(self.settings.blur_grace(), async move {
            shared.update(|state| {
                if !state.focused {
                    state.visible = false;
                }
            });
        });
    }

    /// Re-show suggestions that still match the draft
    pub fn on_focus(&mut self) {
        self.blur.cancel();
        self.shared.update(|state| {
            state.focused = true;
            state.visible = !state.suggestions.is_empty()
                && state.suggestions_for == state.draft_text;
        });
    }

    /// Current state snapshot
    pub fn state(&self) -> SuggestionState {
        self.shared.snapshot()
    }

    /// Subscribe to panel size changes
    pub fn panel(&self) -> watch::Receiver<PanelMetrics> {
        self.shared.panel.subscribe()
    }

    fn emit(&self, query: String) {
        debug!("Submitting '{}'", query);
        if self.submissions.send(query).is_err() {
            debug!("Submission dropped, no receiver");
        }
    }
}

impl Drop for SuggestionController {
    fn drop(&mut self) {
        self.shared.lookups.invalidate();
    }
}

async fn lookup(
    shared: Arc<Shared>,
    backend: Arc<dyn AutocompleteBackend>,
    metrics: Arc<Metrics>,
    text: String,
    ticket: Ticket,
) {
    let result = backend.suggest(&text).await;

    shared.update(|state| {
        if !shared.lookups.is_current(ticket) {
            metrics.record_stale_suggestion();
            debug!("Discarding stale suggestions #{} for '{}'", ticket.id(), text);
            return;
        }

        match result {
            Ok(suggestions) => {
                state.visible = !suggestions.is_empty() && state.focused;
                state.suggestions = suggestions;
                state.suggestions_for = text;
            }
            Err(e) => {
                metrics.record_suggestion_failure();
                warn!("Suggestion lookup for '{}' failed: {}", text, e);
                state.clear_suggestions();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::sleep;

    type Reply = Result<Vec<String>, FetchError>;

    /// Answers immediately from `canned`, or parks the call when `hold` is set
    #[derive(Default)]
    struct FakeSuggestions {
        hold: bool,
        calls: Mutex<Vec<String>>,
        canned: Mutex<HashMap<String, Reply>>,
        parked: Mutex<Vec<(String, oneshot::Sender<Reply>)>>,
    }

    impl FakeSuggestions {
        fn holding() -> Self {
            Self {
                hold: true,
                ..Default::default()
            }
        }

        fn with_reply(self, query: &str, reply: Reply) -> Self {
            self.canned.lock().unwrap().insert(query.to_string(), reply);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn resolve(&self, query: &str, reply: Reply) {
            let mut parked = self.parked.lock().unwrap();
            let index = parked
                .iter()
                .position(|(q, _)| q == query)
                .expect("no parked lookup for query");
            let (_, tx) = parked.remove(index);
            let _ = tx.send(reply);
        }
    }

    #[async_trait]
    impl AutocompleteBackend for FakeSuggestions {
        async fn suggest(&self, query: &str) -> Result<Vec<String>, FetchError> {
            self.calls.lock().unwrap().push(query.to_string());
            if !self.hold {
                return self
                    .canned
                    .lock()
                    .unwrap()
                    .get(query)
                    .cloned()
                    .unwrap_or_else(|| Ok(vec![format!("{} one", query), format!("{} two", query)]));
            }
            let (tx, rx) = oneshot::channel();
            self.parked.lock().unwrap().push((query.to_string(), tx));
            rx.await
                .unwrap_or_else(|_| Err(FetchError::Network("dropped".to_string())))
        }
    }

    fn controller(backend: Arc<FakeSuggestions>) -> (SuggestionController, Submissions, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        let (controller, submissions) =
            SuggestionController::new(backend, AutocompleteSettings::default(), metrics.clone());
        (controller, submissions, metrics)
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Let spawned tasks run without crossing any timer boundary we care about
    async fn settle() {
        sleep(Duration::from_millis(1)).await;
    }

    const QUIET: Duration = Duration::from_millis(301);

    #[tokio::test(start_paused = true)]
    async fn test_debounce_issues_single_trailing_lookup() {
        let backend = Arc::new(FakeSuggestions::default());
        let (mut ctl, _subs, metrics) = controller(backend.clone());

        ctl.on_text_changed("a");
        sleep(Duration::from_millis(100)).await;
        ctl.on_text_changed("ab");
        sleep(Duration::from_millis(100)).await;
        ctl.on_text_changed("abc");
        sleep(Duration::from_millis(299)).await;
        assert!(backend.calls().is_empty());

        sleep(Duration::from_millis(2)).await;
        settle().await;

        assert_eq!(backend.calls(), strings(&["abc"]));
        assert_eq!(metrics.snapshot().suggestion_requests, 1);

        let state = ctl.state();
        assert_eq!(state.suggestions, strings(&["abc one", "abc two"]));
        assert_eq!(state.suggestions_for, "abc");
        assert!(state.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_text_clears_immediately_without_lookup() {
        let backend = Arc::new(FakeSuggestions::default());
        let (mut ctl, _subs, _) = controller(backend.clone());

        ctl.on_text_changed("lamp");
        sleep(QUIET).await;
        settle().await;
        assert!(ctl.state().visible);

        ctl.on_text_changed("   ");
        let state = ctl.state();
        assert!(state.suggestions.is_empty());
        assert!(!state.visible);
        assert_eq!(state.draft_text, "   ");

        sleep(Duration::from_millis(500)).await;
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_order_response_is_discarded() {
        let backend = Arc::new(FakeSuggestions::holding());
        let (mut ctl, _subs, metrics) = controller(backend.clone());

        ctl.on_text_changed("a");
        sleep(QUIET).await;
        ctl.on_text_changed("ab");
        sleep(QUIET).await;
        assert_eq!(backend.calls(), strings(&["a", "ab"]));

        backend.resolve("ab", Ok(strings(&["abacus"])));
        settle().await;
        backend.resolve("a", Ok(strings(&["apple", "avocado"])));
        settle().await;

        let state = ctl.state();
        assert_eq!(state.suggestions, strings(&["abacus"]));
        assert!(state.visible);
        assert_eq!(metrics.snapshot().stale_suggestions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_swallowed() {
        let backend = Arc::new(FakeSuggestions::default().with_reply(
            "wal",
            Err(FetchError::Server {
                status: 500,
                body: "boom".to_string(),
            }),
        ));
        let (mut ctl, _subs, metrics) = controller(backend.clone());

        ctl.on_text_changed("wa");
        sleep(QUIET).await;
        settle().await;
        assert!(ctl.state().visible);

        ctl.on_text_changed("wal");
        sleep(QUIET).await;
        settle().await;

        let state = ctl.state();
        assert!(state.suggestions.is_empty());
        assert!(!state.visible);
        assert_eq!(metrics.snapshot().suggestion_failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_response_stays_hidden() {
        let backend = Arc::new(FakeSuggestions::default().with_reply("zzz", Ok(vec![])));
        let (mut ctl, _subs, _) = controller(backend.clone());

        ctl.on_text_changed("zzz");
        sleep(QUIET).await;
        settle().await;

        let state = ctl.state();
        assert!(state.suggestions.is_empty());
        assert!(!state.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_response_after_blur_is_kept_but_hidden() {
        let backend = Arc::new(FakeSuggestions::holding());
        let (mut ctl, _subs, _) = controller(backend.clone());

        ctl.on_text_changed("wa");
        sleep(QUIET).await;
        ctl.on_blur();
        backend.resolve("wa", Ok(strings(&["wallet"])));
        settle().await;

        let state = ctl.state();
        assert_eq!(state.suggestions, strings(&["wallet"]));
        assert!(!state.visible);

        ctl.on_focus();
        assert!(ctl.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blur_hides_after_grace_and_focus_reshows() {
        let backend = Arc::new(FakeSuggestions::default());
        let (mut ctl, _subs, _) = controller(backend.clone());

        ctl.on_text_changed("watch");
        sleep(QUIET).await;
        settle().await;
        assert!(ctl.state().visible);

        ctl.on_blur();
        sleep(Duration::from_millis(100)).await;
        assert!(ctl.state().visible);

        sleep(Duration::from_millis(60)).await;
        assert!(!ctl.state().visible);

        ctl.on_focus();
        assert!(ctl.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_does_not_reshow_suggestions_for_other_text() {
        let backend = Arc::new(FakeSuggestions::holding());
        let (mut ctl, _subs, _) = controller(backend.clone());

        ctl.on_text_changed("wa");
        sleep(QUIET).await;
        backend.resolve("wa", Ok(strings(&["wallet"])));
        settle().await;

        ctl.on_text_changed("wat");
        ctl.on_blur();
        sleep(Duration::from_millis(200)).await;
        ctl.on_focus();

        assert!(!ctl.state().visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_choosing_a_suggestion_submits_it() {
        let backend = Arc::new(FakeSuggestions::default());
        let (mut ctl, mut subs, _) = controller(backend.clone());

        ctl.on_text_changed("wal");
        sleep(QUIET).await;
        settle().await;

        // click lands during the blur grace period
        ctl.on_blur();
        sleep(Duration::from_millis(50)).await;
        ctl.on_suggestion_chosen("wal one");

        let state = ctl.state();
        assert_eq!(state.draft_text, "wal one");
        assert!(state.suggestions.is_empty());
        assert!(!state.visible);
        assert_eq!(subs.try_recv().unwrap(), "wal one");
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_after_choice_does_not_reopen_list() {
        let backend = Arc::new(FakeSuggestions::holding());
        let (mut ctl, mut subs, metrics) = controller(backend.clone());

        ctl.on_text_changed("wa");
        sleep(QUIET).await;
        ctl.on_suggestion_chosen("walnut");
        backend.resolve("wa", Ok(strings(&["wallet", "walnut"])));
        settle().await;

        assert!(ctl.state().suggestions.is_empty());
        assert!(!ctl.state().visible);
        assert_eq!(subs.try_recv().unwrap(), "walnut");
        assert_eq!(metrics.snapshot().stale_suggestions, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_cancels_pending_lookup() {
        let backend = Arc::new(FakeSuggestions::default());
        let (mut ctl, mut subs, _) = controller(backend.clone());

        ctl.on_text_changed("desk lamp");
        sleep(Duration::from_millis(100)).await;
        ctl.on_submit();
        sleep(Duration::from_millis(500)).await;

        assert!(backend.calls().is_empty());
        assert_eq!(subs.try_recv().unwrap(), "desk lamp");
        assert!(subs.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panel_metrics_follow_visibility() {
        let backend = Arc::new(FakeSuggestions::default().with_reply(
            "sh",
            Ok(strings(&["shirt", "shoes", "shorts"])),
        ));
        let (mut ctl, _subs, _) = controller(backend.clone());
        let panel = ctl.panel();

        ctl.on_text_changed("sh");
        sleep(QUIET).await;
        settle().await;
        assert_eq!(
            *panel.borrow(),
            PanelMetrics {
                visible: true,
                rows: 3,
                height_px: 144
            }
        );

        ctl.on_submit();
        assert_eq!(*panel.borrow(), PanelMetrics::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panel_height_saturates() {
        let backend = Arc::new(FakeSuggestions::default());
        let settings = AutocompleteSettings {
            row_height_px: u32::MAX,
            ..Default::default()
        };
        let (mut ctl, _subs) =
            SuggestionController::new(backend.clone(), settings, Arc::new(Metrics::new()));
        let panel = ctl.panel();

        ctl.on_text_changed("sh");
        sleep(QUIET).await;
        settle().await;

        assert!(ctl.state().visible);
        assert_eq!(
            *panel.borrow(),
            PanelMetrics {
                visible: true,
                rows: 2,
                height_px: u32::MAX
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_never_looks_up() {
        let backend = Arc::new(FakeSuggestions::default());
        let metrics = Arc::new(Metrics::new());
        let settings = AutocompleteSettings {
            enabled: false,
            ..Default::default()
        };
        let (mut ctl, _subs) = SuggestionController::new(backend.clone(), settings, metrics);

        ctl.on_text_changed("anything");
        sleep(Duration::from_secs(1)).await;
        assert!(backend.calls().is_empty());
        assert_eq!(ctl.state().draft_text, "anything");
    }
}
