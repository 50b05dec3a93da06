use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::api_client::CitySource;
use crate::fetch_coordinator::{FetchCoordinator, FetchOutcome};
use crate::query_state::{PageSize, QueryState, ResultPage, SearchQuery};
use crate::state::dispatcher::StateDispatcher;
use crate::state::events::{StateEvent, SubscriberCommand};
use crate::ui::renderer::page_count;

/// Tunables for a search session
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub page_size: PageSize,
    pub debounce_ms: u64,
    pub fallback_prefix: String,
    pub max_query_len: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            debounce_ms: crate::fetch_coordinator::DEFAULT_DEBOUNCE_MS,
            fallback_prefix: crate::fetch_coordinator::DEFAULT_FALLBACK_PREFIX.to_string(),
            max_query_len: crate::query_state::MAX_QUERY_LEN,
        }
    }
}

/// Query state, dispatcher and fetch coordinator wired together.
///
/// Every mutation goes through here so that the resulting [`StateEvent`] is
/// dispatched and the commands it implies are carried out.
pub struct SearchSession {
    state: QueryState,
    dispatcher: StateDispatcher,
    coordinator: FetchCoordinator,
    outcomes: mpsc::UnboundedReceiver<FetchOutcome>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn CitySource>, runtime: Handle, options: SessionOptions) -> Self {
        let state = QueryState::with_limits(options.page_size, options.max_query_len);
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = FetchCoordinator::new(source, runtime, state.fetch_state().clone(), tx)
            .with_debounce_ms(options.debounce_ms)
            .with_fallback_prefix(options.fallback_prefix);

        Self {
            state,
            dispatcher: StateDispatcher::with_default_subscribers(),
            coordinator,
            outcomes: rx,
        }
    }

    /// Preset text and page without dispatching anything. Meant for use
    /// before [`SearchSession::start`].
    pub fn seed_query(&mut self, text: &str, page: u32) {
        let _ = self.state.set_text(text);
        let _ = self.state.set_page(page);
    }

    /// Issue the initial pagination fetch
    pub fn start(&mut self) {
        info!(target: "state", "session started");
        self.dispatch(StateEvent::Initialized);
    }

    pub fn set_text(&mut self, text: &str) {
        if let Some(event) = self.state.set_text(text) {
            self.dispatch(event);
        }
    }

    pub fn set_page(&mut self, page: u32) {
        if let Some(event) = self.state.set_page(page) {
            self.dispatch(event);
        }
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        if let Some(event) = self.state.set_page_size(page_size) {
            self.dispatch(event);
        }
    }

    /// Number of pages the current result page advertises
    pub fn page_count(&self) -> u64 {
        page_count(self.state.results().total_count, self.state.query().page_size)
    }

    pub fn next_page(&mut self) {
        let next = self.state.query().page + 1;
        if u64::from(next) <= self.page_count() {
            self.set_page(next);
        }
    }

    pub fn prev_page(&mut self) {
        let page = self.state.query().page;
        if page > 1 {
            self.set_page(page - 1);
        }
    }

    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    pub fn last_page(&mut self) {
        let last = u32::try_from(self.page_count()).unwrap_or(u32::MAX);
        if last > 0 {
            self.set_page(last);
        }
    }

    pub fn next_page_size(&mut self) {
        let size = self.state.query().page_size.next();
        self.set_page_size(size);
    }

    pub fn prev_page_size(&mut self) {
        let size = self.state.query().page_size.prev();
        self.set_page_size(size);
    }

    /// Apply every outcome that has arrived, in arrival order.
    /// Returns how many of them replaced the result page.
    pub fn drain_outcomes(&mut self) -> usize {
        let mut replaced = 0;
        while let Ok(outcome) = self.outcomes.try_recv() {
            if self.state.apply_outcome(outcome) {
                replaced += 1;
            }
        }
        replaced
    }

    /// Wait for the next outcome and apply it. Returns whether it replaced
    /// the result page, or `None` once no sender is left.
    pub async fn wait_for_outcome(&mut self) -> Option<bool> {
        let outcome = self.outcomes.recv().await?;
        Some(self.state.apply_outcome(outcome))
    }

    pub fn query(&self) -> &SearchQuery {
        self.state.query()
    }

    pub fn results(&self) -> &ResultPage {
        self.state.results()
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.is_in_flight()
    }

    pub fn search_pending(&self) -> bool {
        self.coordinator.search_pending()
    }

    /// Drop a search that is still waiting out its quiet period
    pub fn cancel_pending_search(&mut self) {
        self.coordinator.cancel_pending_search();
    }

    pub fn max_query_len(&self) -> usize {
        self.state.max_query_len()
    }

    pub fn event_history(&self) -> &[StateEvent] {
        self.dispatcher.get_event_history()
    }

    fn dispatch(&mut self, event: StateEvent) {
        let commands = self.dispatcher.dispatch(event, self.state.query());
        for command in commands {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: SubscriberCommand) {
        debug!(target: "state", "executing {:?}", command);
        match command {
            SubscriberCommand::FetchPage(query) => self.coordinator.fetch_page(&query),
            SubscriberCommand::ScheduleSearch { text, page_size } => {
                self.coordinator.schedule_search(text, page_size)
            }
            SubscriberCommand::None => {}
        }
    }
}
