//! Fetch coordinator
//!
//! Turns query snapshots into upstream requests. Two independent paths
//! share the same client:
//!
//! * pagination fetches run immediately for the current page, falling back
//!   to a fixed name prefix when the text is empty;
//! * search fetches are debounced, always ask for page 1 and use the typed
//!   text verbatim.
//!
//! Requests are never sequenced or cancelled once started. Outcomes are sent
//! over a channel in completion order and the receiver applies them as they
//! arrive, so a slow response can overwrite a newer one.

use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::api_client::{CityQueryParams, CitySource, FetchError};
use crate::query_state::{FetchState, InFlightGuard, PageSize, ResultPage, SearchQuery};
use crate::utils::debouncer::Debouncer;

/// Name prefix used by pagination fetches while the search box is empty
pub const DEFAULT_FALLBACK_PREFIX: &str = "del";

/// Quiet period before a search fetch fires
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrigin {
    Pagination,
    Search,
}

#[derive(Debug)]
pub struct FetchOutcome {
    pub origin: FetchOrigin,
    pub result: Result<ResultPage, FetchError>,
}

pub struct FetchCoordinator {
    source: Arc<dyn CitySource>,
    runtime: Handle,
    fetch_state: FetchState,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
    search_debounce: Debouncer,
    fallback_prefix: String,
}

impl FetchCoordinator {
    pub fn new(
        source: Arc<dyn CitySource>,
        runtime: Handle,
        fetch_state: FetchState,
        outcomes: mpsc::UnboundedSender<FetchOutcome>,
    ) -> Self {
        Self {
            source,
            runtime,
            fetch_state,
            outcomes,
            search_debounce: Debouncer::new(DEFAULT_DEBOUNCE_MS),
            fallback_prefix: DEFAULT_FALLBACK_PREFIX.to_string(),
        }
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.search_debounce = Debouncer::new(debounce_ms);
        self
    }

    pub fn with_fallback_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fallback_prefix = prefix.into();
        self
    }

    /// Parameters a pagination fetch sends for this query
    pub fn pagination_params(&self, query: &SearchQuery) -> CityQueryParams {
        let prefix = if query.text.is_empty() {
            self.fallback_prefix.as_str()
        } else {
            query.text.as_str()
        };
        CityQueryParams::new(prefix, query.page_size, query.page)
    }

    /// Parameters a search fetch sends for this text
    pub fn search_params(text: &str, page_size: PageSize) -> CityQueryParams {
        CityQueryParams::new(text, page_size, 1)
    }

    /// Pagination-triggered fetch. Leaves any pending search timer alone.
    pub fn fetch_page(&self, query: &SearchQuery) {
        let params = self.pagination_params(query);
        debug!(target: "fetch", "pagination fetch: {:?}", params);

        let guard = self.fetch_state.begin();
        self.runtime.spawn(run_fetch(
            Arc::clone(&self.source),
            params,
            FetchOrigin::Pagination,
            guard,
            self.outcomes.clone(),
        ));
    }

    /// Search-triggered fetch, delayed until typing goes quiet
    pub fn schedule_search(&mut self, text: String, page_size: PageSize) {
        let params = Self::search_params(&text, page_size);
        debug!(
            target: "search",
            "search for {:?} scheduled in {:?}",
            text,
            self.search_debounce.delay()
        );

        let source = Arc::clone(&self.source);
        let fetch_state = self.fetch_state.clone();
        let outcomes = self.outcomes.clone();
        self.search_debounce.schedule(&self.runtime, async move {
            let guard = fetch_state.begin();
            run_fetch(source, params, FetchOrigin::Search, guard, outcomes).await;
        });
    }

    pub fn search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }

    pub fn cancel_pending_search(&mut self) {
        self.search_debounce.cancel();
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }
}

async fn run_fetch(
    source: Arc<dyn CitySource>,
    params: CityQueryParams,
    origin: FetchOrigin,
    in_flight: InFlightGuard,
    outcomes: mpsc::UnboundedSender<FetchOutcome>,
) {
    let result = source.fetch_cities(&params).await.map(ResultPage::from);
    if let Err(e) = &result {
        error!(target: "fetch", "Error fetching cities: {}", e);
    }

    // the flag is down before anyone can observe the outcome
    drop(in_flight);

    // receiver gone means the view was torn down
    let _ = outcomes.send(FetchOutcome { origin, result });
}
