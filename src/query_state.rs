//! Query state holder
//!
//! Owns the current search text, page, page size, the last fetched result
//! page and the shared in-flight flag. Mutators report what changed as a
//! [`StateEvent`]; they never fetch anything themselves.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::fetch_coordinator::FetchOutcome;
use crate::state::events::StateEvent;

/// Hard ceiling on the search text length
pub const MAX_QUERY_LEN: usize = 20;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("page size {0} is not one of 5, 6, 7, 8, 9, 10")]
pub struct InvalidPageSize(pub u32);

/// Number of records requested per page. Only 5..=10 are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageSize(u32);

impl PageSize {
    pub const MIN: u32 = 5;
    pub const MAX: u32 = 10;

    pub const ALL: [PageSize; 6] = [
        PageSize(5),
        PageSize(6),
        PageSize(7),
        PageSize(8),
        PageSize(9),
        PageSize(10),
    ];

    pub fn new(size: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&size).then_some(Self(size))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Next larger size, staying on the largest
    pub fn next(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    /// Next smaller size, staying on the smallest
    pub fn prev(self) -> Self {
        Self((self.0 - 1).max(Self::MIN))
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u32> for PageSize {
    type Error = InvalidPageSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(InvalidPageSize(value))
    }
}

impl From<PageSize> for u32 {
    fn from(size: PageSize) -> Self {
        size.0
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: String::new(),
            page: 1,
            page_size: PageSize::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultPage {
    pub records: Vec<CityRecord>,
    pub total_count: u64,
}

/// Shared loading flag. Only an [`InFlightGuard`] flips it.
#[derive(Debug, Clone, Default)]
pub struct FetchState {
    in_flight: Arc<AtomicBool>,
}

impl FetchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a request as dispatched. The flag clears when the guard drops.
    pub fn begin(&self) -> InFlightGuard {
        self.in_flight.store(true, Ordering::SeqCst);
        InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[must_use = "the in-flight flag clears as soon as the guard is dropped"]
pub struct InFlightGuard {
    in_flight: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::SeqCst);
    }
}

/// Truncate to at most `max_len` characters
pub fn clamp_text(text: &str, max_len: usize) -> String {
    text.chars().take(max_len).collect()
}

#[derive(Debug)]
pub struct QueryState {
    query: SearchQuery,
    results: ResultPage,
    fetch_state: FetchState,
    max_query_len: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl QueryState {
    pub fn new(page_size: PageSize) -> Self {
        Self::with_limits(page_size, MAX_QUERY_LEN)
    }

    pub fn with_limits(page_size: PageSize, max_query_len: usize) -> Self {
        Self {
            query: SearchQuery {
                page_size,
                ..SearchQuery::default()
            },
            results: ResultPage::default(),
            fetch_state: FetchState::new(),
            max_query_len: max_query_len.clamp(1, MAX_QUERY_LEN),
        }
    }

    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn results(&self) -> &ResultPage {
        &self.results
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch_state
    }

    pub fn is_in_flight(&self) -> bool {
        self.fetch_state.is_in_flight()
    }

    pub fn max_query_len(&self) -> usize {
        self.max_query_len
    }

    pub fn set_text(&mut self, text: &str) -> Option<StateEvent> {
        let text = clamp_text(text, self.max_query_len);
        if text == self.query.text {
            return None;
        }
        debug!(target: "state", "text: {:?} -> {:?}", self.query.text, text);
        self.query.text = text.clone();
        Some(StateEvent::TextChanged { text })
    }

    pub fn set_page(&mut self, page: u32) -> Option<StateEvent> {
        if page == 0 || page == self.query.page {
            return None;
        }
        debug!(target: "state", "page: {} -> {}", self.query.page, page);
        self.query.page = page;
        Some(StateEvent::PageChanged { page })
    }

    pub fn set_page_size(&mut self, page_size: PageSize) -> Option<StateEvent> {
        if page_size == self.query.page_size {
            return None;
        }
        debug!(target: "state", "page size: {} -> {}", self.query.page_size, page_size);
        self.query.page_size = page_size;
        Some(StateEvent::PageSizeChanged { page_size })
    }

    /// Replace the result page on success. Failures leave it alone.
    pub fn apply_outcome(&mut self, outcome: FetchOutcome) -> bool {
        match outcome.result {
            Ok(page) => {
                info!(
                    target: "state",
                    "{:?} fetch delivered {} of {} cities",
                    outcome.origin,
                    page.records.len(),
                    page.total_count
                );
                self.results = page;
                true
            }
            Err(_) => {
                debug!(target: "state", "{:?} fetch failed, keeping previous results", outcome.origin);
                false
            }
        }
    }
}
