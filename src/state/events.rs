//! State events and the commands they imply

use crate::query_state::{PageSize, SearchQuery};

/// Events that can trigger fetches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateEvent {
    /// The view became active for the first time
    Initialized,

    /// Search text changed (already clamped)
    TextChanged { text: String },

    /// Current page changed
    PageChanged { page: u32 },

    /// Page size changed
    PageSizeChanged { page_size: PageSize },
}

/// Work a subscriber asks the session to carry out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriberCommand {
    None,
    /// Pagination-triggered fetch for this query snapshot
    FetchPage(SearchQuery),
    /// Debounced search for this text
    ScheduleSearch { text: String, page_size: PageSize },
}
