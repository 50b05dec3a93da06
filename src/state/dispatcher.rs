//! State dispatcher for pub-sub pattern

use crate::query_state::SearchQuery;
use crate::state::events::{StateEvent, SubscriberCommand};
use tracing::{debug, info};

/// Trait for components that subscribe to state changes
pub trait StateSubscriber {
    /// Handle a state event, given the query as it is after the change
    fn on_state_event(&mut self, event: &StateEvent, query: &SearchQuery) -> SubscriberCommand;

    /// Get subscriber name for debugging
    fn name(&self) -> &str;
}

/// Routes state events to subscribers and collects the commands they return
pub struct StateDispatcher {
    subscribers: Vec<Box<dyn StateSubscriber>>,

    /// Event history for debugging
    event_history: Vec<StateEvent>,

    /// Maximum event history size
    max_history: usize,
}

impl Default for StateDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl StateDispatcher {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
            event_history: Vec::new(),
            max_history: 100,
        }
    }

    /// Dispatcher with the pagination and search subscribers attached
    pub fn with_default_subscribers() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.subscribe(Box::new(PaginationSubscriber));
        dispatcher.subscribe(Box::new(SearchSubscriber));
        dispatcher
    }

    pub fn subscribe(&mut self, subscriber: Box<dyn StateSubscriber>) {
        info!(target: "state", "StateDispatcher: Adding subscriber: {}", subscriber.name());
        self.subscribers.push(subscriber);
    }

    /// Dispatch an event and return every non-trivial command in subscriber order
    pub fn dispatch(&mut self, event: StateEvent, query: &SearchQuery) -> Vec<SubscriberCommand> {
        debug!(target: "state", "StateDispatcher: Dispatching event: {:?}", event);

        self.event_history.push(event.clone());
        if self.event_history.len() > self.max_history {
            self.event_history.remove(0);
        }

        let mut commands = Vec::new();
        for subscriber in &mut self.subscribers {
            let command = subscriber.on_state_event(&event, query);
            if command != SubscriberCommand::None {
                debug!(
                    target: "state",
                    "StateDispatcher: {} -> {:?}",
                    subscriber.name(),
                    command
                );
                commands.push(command);
            }
        }
        commands
    }

    /// Get event history for debugging
    pub fn get_event_history(&self) -> &[StateEvent] {
        &self.event_history
    }
}

/// Fetches the current page whenever page or page size moves, and on start
pub struct PaginationSubscriber;

impl StateSubscriber for PaginationSubscriber {
    fn on_state_event(&mut self, event: &StateEvent, query: &SearchQuery) -> SubscriberCommand {
        match event {
            StateEvent::Initialized
            | StateEvent::PageChanged { .. }
            | StateEvent::PageSizeChanged { .. } => SubscriberCommand::FetchPage(query.clone()),
            StateEvent::TextChanged { .. } => SubscriberCommand::None,
        }
    }

    fn name(&self) -> &str {
        "PaginationSubscriber"
    }
}

/// Schedules a debounced search on every text change
pub struct SearchSubscriber;

impl StateSubscriber for SearchSubscriber {
    fn on_state_event(&mut self, event: &StateEvent, query: &SearchQuery) -> SubscriberCommand {
        match event {
            StateEvent::TextChanged { text } => SubscriberCommand::ScheduleSearch {
                text: text.clone(),
                page_size: query.page_size,
            },
            _ => SubscriberCommand::None,
        }
    }

    fn name(&self) -> &str {
        "SearchSubscriber"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_state::PageSize;

    #[test]
    fn test_text_change_only_schedules_search() {
        let mut dispatcher = StateDispatcher::with_default_subscribers();
        let query = SearchQuery {
            text: "mum".to_string(),
            page: 2,
            page_size: PageSize::new(6).unwrap(),
        };

        let commands = dispatcher.dispatch(
            StateEvent::TextChanged {
                text: "mum".to_string(),
            },
            &query,
        );

        assert_eq!(
            commands,
            vec![SubscriberCommand::ScheduleSearch {
                text: "mum".to_string(),
                page_size: PageSize::new(6).unwrap(),
            }]
        );
    }

    #[test]
    fn test_page_events_fetch_current_query() {
        let mut dispatcher = StateDispatcher::with_default_subscribers();
        let query = SearchQuery {
            page: 3,
            ..SearchQuery::default()
        };

        for event in [
            StateEvent::Initialized,
            StateEvent::PageChanged { page: 3 },
            StateEvent::PageSizeChanged {
                page_size: PageSize::default(),
            },
        ] {
            let commands = dispatcher.dispatch(event, &query);
            assert_eq!(commands, vec![SubscriberCommand::FetchPage(query.clone())]);
        }
        assert_eq!(dispatcher.get_event_history().len(), 3);
    }
}
