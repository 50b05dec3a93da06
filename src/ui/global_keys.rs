//! Global key listeners
//!
//! Listeners here see every key event before the focused widget does. A
//! listener that answers with a [`GlobalAction`] consumes the key. Listeners
//! are installed through [`GlobalKeyListeners::install`] and stay active for
//! exactly as long as the returned [`ListenerRegistration`] is alive.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use tracing::{debug, trace};

/// Actions a global listener can request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    FocusSearch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Idle,
    Listening,
}

pub trait GlobalKeyHandler {
    fn handle_key(&self, key: &KeyEvent) -> Option<GlobalAction>;

    fn name(&self) -> &str;
}

type ListenerId = u64;

struct Entry {
    id: ListenerId,
    handler: Box<dyn GlobalKeyHandler>,
}

#[derive(Default)]
struct Registry {
    next_id: Cell<ListenerId>,
    entries: RefCell<Vec<Entry>>,
    /// Dropped while `entries` was borrowed; skipped and purged after dispatch
    retired: RefCell<Vec<ListenerId>>,
}

impl Registry {
    fn is_retired(&self, id: ListenerId) -> bool {
        self.retired.borrow().contains(&id)
    }

    fn remove(&self, id: ListenerId) {
        match self.entries.try_borrow_mut() {
            Ok(mut entries) => entries.retain(|entry| entry.id != id),
            Err(_) => self.retired.borrow_mut().push(id),
        }
    }

    fn purge_retired(&self) {
        let retired: Vec<ListenerId> = self.retired.borrow_mut().drain(..).collect();
        if !retired.is_empty() {
            self.entries
                .borrow_mut()
                .retain(|entry| !retired.contains(&entry.id));
        }
    }
}

#[derive(Default, Clone)]
pub struct GlobalKeyListeners {
    registry: Rc<Registry>,
}

impl GlobalKeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, handler: Box<dyn GlobalKeyHandler>) -> ListenerRegistration {
        let id = self.registry.next_id.get();
        self.registry.next_id.set(id + 1);
        debug!(target: "input", "installing global listener {} ({})", handler.name(), id);
        self.registry.entries.borrow_mut().push(Entry { id, handler });

        ListenerRegistration {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Offer a key to every listener in install order; the first action wins
    pub fn dispatch(&self, key: &KeyEvent) -> Option<GlobalAction> {
        let action = self
            .registry
            .entries
            .borrow()
            .iter()
            .filter(|entry| !self.registry.is_retired(entry.id))
            .find_map(|entry| entry.handler.handle_key(key));
        self.registry.purge_retired();

        if let Some(action) = action {
            trace!(target: "input", "global listener consumed {:?} -> {:?}", key, action);
        }
        action
    }

    pub fn listener_state(&self, registration: &ListenerRegistration) -> ListenerState {
        let listening = !self.registry.is_retired(registration.id)
            && self
                .registry
                .entries
                .borrow()
                .iter()
                .any(|entry| entry.id == registration.id);
        if listening {
            ListenerState::Listening
        } else {
            ListenerState::Idle
        }
    }

    pub fn len(&self) -> usize {
        self.registry
            .entries
            .borrow()
            .iter()
            .filter(|entry| !self.registry.is_retired(entry.id))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps a listener installed. Dropping it uninstalls the listener, even
/// from inside a dispatch.
#[must_use = "the listener is removed as soon as the registration is dropped"]
pub struct ListenerRegistration {
    id: ListenerId,
    registry: Weak<Registry>,
}

impl Drop for ListenerRegistration {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
            debug!(target: "input", "removed global listener {}", self.id);
        }
    }
}

/// Ctrl+/ (or Super+/ on platforms where that is the convention)
pub struct FocusSearchShortcut;

impl FocusSearchShortcut {
    pub const KEY: char = '/';

    /// Without keyboard enhancement, terminals send Ctrl+/ as 0x1F, which
    /// crossterm reports as Ctrl+7 (some report it as Ctrl+_)
    const LEGACY_KEYS: [char; 2] = ['7', '_'];

    pub fn matches(key: &KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if c == Self::KEY => key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER),
            KeyCode::Char(c) if Self::LEGACY_KEYS.contains(&c) => {
                key.modifiers.contains(KeyModifiers::CONTROL)
            }
            _ => false,
        }
    }
}

impl GlobalKeyHandler for FocusSearchShortcut {
    fn handle_key(&self, key: &KeyEvent) -> Option<GlobalAction> {
        Self::matches(key).then_some(GlobalAction::FocusSearch)
    }

    fn name(&self) -> &str {
        "FocusSearchShortcut"
    }
}
