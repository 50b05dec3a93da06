//! Search box for place names
//!
//! Single-line input with a length cap. It is read-only while a fetch is in
//! flight and shows a "typing..." hint while a debounced search is waiting.

use crossterm::event::{Event, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::query_state::MAX_QUERY_LEN;

/// Result of handling a key in the search input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchInputAction {
    /// Nothing visible changed
    Continue,
    /// Text changed; carries the new value
    TextChanged(String),
    /// Input is disabled, key ignored
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SearchInputConfig {
    pub title: String,
    pub placeholder: String,
    pub max_len: usize,
    pub style: Style,
    /// Hint shown on the right of the border
    pub shortcut_hint: String,
}

impl Default for SearchInputConfig {
    fn default() -> Self {
        Self {
            title: "Search".to_string(),
            placeholder: "Search places...".to_string(),
            max_len: MAX_QUERY_LEN,
            style: Style::default().fg(Color::Yellow),
            shortcut_hint: "Ctrl+/".to_string(),
        }
    }
}

pub struct SearchInput {
    input: Input,
    config: SearchInputConfig,
}

impl Default for SearchInput {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchInput {
    pub fn new() -> Self {
        Self::with_config(SearchInputConfig::default())
    }

    pub fn with_config(config: SearchInputConfig) -> Self {
        Self {
            input: Input::default(),
            config,
        }
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn cursor(&self) -> usize {
        self.input.visual_cursor()
    }

    pub fn set_value(&mut self, value: &str) {
        let clamped: String = value.chars().take(self.config.max_len).collect();
        self.input = Input::default().with_value(clamped);
    }

    /// Feed a key to the input. Edits that would exceed the length cap are
    /// rejected, the way a browser `maxlength` rejects them.
    pub fn handle_key(&mut self, key: KeyEvent, disabled: bool) -> SearchInputAction {
        if disabled {
            return SearchInputAction::Ignored;
        }

        let before = self.input.clone();
        self.input.handle_event(&Event::Key(key));

        if self.input.value().chars().count() > self.config.max_len {
            self.input = before;
            return SearchInputAction::Continue;
        }

        if self.input.value() != before.value() {
            SearchInputAction::TextChanged(self.input.value().to_string())
        } else {
            SearchInputAction::Continue
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, focused: bool, disabled: bool, typing: bool) {
        let mut title = self.config.title.clone();
        if typing {
            title.push_str(" (typing...)");
        }

        let style = if disabled {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            self.config.style
        } else {
            Style::default()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title(Line::from(self.config.shortcut_hint.as_str()).right_aligned())
            .border_style(style);

        let content = if self.input.value().is_empty() {
            Line::from(Span::styled(
                self.config.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(Span::styled(self.input.value(), style))
        };

        f.render_widget(Paragraph::new(content).block(block), area);

        if focused && !disabled {
            f.set_cursor_position((area.x + self.cursor() as u16 + 1, area.y + 1));
        }
    }
}
