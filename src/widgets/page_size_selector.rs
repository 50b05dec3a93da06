use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::query_state::PageSize;
use crate::ui::renderer::page_size_options;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSizeAction {
    Increase,
    Decrease,
    PassThrough,
}

/// Map a key to a page size step while the selector has focus
pub fn handle_key(key: &KeyEvent) -> PageSizeAction {
    match key.code {
        KeyCode::Right | KeyCode::Up | KeyCode::Char('+') | KeyCode::Char('l') | KeyCode::Char('k') => {
            PageSizeAction::Increase
        }
        KeyCode::Left | KeyCode::Down | KeyCode::Char('-') | KeyCode::Char('h') | KeyCode::Char('j') => {
            PageSizeAction::Decrease
        }
        _ => PageSizeAction::PassThrough,
    }
}

pub fn render(f: &mut Frame, area: Rect, current: PageSize, focused: bool) {
    let spans: Vec<Span> = page_size_options(current)
        .into_iter()
        .map(|option| {
            let label = format!(" {} ", option.size);
            if option.selected {
                Span::styled(
                    label,
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(label)
            }
        })
        .collect();

    let border = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let widget = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Per page")
            .border_style(border),
    );
    f.render_widget(widget, area);
}
