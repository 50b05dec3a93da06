use anyhow::Result;
use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, TableState},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::config::config::DisplayConfig;
use crate::session::SearchSession;
use crate::ui::global_keys::{
    FocusSearchShortcut, GlobalAction, GlobalKeyListeners, ListenerRegistration,
};
use crate::ui::renderer::{page_links, project_rows};
use crate::ui::table_renderer::{self, TableRenderContext};
use crate::utils::dual_logging;
use crate::utils::logging::LogRingBuffer;
use crate::widgets::page_size_selector::{self, PageSizeAction};
use crate::widgets::search_input::{SearchInput, SearchInputAction, SearchInputConfig};

const POLL_INTERVAL: Duration = Duration::from_millis(50);
const LOG_PANE_ENTRIES: usize = 200;

/// Which part of the screen receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
    PageSize,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Search => Focus::Results,
            Focus::Results => Focus::PageSize,
            Focus::PageSize => Focus::Search,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::PageSize,
            Focus::Results => Focus::Search,
            Focus::PageSize => Focus::Results,
        }
    }
}

pub struct CitySearchApp {
    session: SearchSession,
    display: DisplayConfig,
    listeners: GlobalKeyListeners,
    search_input: SearchInput,
    table_state: TableState,
    log_buffer: Option<LogRingBuffer>,
    focus: Focus,
    show_log: bool,
    should_quit: bool,
}

impl CitySearchApp {
    pub fn new(
        session: SearchSession,
        display: DisplayConfig,
        log_buffer: Option<LogRingBuffer>,
    ) -> Self {
        let input_config = SearchInputConfig {
            max_len: session.max_query_len(),
            ..SearchInputConfig::default()
        };
        Self {
            session,
            display,
            listeners: GlobalKeyListeners::new(),
            search_input: SearchInput::with_config(input_config),
            table_state: TableState::default(),
            log_buffer,
            focus: Focus::Results,
            show_log: false,
            should_quit: false,
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SearchSession {
        &mut self.session
    }

    pub fn search_text(&self) -> &str {
        self.search_input.value()
    }

    pub fn listeners(&self) -> &GlobalKeyListeners {
        &self.listeners
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!(
                "Failed to enable raw mode: {}. Try running with --print.",
                e
            ));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        // Ctrl+/ arrives as a distinct key only with disambiguated escape codes
        let enhanced = supports_keyboard_enhancement().unwrap_or(false)
            && execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )
            .is_ok();
        debug!(target: "input", "keyboard enhancement: {}", enhanced);

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                if enhanced {
                    let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
                }
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        // stderr belongs to the alternate screen until restore
        let _echo = dual_logging::suspend_stderr_echo();
        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        if enhanced {
            let _ = execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags);
        }
        let _ = disable_raw_mode();
        let _ = execute!(terminal.backend_mut(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    /// Install the global shortcut and issue the initial fetch. The shortcut
    /// stays installed until the returned registration is dropped.
    pub fn mount(&mut self) -> ListenerRegistration {
        let registration = self.listeners.install(Box::new(FocusSearchShortcut));
        self.session.start();
        registration
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let _shortcut = self.mount();
        terminal.draw(|f| self.ui(f))?;

        loop {
            let was_loading = self.session.is_in_flight();
            let was_typing = self.session.search_pending();
            let mut dirty = self.session.drain_outcomes() > 0;

            if event::poll(POLL_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    // On Windows, filter out key release events
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                        dirty = true;
                    }
                } else {
                    dirty = true; // resize
                }
            }

            if self.should_quit {
                break;
            }

            dirty |= was_loading != self.session.is_in_flight()
                || was_typing != self.session.search_pending()
                || self.show_log;
            if dirty {
                terminal.draw(|f| self.ui(f))?;
            }
        }

        self.session.cancel_pending_search();
        info!(target: "system", "leaving city search view");
        Ok(())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        trace!(target: "input", "Key: {:?} (focus {:?})", key, self.focus);

        if let Some(action) = self.listeners.dispatch(&key) {
            match action {
                GlobalAction::FocusSearch => {
                    debug!(target: "input", "focus -> search");
                    self.focus = Focus::Search;
                }
            }
            return;
        }

        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) | (KeyCode::Esc, _) => {
                self.should_quit = true;
                return;
            }
            (KeyCode::Tab, _) => {
                self.focus = self.focus.next();
                return;
            }
            (KeyCode::BackTab, _) => {
                self.focus = self.focus.prev();
                return;
            }
            (KeyCode::F(5), _) => {
                self.show_log = !self.show_log;
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_key(key),
            Focus::Results => self.handle_results_key(key),
            Focus::PageSize => match page_size_selector::handle_key(&key) {
                PageSizeAction::Increase => self.session.next_page_size(),
                PageSizeAction::Decrease => self.session.prev_page_size(),
                PageSizeAction::PassThrough => {}
            },
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        let disabled = self.session.is_in_flight();
        match self.search_input.handle_key(key, disabled) {
            SearchInputAction::TextChanged(text) => self.session.set_text(&text),
            SearchInputAction::Ignored => {
                trace!(target: "input", "search input disabled while loading")
            }
            SearchInputAction::Continue => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.session.next_page(),
            KeyCode::Left | KeyCode::Char('h') => self.session.prev_page(),
            KeyCode::Home => self.session.first_page(),
            KeyCode::End => self.session.last_page(),
            KeyCode::Down | KeyCode::Char('j') => self.table_state.select_next(),
            KeyCode::Up | KeyCode::Char('k') => self.table_state.select_previous(),
            _ => {}
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let mut constraints = vec![
            Constraint::Length(3), // search
            Constraint::Min(5),    // results
            Constraint::Length(3), // pages + page size
            Constraint::Length(1), // status
        ];
        if self.show_log {
            constraints.insert(2, Constraint::Length(10));
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(f.area());

        self.search_input.render(
            f,
            chunks[0],
            self.focus == Focus::Search,
            self.session.is_in_flight(),
            self.session.search_pending(),
        );

        let query = self.session.query().clone();
        let results = self.session.results();
        let view = project_rows(results, &self.display.flag_url_template);
        let links = page_links(results.total_count, query.page_size, query.page);
        let ctx = TableRenderContext {
            view: &view,
            page_links: &links,
            total_count: results.total_count,
            use_glyphs: self.display.use_glyphs,
            show_flag_urls: self.display.show_flag_urls,
            focused: self.focus == Focus::Results,
        };
        table_renderer::render_table(f, chunks[1], &ctx, &mut self.table_state);

        let mut next = 2;
        if self.show_log {
            let entries = self
                .log_buffer
                .as_ref()
                .map(|buffer| buffer.get_recent(LOG_PANE_ENTRIES))
                .unwrap_or_default();
            table_renderer::render_log_pane(f, chunks[next], &entries);
            next += 1;
        }

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(22)])
            .split(chunks[next]);
        table_renderer::render_page_links(f, bottom[0], ctx.page_links, self.focus == Focus::Results);
        page_size_selector::render(f, bottom[1], query.page_size, self.focus == Focus::PageSize);

        self.render_status(f, chunks[next + 1]);
    }

    fn render_status(&self, f: &mut Frame, area: ratatui::layout::Rect) {
        let query = self.session.query();
        let mut spans = Vec::new();
        if self.session.is_in_flight() {
            spans.push(Span::styled("Loading… ", Style::default().fg(Color::Cyan)));
        }
        spans.push(Span::raw(format!(
            "page {}/{} · {} per page · ",
            query.page,
            self.session.page_count().max(1),
            query.page_size
        )));
        spans.push(Span::styled(
            "Ctrl+/ search · Tab focus · ←/→ page · F5 log · Esc quit",
            Style::default().fg(Color::DarkGray),
        ));
        f.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
