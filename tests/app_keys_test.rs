mod common;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::runtime::Handle;

use city_search::config::config::DisplayConfig;
use city_search::session::{SearchSession, SessionOptions};
use city_search::ui::app::{CitySearchApp, Focus};
use city_search::ui::global_keys::ListenerRegistration;
use common::{settle, StubSource};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn key_with_mod(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
    KeyEvent::new(code, modifiers)
}

fn focus_search() -> KeyEvent {
    key_with_mod(KeyCode::Char('/'), KeyModifiers::CONTROL)
}

fn new_app(source: &std::sync::Arc<StubSource>) -> CitySearchApp {
    let session = SearchSession::new(source.clone(), Handle::current(), SessionOptions::default());
    CitySearchApp::new(session, DisplayConfig::default(), None)
}

async fn loaded_app(source: &std::sync::Arc<StubSource>) -> (CitySearchApp, ListenerRegistration) {
    let mut app = new_app(source);
    let registration = app.mount();
    app.session_mut().wait_for_outcome().await;
    (app, registration)
}

#[tokio::test(start_paused = true)]
async fn test_shortcut_focuses_search_from_anywhere() {
    let source = StubSource::new();
    let (mut app, _registration) = loaded_app(&source).await;
    assert_eq!(app.focus(), Focus::Results);

    app.handle_key(focus_search());
    assert_eq!(app.focus(), Focus::Search);
    assert_eq!(app.search_text(), "");

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Tab));
    assert_eq!(app.focus(), Focus::PageSize);

    app.handle_key(key_with_mod(KeyCode::Char('/'), KeyModifiers::SUPER));
    assert_eq!(app.focus(), Focus::Search);
}

#[tokio::test(start_paused = true)]
async fn test_shortcut_works_without_keyboard_enhancement() {
    let source = StubSource::new();
    let (mut app, _registration) = loaded_app(&source).await;

    // a legacy terminal reports Ctrl+/ as Ctrl+7
    app.handle_key(key_with_mod(KeyCode::Char('7'), KeyModifiers::CONTROL));
    assert_eq!(app.focus(), Focus::Search);
    assert_eq!(app.search_text(), "");

    app.handle_key(key(KeyCode::Char('7')));
    assert_eq!(app.search_text(), "7");
}

#[tokio::test(start_paused = true)]
async fn test_plain_slash_is_typed_not_intercepted() {
    let source = StubSource::new();
    let (mut app, _registration) = loaded_app(&source).await;

    app.handle_key(focus_search());
    app.handle_key(key(KeyCode::Char('/')));
    assert_eq!(app.search_text(), "/");
    assert_eq!(app.session().query().text, "/");
    assert!(app.session().search_pending());
}

#[tokio::test(start_paused = true)]
async fn test_typing_ignored_while_loading() {
    let source = StubSource::new();
    source.gate("del");
    let mut app = new_app(&source);
    let _registration = app.mount();

    app.handle_key(focus_search());
    app.handle_key(key(KeyCode::Char('d')));
    assert!(app.session().is_in_flight());
    assert_eq!(app.search_text(), "");
    assert_eq!(app.session().query().text, "");

    source.release("del");
    app.session_mut().wait_for_outcome().await;

    app.handle_key(key(KeyCode::Char('d')));
    assert_eq!(app.search_text(), "d");
    assert_eq!(app.session().query().text, "d");
}

#[tokio::test(start_paused = true)]
async fn test_unmount_releases_shortcut() {
    let source = StubSource::new();
    let mut app = new_app(&source);
    let registration = app.mount();
    app.session_mut().wait_for_outcome().await;
    assert_eq!(app.listeners().len(), 1);

    drop(registration);
    assert!(app.listeners().is_empty());

    app.handle_key(focus_search());
    assert_eq!(app.focus(), Focus::Results);
}

#[tokio::test(start_paused = true)]
async fn test_results_keys_change_page() {
    let source = StubSource::new();
    let (mut app, _registration) = loaded_app(&source).await;

    app.handle_key(key(KeyCode::Right));
    assert_eq!(app.session().query().page, 2);
    app.handle_key(key(KeyCode::End));
    assert_eq!(app.session().query().page, 3);
    app.handle_key(key(KeyCode::Char('h')));
    assert_eq!(app.session().query().page, 2);

    app.handle_key(key(KeyCode::Tab));
    app.handle_key(key(KeyCode::Up));
    assert_eq!(app.session().query().page_size.get(), 6);
    // page is kept when the page size changes
    assert_eq!(app.session().query().page, 2);

    settle().await;
    let offsets: Vec<u32> = source.calls().iter().map(|c| c.offset).collect();
    assert_eq!(offsets, vec![1, 2, 3, 2, 2]);
}

#[tokio::test(start_paused = true)]
async fn test_escape_quits() {
    let source = StubSource::new();
    let (mut app, _registration) = loaded_app(&source).await;
    assert!(!app.should_quit());

    app.handle_key(key(KeyCode::Esc));
    assert!(app.should_quit());
}
