// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - The event loop (keyboard input, ticks, load results, login state)
// - Routing key presses: modal first, then global keys, then page keys

pub mod app;
pub mod clipboard;
pub mod components;
pub mod modal;
pub mod scroll;
pub mod theme;
pub mod views;

use crate::logging::LogBuffer;
use crate::Services;
use anyhow::{Context, Result};
use app::{App, AppEvent};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::{mpsc, watch};

/// Run the TUI until the user quits
pub async fn run_tui(services: Services, log_buffer: LogBuffer) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut logged_in_rx = services.dispatcher.session().subscribe();
    let mut app = App::new(services, log_buffer, event_tx);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx, &mut logged_in_rx).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Wakes on whichever comes first: a key press, a redraw tick, a finished
/// background request, or a change of the session's login state.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
    logged_in_rx: &mut watch::Receiver<bool>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(100));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick_animation();
            }

            Some(app_event) = event_rx.recv() => {
                app.handle_event(app_event);
            }

            Ok(()) = logged_in_rx.changed() => {
                let logged_in = *logged_in_rx.borrow_and_update();
                app.set_logged_in(logged_in);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Layered dispatch: Modal → Global → Page
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        app.should_quit = true;
        return;
    }

    if handle_modal_input(app, key_event.code) {
        return;
    }

    if handle_global_keys(app, key_event.code) {
        return;
    }

    handle_page_keys(app, key_event.code);
}

/// Returns true if a modal absorbed the input
fn handle_modal_input(app: &mut App, key: KeyCode) -> bool {
    let Some(ref mut modal) = app.modal else {
        return false;
    };

    match modal.handle_input(key) {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::SubmitLogin(credentials) => app.submit_login(credentials),
    }
    true
}

/// Keys that work on every page; returns true if handled
fn handle_global_keys(app: &mut App, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::help()),
        KeyCode::Char('L') => app.show_logs = !app.show_logs,
        KeyCode::Char('g') => app.open_route("home"),
        KeyCode::Char('m') => app.open_route("me"),
        KeyCode::Char('l') => app.modal = Some(Modal::login()),
        KeyCode::Char('o') => app.logout(),
        KeyCode::Char('y') => app.copy_page(false),
        KeyCode::Char('Y') => app.copy_page(true),
        KeyCode::Char('r') => app.start_load(true),
        KeyCode::Backspace | KeyCode::Char('b') => app.go_back(),
        KeyCode::Char('f') => app.go_forward(),
        KeyCode::PageUp if app.show_logs => app.logs_scroll.page_up(),
        KeyCode::PageDown if app.show_logs => app.logs_scroll.page_down(),
        KeyCode::End if app.show_logs => app.logs_scroll.auto_follow = true,
        _ => return false,
    }
    true
}

fn handle_page_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => {
            app.selected = 0;
            app.content_scroll.scroll_to_top();
        }
        KeyCode::Enter => app.open_selected(),
        KeyCode::Char('n') | KeyCode::Right => app.next_page(),
        KeyCode::Char('p') | KeyCode::Left => app.prev_page(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.resize_page(true),
        KeyCode::Char('-') => app.resize_page(false),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::content;
    use crate::dispatch::testing::MockTransport;
    use crate::dispatch::Dispatcher;
    use crate::session::{MemoryTokenStore, Session};
    use std::sync::Arc;

    fn app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let config = Config {
            backend_url: "http://api.test".to_string(),
            ..Config::default()
        };
        let session = Arc::new(Session::new(Box::new(MemoryTokenStore::default())));
        let services = Services {
            router: content::router(&config.backend_url),
            dispatcher: Dispatcher::new(MockTransport::new(), session),
            config,
        };
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(services, LogBuffer::new(), tx), rx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_help_modal_swallows_global_keys() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('?'));
        assert!(matches!(app.modal, Some(Modal::Help)));

        // g would navigate home; the modal takes it instead
        press(&mut app, KeyCode::Char('g'));
        assert!(matches!(app.modal, Some(Modal::Help)));

        press(&mut app, KeyCode::Esc);
        assert!(app.modal.is_none());
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_enter_on_home_menu_navigates() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.history.current(), "/artists");
        assert_eq!(app.title, "Medium Tech | Artists");

        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.history.current(), "/");
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.history.current(), "/artists");
    }

    #[tokio::test]
    async fn test_logout_lands_on_login_form() {
        let (mut app, _rx) = app();
        press(&mut app, KeyCode::Char('o'));

        assert_eq!(app.history.current(), "/login");
        assert!(matches!(app.modal, Some(Modal::Login(_))));

        // Typing goes to the form, not to the global keys
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);
    }
}
