// App state - everything the TUI needs to render and react to input
//
// The App owns the navigation history and the active page. Loads run as
// spawned tasks; their outcomes come back through the AppEvent channel and
// are handed to the page, which drops them if they are stale.

use super::clipboard;
use super::components::Toast;
use super::modal::Modal;
use super::scroll::ScrollState;
use super::theme::Theme;
use crate::content::{self, Page, HOME_MENU};
use crate::dispatch::{Credentials, RequestError};
use crate::logging::LogBuffer;
use crate::page::{cursor_from_query, LoadOutcome, LoadTicket, Preload};
use crate::record::Record;
use crate::router::{History, Navigator, Params, Resolved, NOT_FOUND};
use crate::Services;
use tokio::sync::mpsc;

/// Page size step for `+`/`-`
pub const PAGE_SIZE_STEP: usize = 5;

const SPINNER: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Results of background work, delivered to the event loop
#[derive(Debug)]
pub enum AppEvent {
    Loaded {
        ticket: LoadTicket,
        outcome: LoadOutcome,
    },
    LoginFinished(Result<String, RequestError>),
}

/// Items of the last list page left, offered back when it is reopened
struct ListSnapshot {
    route: &'static str,
    cursor: (usize, usize),
    items: Vec<Record>,
}

pub struct App {
    pub services: Services,
    pub history: History,
    pub page: Page,
    /// Title of the active route
    pub title: &'static str,

    /// Selected entry on the home menu or a list page
    pub selected: usize,
    /// Record page scroll
    pub content_scroll: ScrollState,

    pub log_buffer: LogBuffer,
    pub logs_scroll: ScrollState,
    pub show_logs: bool,

    /// Mirrors the session's logged-in flag
    pub logged_in: bool,
    pub modal: Option<Modal>,
    pub toast: Option<Toast>,
    pub theme: Theme,
    pub should_quit: bool,

    spinner_frame: usize,
    events: mpsc::UnboundedSender<AppEvent>,
    last_list: Option<ListSnapshot>,
}

impl App {
    /// Build the app and activate the configured start route
    pub fn new(
        services: Services,
        log_buffer: LogBuffer,
        events: mpsc::UnboundedSender<AppEvent>,
    ) -> Self {
        let start = services.config.start_route.clone();
        let logged_in = services.dispatcher.session().is_logged_in();
        let theme = Theme::by_name(&services.config.theme);

        let mut app = Self {
            services,
            history: History::new(start.clone()),
            page: Page::Home,
            title: "Medium Tech",
            selected: 0,
            content_scroll: ScrollState::new(),
            log_buffer,
            logs_scroll: ScrollState::following(),
            show_logs: false,
            logged_in,
            modal: None,
            toast: None,
            theme,
            should_quit: false,
            spinner_frame: 0,
            events,
            last_list: None,
        };
        app.activate(&start, None);
        app
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────

    /// Build and start the page for a navigation URL, without touching history
    pub fn activate(&mut self, url: &str, preload: Option<Preload>) {
        self.remember_list();

        let page = match self.services.router.resolve(url) {
            Ok(resolved) => {
                tracing::debug!("activating {} for {}", resolved.route.name, url);
                self.title = resolved.route.title;
                let preload = preload.or_else(|| self.list_seed(&resolved));
                content::activate(resolved, preload, self.services.config.page_size)
            }
            Err(e) => {
                tracing::warn!("{}: {}", url, e);
                self.title = "Medium Tech | Not Found";
                Page::NotFound(NOT_FOUND.to_string())
            }
        };
        self.page = page;

        self.selected = 0;
        self.content_scroll = ScrollState::new();
        if matches!(self.page, Page::Login) && !matches!(self.modal, Some(Modal::Login(_))) {
            self.modal = Some(Modal::login());
        }

        self.start_load(false);
    }

    /// Keep the items of the list page being left
    fn remember_list(&mut self) {
        if let Page::List(list) = &self.page {
            if !list.items().is_empty() {
                self.last_list = Some(ListSnapshot {
                    route: list.route(),
                    cursor: (list.page_size(), list.page_offset()),
                    items: list.items().to_vec(),
                });
            }
        }
    }

    /// Seed for a list page that shows the same route and cursor as the last one left
    fn list_seed(&mut self, resolved: &Resolved) -> Option<Preload> {
        let snapshot = self.last_list.take()?;
        let cursor = cursor_from_query(&resolved.query, self.services.config.page_size);
        if snapshot.route == resolved.route.name && snapshot.cursor == cursor {
            Some(Preload::List(snapshot.items))
        } else {
            self.last_list = Some(snapshot);
            None
        }
    }

    /// Push a URL and activate it
    pub fn navigate(&mut self, url: String, preload: Option<Preload>) {
        self.history.navigate(url);
        self.activate_pending(preload);
    }

    /// Activate whatever `History::navigate` left pending
    fn activate_pending(&mut self, preload: Option<Preload>) {
        if let Some(url) = self.history.take_pending() {
            self.activate(&url, preload);
        }
    }

    pub fn open_route(&mut self, name: &str) {
        match self
            .services
            .router
            .nav_url(name, &Params::new(), &Params::new())
        {
            Ok(url) => self.navigate(url, None),
            Err(e) => self.show_toast(format!("✗ {}", e)),
        }
    }

    pub fn go_back(&mut self) {
        if let Some(url) = self.history.back().map(str::to_string) {
            self.activate(&url, None);
        }
    }

    pub fn go_forward(&mut self) {
        if let Some(url) = self.history.forward().map(str::to_string) {
            self.activate(&url, None);
        }
    }

    /// Open the selected home menu entry or list item
    pub fn open_selected(&mut self) {
        match &self.page {
            Page::Home => {
                if let Some((_, route)) = HOME_MENU.get(self.selected) {
                    self.open_route(route);
                }
            }
            Page::List(page) => {
                let Some(item) = page.list_items().into_iter().nth(self.selected) else {
                    return;
                };
                match content::target_url(&self.services.router, &item.target) {
                    Ok(url) => self.navigate(url, item.target.preload),
                    Err(e) => self.show_toast(format!("✗ {}", e)),
                }
            }
            _ => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Loading
    // ─────────────────────────────────────────────────────────────────────

    /// Start a load for the active page; `refresh` reloads a loaded page
    pub fn start_load(&mut self, refresh: bool) {
        let router = &self.services.router;
        let ticket = match &mut self.page {
            Page::Record(page) if refresh || page.needs_load() => page.refresh(router),
            Page::List(page) if refresh || page.needs_load() => page.refresh(router),
            _ => None,
        };
        if let Some(ticket) = ticket {
            self.spawn_load(ticket);
        }
    }

    fn spawn_load(&self, ticket: LoadTicket) {
        let dispatcher = self.services.dispatcher.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = ticket.fetch(&dispatcher).await;
            // Receiver only goes away when the TUI is shutting down
            let _ = events.send(AppEvent::Loaded { ticket, outcome });
        });
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Loaded { ticket, outcome } => {
                match &mut self.page {
                    Page::Record(page) => {
                        page.complete_load(&ticket, outcome);
                    }
                    Page::List(page) => {
                        if page.complete_load(&ticket, outcome) {
                            self.selected = self.selected.min(page.items().len().saturating_sub(1));
                        }
                    }
                    _ => tracing::debug!("no page left for response from {}", ticket.url),
                }
            }
            AppEvent::LoginFinished(Ok(_)) => {
                self.modal = None;
                self.show_toast("✓ Logged in");
                self.open_route("me");
            }
            AppEvent::LoginFinished(Err(e)) => {
                if let Some(Modal::Login(form)) = &mut self.modal {
                    form.submitting = false;
                    form.error = Some(e.to_string());
                } else {
                    self.show_toast(format!("✗ Login failed: {}", e));
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // List paging
    // ─────────────────────────────────────────────────────────────────────

    pub fn next_page(&mut self) {
        let ticket = match &mut self.page {
            Page::List(page) if page.can_next() => {
                page.next_page(&self.services.router, &mut self.history)
            }
            _ => None,
        };
        self.after_paging(ticket);
    }

    pub fn prev_page(&mut self) {
        let ticket = match &mut self.page {
            Page::List(page) if page.can_prev() => {
                page.prev_page(&self.services.router, &mut self.history)
            }
            _ => None,
        };
        self.after_paging(ticket);
    }

    /// Grow or shrink the page size by one step
    pub fn resize_page(&mut self, grow: bool) {
        let Page::List(page) = &mut self.page else {
            return;
        };

        let current = page.page_size();
        let size = if grow {
            current + PAGE_SIZE_STEP
        } else {
            current.saturating_sub(PAGE_SIZE_STEP)
        };
        if size == 0 {
            self.show_toast(format!("Page size is already {}", current));
            return;
        }

        let ticket = page.change_page_size(size, &self.services.router, &mut self.history);
        self.after_paging(ticket);
    }

    fn after_paging(&mut self, ticket: Option<LoadTicket>) {
        if let Some(ticket) = ticket {
            self.selected = 0;
            self.spawn_load(ticket);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────

    pub fn submit_login(&mut self, credentials: Credentials) {
        let url = match self
            .services
            .router
            .backend_url("login", &Params::new(), &Params::new())
        {
            Ok(url) => url,
            Err(e) => {
                self.handle_event(AppEvent::LoginFinished(Err(RequestError::Transport(
                    e.to_string(),
                ))));
                return;
            }
        };

        let dispatcher = self.services.dispatcher.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = dispatcher.login(&url, &credentials).await;
            let _ = events.send(AppEvent::LoginFinished(result));
        });
    }

    pub fn logout(&mut self) {
        let session = self.services.dispatcher.session();
        match session.logout(&self.services.router, &mut self.history) {
            Ok(()) => {
                self.show_toast("✓ Logged out");
                self.activate_pending(None);
            }
            Err(e) => self.show_toast(format!("✗ Logout failed: {:#}", e)),
        }
    }

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Selection and scrolling
    // ─────────────────────────────────────────────────────────────────────

    fn selectable_count(&self) -> usize {
        match &self.page {
            Page::Home => HOME_MENU.len(),
            Page::List(page) => page.items().len(),
            _ => 0,
        }
    }

    pub fn select_prev(&mut self) {
        if let Page::Record(_) = self.page {
            self.content_scroll.scroll_up();
        } else {
            self.selected = self.selected.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self) {
        if let Page::Record(_) = self.page {
            self.content_scroll.scroll_down();
        } else if self.selected + 1 < self.selectable_count() {
            self.selected += 1;
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Feedback
    // ─────────────────────────────────────────────────────────────────────

    /// Copy the page as text, or the record as JSON when `json` is set
    pub fn copy_page(&mut self, json: bool) {
        let text = if json {
            clipboard::page_json(&self.page)
        } else {
            clipboard::page_text(&self.page)
        };
        let Some(text) = text else {
            self.show_toast("Nothing to copy");
            return;
        };
        match clipboard::copy_to_clipboard(&text) {
            Ok(()) if json => self.show_toast("✓ Copied JSON to clipboard"),
            Ok(()) => self.show_toast("✓ Copied to clipboard"),
            Err(e) => {
                tracing::warn!("{:#}", e);
                self.show_toast("✗ Failed to copy");
            }
        }
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    pub fn is_loading(&self) -> bool {
        match &self.page {
            Page::Record(page) => page.state().is_loading(),
            Page::List(page) => page.state().is_loading(),
            _ => matches!(
                &self.modal,
                Some(Modal::Login(form)) if form.submitting
            ),
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER[self.spinner_frame % SPINNER.len()]
    }

    /// Advance the spinner and expire the toast
    pub fn tick_animation(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }
    }
}
