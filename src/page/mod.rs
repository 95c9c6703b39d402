//! Content page engine
//!
//! A page is created when a route is activated and dropped when the route
//! is left. Loading is split in two halves so the UI task never awaits:
//!
//! 1. `begin_load()` moves the page to `Loading` and returns a `LoadTicket`
//!    describing exactly one GET.
//! 2. Whoever runs the request hands the outcome back through
//!    `complete_load(ticket, outcome)`. Only the newest ticket of the same
//!    page instance is applied; anything else is discarded.
//!
//! Headless callers use the `load()` helpers, which do both halves inline.

pub mod list;
pub mod record;

pub use list::{cursor_from_query, ListItem, ListPage, NavTarget};
pub use record::{RecordPage, RecordView};

use crate::dispatch::{Dispatcher, RequestError};
use crate::record::Record;
use crate::router::Params;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of a page's data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

impl PageState {
    /// Text shown in place of content while there is nothing to show
    pub fn status_text(&self) -> String {
        match self {
            PageState::Loading => "loading...".to_string(),
            PageState::Error(message) => format!("error: {}", message),
            PageState::Idle | PageState::Loaded => String::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, PageState::Loading)
    }
}

/// Data handed to the next page by the navigation that created it
#[derive(Debug, Clone, PartialEq)]
pub enum Preload {
    Record(Record),
    List(Vec<Record>),
}

/// Everything a page factory receives on route activation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteData {
    pub params: Params,
    pub query: Params,
    /// Consumed once by the page that is created
    pub preload: Option<Preload>,
}

/// Identity of one page instance; never reused within a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(u64);

impl PageId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        PageId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// One GET issued by a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub page: PageId,
    pub generation: u64,
    pub url: String,
    pub authenticated: bool,
}

/// Result of running a ticket's request
pub type LoadOutcome = Result<serde_json::Value, RequestError>;

impl LoadTicket {
    pub async fn fetch(&self, dispatcher: &Dispatcher) -> LoadOutcome {
        dispatcher.get_json(&self.url, self.authenticated).await
    }
}

/// Issues tickets and decides whether an outcome is still wanted
#[derive(Debug)]
struct Loader {
    id: PageId,
    generation: u64,
}

impl Loader {
    fn new() -> Self {
        Self {
            id: PageId::next(),
            generation: 0,
        }
    }

    fn issue(&mut self, url: String, authenticated: bool) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            page: self.id,
            generation: self.generation,
            url,
            authenticated,
        }
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        ticket.page == self.id && ticket.generation == self.generation
    }
}
