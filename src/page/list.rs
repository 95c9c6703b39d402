//! Offset/size paginated list page
//!
//! Each load replaces the whole item collection. The cursor is mirrored
//! into the navigation URL (`?offset=..&size=..`) so a list position can
//! be returned to through history.

use super::{LoadOutcome, LoadTicket, Loader, PageState, Preload, RouteData};
use crate::dispatch::Dispatcher;
use crate::observable::Observable;
use crate::record::{records_from_json, Record};
use crate::router::{Navigator, Params, Router};

/// Where selecting a list item leads
#[derive(Debug, Clone, PartialEq)]
pub struct NavTarget {
    pub route: &'static str,
    pub params: Params,
    pub preload: Option<Preload>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub label: String,
    pub target: NavTarget,
}

/// Turns one record of the list into a selectable item
pub type ItemRenderer = fn(&Record) -> ListItem;

pub struct ListPage {
    route: &'static str,
    authenticated: bool,
    page_size: usize,
    page_offset: usize,
    state: Observable<PageState>,
    items: Vec<Record>,
    message: String,
    item_renderer: ItemRenderer,
    loader: Loader,
    /// Set once the first load has completed, successfully or not
    settled: bool,
}

impl ListPage {
    pub fn new(
        route: &'static str,
        data: RouteData,
        default_size: usize,
        item_renderer: ItemRenderer,
        authenticated: bool,
    ) -> Self {
        let (page_size, page_offset) = cursor_from_query(&data.query, default_size);

        let items = match data.preload {
            Some(Preload::List(items)) => items,
            _ => Vec::new(),
        };

        Self {
            route,
            authenticated,
            page_size,
            page_offset,
            state: Observable::new(PageState::Idle),
            items,
            message: String::new(),
            item_renderer,
            loader: Loader::new(),
            settled: false,
        }
    }

    pub fn route(&self) -> &'static str {
        self.route
    }

    pub fn state(&self) -> PageState {
        self.state.get()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_offset(&self) -> usize {
        self.page_offset
    }

    pub fn items(&self) -> &[Record] {
        &self.items
    }

    pub fn list_items(&self) -> Vec<ListItem> {
        self.items.iter().map(self.item_renderer).collect()
    }

    /// The line shown above the items
    pub fn status_line(&self) -> String {
        match self.state.get() {
            PageState::Loaded => self.message.clone(),
            state => state.status_text(),
        }
    }

    /// Lists always load on activation, even when seeded by a preload
    pub fn needs_load(&self) -> bool {
        self.state.get() == PageState::Idle
    }

    pub fn can_next(&self) -> bool {
        self.items.len() >= self.page_size
    }

    pub fn can_prev(&self) -> bool {
        self.page_offset > 0
    }

    fn cursor_query(&self) -> Params {
        let mut query = Params::new();
        query.insert("size".to_string(), self.page_size.to_string());
        query.insert("offset".to_string(), self.page_offset.to_string());
        query
    }

    pub fn begin_load(&mut self, router: &Router) -> Option<LoadTicket> {
        match router.backend_url(self.route, &Params::new(), &self.cursor_query()) {
            Ok(url) => {
                tracing::debug!("fetching {}", url);
                self.state.set(PageState::Loading);
                Some(self.loader.issue(url, self.authenticated))
            }
            Err(e) => {
                self.fail(e.to_string());
                None
            }
        }
    }

    pub fn refresh(&mut self, router: &Router) -> Option<LoadTicket> {
        self.begin_load(router)
    }

    /// Apply a finished request; returns false when the ticket is stale
    pub fn complete_load(&mut self, ticket: &LoadTicket, outcome: LoadOutcome) -> bool {
        if !self.loader.is_current(ticket) {
            tracing::debug!("{}: discarding stale response for {}", self.route, ticket.url);
            return false;
        }

        match outcome.map(records_from_json) {
            Ok(Some(items)) => {
                self.message = summary(&items, self.page_offset);
                self.items = items;
                self.state.set(PageState::Loaded);
            }
            Ok(None) => self.fail("expected a JSON array".to_string()),
            Err(e) => self.fail(e.to_string()),
        }

        self.settled = true;
        true
    }

    pub async fn load(&mut self, router: &Router, dispatcher: &Dispatcher) {
        if let Some(ticket) = self.begin_load(router) {
            let outcome = ticket.fetch(dispatcher).await;
            self.complete_load(&ticket, outcome);
        }
    }

    pub fn next_page(&mut self, router: &Router, navigator: &mut dyn Navigator) -> Option<LoadTicket> {
        self.page_offset += self.page_size;
        self.push_cursor(router, navigator);
        self.begin_load(router)
    }

    pub fn prev_page(&mut self, router: &Router, navigator: &mut dyn Navigator) -> Option<LoadTicket> {
        self.page_offset = self.page_offset.saturating_sub(self.page_size);
        self.push_cursor(router, navigator);
        self.begin_load(router)
    }

    /// Set a new page size and restart from offset 0; a size of 0 is ignored
    pub fn change_page_size(
        &mut self,
        size: usize,
        router: &Router,
        navigator: &mut dyn Navigator,
    ) -> Option<LoadTicket> {
        if size == 0 {
            tracing::warn!("{}: ignoring page size 0", self.route);
            return None;
        }

        self.page_size = size;
        self.page_offset = 0;
        self.push_cursor(router, navigator);
        self.begin_load(router)
    }

    fn push_cursor(&self, router: &Router, navigator: &mut dyn Navigator) {
        match router.nav_url(self.route, &Params::new(), &self.cursor_query()) {
            Ok(url) => navigator.push_history(url),
            Err(e) => tracing::warn!("{}: {}", self.route, e),
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("{}: {}", self.route, message);
        if !self.settled {
            self.items.clear();
        }
        self.state.set(PageState::Error(message));
    }
}

/// Page size and offset named by a navigation query
///
/// Missing or invalid values fall back to `default_size` and offset 0.
pub fn cursor_from_query(query: &Params, default_size: usize) -> (usize, usize) {
    let size = parse_count(query.get("size"))
        .filter(|size| *size > 0)
        .unwrap_or(default_size);
    let offset = parse_count(query.get("offset")).unwrap_or(0);
    (size, offset)
}

fn parse_count(value: Option<&String>) -> Option<usize> {
    value.and_then(|v| v.trim().parse::<usize>().ok())
}

fn summary(items: &[Record], offset: usize) -> String {
    match (items.len(), offset) {
        (0, 0) => "no items found".to_string(),
        (0, _) => "no items on this page, go to previous page".to_string(),
        (n, offset) => format!("showing items {} thru {}", offset + 1, offset + n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::MockTransport;
    use crate::dispatch::RequestError;
    use crate::page::fixtures::{dispatcher, router};
    use crate::router::{params, History};
    use serde_json::{json, Value as Json};

    fn user_item(user: &Record) -> ListItem {
        ListItem {
            label: user.text("cid"),
            target: NavTarget {
                route: "user",
                params: params([("cid", user.text("cid").as_str())]),
                preload: Some(Preload::Record(user.clone())),
            },
        }
    }

    fn users(n: usize) -> Json {
        Json::Array((0..n).map(|i| json!({"cid": format!("u{}", i)})).collect())
    }

    fn users_page(query: Params) -> ListPage {
        let data = RouteData {
            query,
            ..Default::default()
        };
        ListPage::new("users", data, 25, user_item, false)
    }

    async fn run(page: &mut ListPage, ticket: Option<LoadTicket>, dispatcher: &Dispatcher) {
        let ticket = ticket.expect("a request should have been issued");
        let outcome = ticket.fetch(dispatcher).await;
        page.complete_load(&ticket, outcome);
    }

    #[test]
    fn test_cursor_from_query() {
        let page = users_page(params([("size", "5"), ("offset", "10")]));
        assert_eq!(page.page_size(), 5);
        assert_eq!(page.page_offset(), 10);
    }

    #[test]
    fn test_invalid_query_falls_back_to_defaults() {
        let page = users_page(params([("size", "abc"), ("offset", "-5")]));
        assert_eq!(page.page_size(), 25);
        assert_eq!(page.page_offset(), 0);

        let page = users_page(params([("size", "0")]));
        assert_eq!(page.page_size(), 25);
    }

    #[tokio::test]
    async fn test_paging_scenario() {
        let transport = MockTransport::new();
        transport.push_json(200, users(5));
        transport.push_json(200, users(3));
        let dispatcher = dispatcher(transport.clone(), None);
        let router = router();
        let mut history = History::new("/users?size=5");

        let mut page = users_page(params([("size", "5")]));
        page.load(&router, &dispatcher).await;

        assert_eq!(page.status_line(), "showing items 1 thru 5");
        assert!(page.can_next());
        assert!(!page.can_prev());

        let ticket = page.next_page(&router, &mut history);
        run(&mut page, ticket, &dispatcher).await;

        assert_eq!(
            transport.calls()[1].url,
            "http://api.test/core/users?offset=5&size=5"
        );
        assert_eq!(history.current(), "/users?offset=5&size=5");
        assert_eq!(page.status_line(), "showing items 6 thru 8");
        assert!(!page.can_next());
        assert!(page.can_prev());
    }

    #[tokio::test]
    async fn test_empty_page_messages() {
        let transport = MockTransport::new();
        transport.push_json(200, users(0));
        transport.push_json(200, users(0));
        let dispatcher = dispatcher(transport, None);
        let router = router();

        let mut page = users_page(Params::new());
        page.load(&router, &dispatcher).await;
        assert_eq!(page.status_line(), "no items found");

        let mut page = users_page(params([("offset", "50")]));
        page.load(&router, &dispatcher).await;
        assert_eq!(page.status_line(), "no items on this page, go to previous page");
    }

    #[tokio::test]
    async fn test_load_replaces_items() {
        let transport = MockTransport::new();
        transport.push_json(200, users(4));
        transport.push_json(200, json!([{"cid": "only"}]));
        let dispatcher = dispatcher(transport, None);
        let router = router();

        let mut page = users_page(Params::new());
        page.load(&router, &dispatcher).await;
        assert_eq!(page.items().len(), 4);

        page.load(&router, &dispatcher).await;
        assert_eq!(page.items().len(), 1);
        assert_eq!(page.items()[0].text("cid"), "only");
    }

    #[test]
    fn test_non_object_elements_count_toward_the_page() {
        let r = router();
        let mut page = users_page(params([("size", "3")]));

        let ticket = page.begin_load(&r).unwrap();
        page.complete_load(&ticket, Ok(json!([{"cid": "a"}, null, {"cid": "b"}])));

        assert_eq!(page.items().len(), 3);
        assert_eq!(page.status_line(), "showing items 1 thru 3");
        assert!(page.can_next());
    }

    #[tokio::test]
    async fn test_prev_page_never_goes_negative() {
        let transport = MockTransport::new();
        transport.push_json(200, users(2));
        let dispatcher = dispatcher(transport.clone(), None);
        let router = router();
        let mut history = History::new("/users");

        let mut page = users_page(params([("size", "5"), ("offset", "3")]));
        let ticket = page.prev_page(&router, &mut history);
        run(&mut page, ticket, &dispatcher).await;

        assert_eq!(page.page_offset(), 0);
        assert!(!page.can_prev());
        assert_eq!(history.current(), "/users?offset=0&size=5");
    }

    #[tokio::test]
    async fn test_change_page_size_issues_one_request() {
        let transport = MockTransport::new();
        transport.push_json(200, users(10));
        let dispatcher = dispatcher(transport.clone(), None);
        let router = router();
        let mut history = History::new("/users");

        let mut page = users_page(params([("size", "5"), ("offset", "20")]));
        let ticket = page.change_page_size(10, &router, &mut history);
        run(&mut page, ticket, &dispatcher).await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(
            transport.calls()[0].url,
            "http://api.test/core/users?offset=0&size=10"
        );
        assert_eq!(page.page_offset(), 0);
        assert_eq!(history.current(), "/users?offset=0&size=10");
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let mut history = History::new("/users");
        let mut page = users_page(params([("size", "5")]));

        assert!(page.change_page_size(0, &router(), &mut history).is_none());
        assert_eq!(page.page_size(), 5);
        assert!(!history.can_back());
    }

    #[test]
    fn test_preload_seeds_items_but_still_loads() {
        let seed = vec![Record::from_json(json!({"cid": "seed"})).unwrap()];
        let data = RouteData {
            preload: Some(Preload::List(seed)),
            ..Default::default()
        };
        let page = ListPage::new("users", data, 25, user_item, false);

        assert_eq!(page.items().len(), 1);
        assert!(page.needs_load());
    }

    #[test]
    fn test_first_load_failure_clears_items() {
        let seed = vec![Record::from_json(json!({"cid": "seed"})).unwrap()];
        let data = RouteData {
            preload: Some(Preload::List(seed)),
            ..Default::default()
        };
        let mut page = ListPage::new("users", data, 25, user_item, false);

        let ticket = page.begin_load(&router()).unwrap();
        page.complete_load(&ticket, Err(RequestError::Transport("connection refused".into())));

        assert!(page.items().is_empty());
        assert_eq!(page.status_line(), "error: connection refused");
    }

    #[test]
    fn test_later_failure_keeps_items() {
        let r = router();
        let mut page = users_page(Params::new());

        let ticket = page.begin_load(&r).unwrap();
        page.complete_load(&ticket, Ok(users(3)));

        let ticket = page.refresh(&r).unwrap();
        page.complete_load(
            &ticket,
            Err(RequestError::Http {
                status: 500,
                status_text: "Internal Server Error".into(),
            }),
        );

        assert_eq!(page.items().len(), 3);
        assert_eq!(page.state(), PageState::Error("Internal Server Error".into()));
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let r = router();
        let mut history = History::new("/users");
        let mut page = users_page(params([("size", "2")]));

        let first = page.begin_load(&r).unwrap();
        let second = page.next_page(&r, &mut history).unwrap();

        assert!(page.complete_load(&second, Ok(users(1))));
        assert!(!page.complete_load(&first, Ok(users(2))));
        assert_eq!(page.items().len(), 1);
        assert_eq!(page.status_line(), "showing items 3 thru 3");
    }

    #[test]
    fn test_list_items_use_renderer() {
        let r = router();
        let mut page = users_page(Params::new());
        let ticket = page.begin_load(&r).unwrap();
        page.complete_load(&ticket, Ok(users(2)));

        let items = page.list_items();
        assert_eq!(items[1].label, "u1");
        assert_eq!(items[1].target.route, "user");
        assert!(matches!(items[1].target.preload, Some(Preload::Record(_))));
    }
}
