//! Single-record page
//!
//! `Idle -> Loading -> Loaded | Error`. A record preloaded by the previous
//! navigation goes straight to `Loaded` without touching the network.

use super::{LoadOutcome, LoadTicket, Loader, PageState, Preload, RouteData};
use crate::dispatch::Dispatcher;
use crate::observable::Observable;
use crate::record::Record;
use crate::render::{render, RenderOptions, Table};
use crate::router::{Params, Router};

/// What a record page currently displays
#[derive(Debug, Clone, PartialEq)]
pub enum RecordView {
    Status(String),
    Table(Table),
}

pub struct RecordPage {
    route: &'static str,
    params: Params,
    authenticated: bool,
    widget: RenderOptions,
    state: Observable<PageState>,
    record: Option<Record>,
    loader: Loader,
}

impl RecordPage {
    pub fn new(route: &'static str, data: RouteData, widget: RenderOptions, authenticated: bool) -> Self {
        let (state, record) = match data.preload {
            Some(Preload::Record(record)) => {
                tracing::debug!("{}: using preloaded record", route);
                (PageState::Loaded, Some(record))
            }
            Some(Preload::List(_)) => {
                tracing::debug!("{}: ignoring list preload", route);
                (PageState::Idle, None)
            }
            None => (PageState::Idle, None),
        };

        Self {
            route,
            params: data.params,
            authenticated,
            widget,
            state: Observable::new(state),
            record,
            loader: Loader::new(),
        }
    }

    pub fn state(&self) -> PageState {
        self.state.get()
    }

    pub fn record(&self) -> Option<&Record> {
        self.record.as_ref()
    }

    /// True until the first load has been started (or a preload applied)
    pub fn needs_load(&self) -> bool {
        self.state.get() == PageState::Idle
    }

    /// Enter `Loading` and describe the request to run
    ///
    /// Returns None when the backend URL cannot be built; the page is in
    /// `Error` then.
    pub fn begin_load(&mut self, router: &Router) -> Option<LoadTicket> {
        self.record = None;

        match router.backend_url(self.route, &self.params, &Params::new()) {
            Ok(url) => {
                tracing::debug!("fetching {}", url);
                self.state.set(PageState::Loading);
                Some(self.loader.issue(url, self.authenticated))
            }
            Err(e) => {
                tracing::warn!("{}: {}", self.route, e);
                self.state.set(PageState::Error(e.to_string()));
                None
            }
        }
    }

    /// Reload from any state
    pub fn refresh(&mut self, router: &Router) -> Option<LoadTicket> {
        self.begin_load(router)
    }

    /// Apply a finished request; returns false when the ticket is stale
    pub fn complete_load(&mut self, ticket: &LoadTicket, outcome: LoadOutcome) -> bool {
        if !self.loader.is_current(ticket) {
            tracing::debug!("{}: discarding stale response for {}", self.route, ticket.url);
            return false;
        }

        match outcome {
            Ok(json) => match Record::from_json(json) {
                Some(record) => {
                    self.record = Some(record);
                    self.state.set(PageState::Loaded);
                }
                None => self.fail("expected a JSON object".to_string()),
            },
            Err(e) => self.fail(e.to_string()),
        }
        true
    }

    /// Run the whole load inline (headless use)
    pub async fn load(&mut self, router: &Router, dispatcher: &Dispatcher) {
        if let Some(ticket) = self.begin_load(router) {
            let outcome = ticket.fetch(dispatcher).await;
            self.complete_load(&ticket, outcome);
        }
    }

    pub fn view(&self) -> RecordView {
        match (&self.record, self.state.get()) {
            (Some(record), PageState::Loaded) => RecordView::Table(render(record, &self.widget)),
            (_, state) => RecordView::Status(state.status_text()),
        }
    }

    fn fail(&mut self, message: String) {
        tracing::warn!("{}: {}", self.route, message);
        self.record = None;
        self.state.set(PageState::Error(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::testing::MockTransport;
    use crate::dispatch::RequestError;
    use crate::page::fixtures::{dispatcher, router};
    use crate::router::params;
    use serde_json::json;

    fn user_page(preload: Option<Preload>) -> RecordPage {
        let data = RouteData {
            params: params([("cid", "u1")]),
            query: Params::new(),
            preload,
        };
        RecordPage::new("user", data, RenderOptions::default(), false)
    }

    #[tokio::test]
    async fn test_load_success() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({"cid": "u1", "email": "a@b.c"}));
        let dispatcher = dispatcher(transport.clone(), None);

        let mut page = user_page(None);
        assert!(page.needs_load());
        page.load(&router(), &dispatcher).await;

        assert_eq!(page.state(), PageState::Loaded);
        assert_eq!(page.record().unwrap().text("email"), "a@b.c");
        assert_eq!(transport.call_count(), 1);
        assert_eq!(transport.calls()[0].url, "http://api.test/core/users/cid/u1");
        assert!(matches!(page.view(), RecordView::Table(t) if t.rows.len() == 2));
    }

    #[tokio::test]
    async fn test_preload_skips_fetch() {
        let transport = MockTransport::new();
        let record = Record::from_json(json!({"cid": "u1"})).unwrap();

        let page = user_page(Some(Preload::Record(record.clone())));

        assert_eq!(page.state(), PageState::Loaded);
        assert!(!page.needs_load());
        assert_eq!(page.record(), Some(&record));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_http_error_shows_status_text() {
        let transport = MockTransport::new();
        transport.push_json(404, json!({}));
        let dispatcher = dispatcher(transport, None);

        let mut page = user_page(None);
        page.load(&router(), &dispatcher).await;

        assert_eq!(page.state(), PageState::Error("Not Found".into()));
        assert_eq!(page.view(), RecordView::Status("error: Not Found".into()));
    }

    #[tokio::test]
    async fn test_authenticated_page_without_token() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(transport.clone(), None);

        let data = RouteData {
            params: params([("cid", "u1")]),
            ..Default::default()
        };
        let mut page = RecordPage::new("user", data, RenderOptions::default(), true);
        page.load(&router(), &dispatcher).await;

        assert_eq!(page.state(), PageState::Error("Not logged in".into()));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_non_object_payload_is_an_error() {
        let mut page = user_page(None);
        let ticket = page.begin_load(&router()).unwrap();
        page.complete_load(&ticket, Ok(json!([1, 2, 3])));

        assert_eq!(page.state(), PageState::Error("expected a JSON object".into()));
    }

    #[test]
    fn test_missing_param_goes_to_error() {
        let mut page = RecordPage::new("user", RouteData::default(), RenderOptions::default(), false);
        assert!(page.begin_load(&router()).is_none());
        assert!(matches!(page.state(), PageState::Error(m) if m.contains("cid")));
    }

    #[test]
    fn test_stale_outcome_is_discarded() {
        let mut page = user_page(None);
        let r = router();
        let first = page.begin_load(&r).unwrap();
        let second = page.refresh(&r).unwrap();

        let applied = page.complete_load(&second, Ok(json!({"cid": "new"})));
        assert!(applied);

        // The older request finishing last must not overwrite the newer one
        let applied = page.complete_load(&first, Err(RequestError::Transport("late".into())));
        assert!(!applied);
        assert_eq!(page.state(), PageState::Loaded);
        assert_eq!(page.record().unwrap().text("cid"), "new");
    }

    #[test]
    fn test_loading_clears_previous_record() {
        let record = Record::from_json(json!({"cid": "u1"})).unwrap();
        let mut page = user_page(Some(Preload::Record(record)));
        page.refresh(&router());

        assert!(page.record().is_none());
        assert_eq!(page.state(), PageState::Loading);
        assert_eq!(page.view(), RecordView::Status("loading...".into()));
    }
}
