//! Route table, URL building and navigation history
//!
//! Routes are named. Each has a navigation path pattern (`/users/:cid`),
//! an optional backend path pattern (`/core/users/cid/:cid`) and a title.
//! `Router` builds backend and navigation URLs from a route name plus path
//! and query parameters, and resolves navigation URLs back to routes.
//! `History` is the in-process stand-in for browser history.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::Url;
use std::collections::BTreeMap;
use std::fmt;

/// Characters escaped inside one path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Path or query parameters
pub type Params = BTreeMap<String, String>;

/// Build a `Params` map from string pairs
pub fn params<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Params {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Route that unmatched navigation URLs resolve to
pub const NOT_FOUND: &str = "notFound";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub backend: Option<&'static str>,
    pub title: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    UnknownRoute(String),
    NoBackend(String),
    MissingParam { route: String, param: String },
    InvalidUrl(String),
}

impl fmt::Display for RouteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRoute(name) => write!(f, "unknown route '{}'", name),
            Self::NoBackend(name) => write!(f, "route '{}' has no backend endpoint", name),
            Self::MissingParam { route, param } => {
                write!(f, "route '{}' requires parameter '{}'", route, param)
            }
            Self::InvalidUrl(msg) => write!(f, "invalid url: {}", msg),
        }
    }
}

impl std::error::Error for RouteError {}

/// A navigation URL resolved to its route
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: &'static Route,
    pub params: Params,
    pub query: Params,
}

#[derive(Debug, Clone)]
pub struct Router {
    routes: &'static [Route],
    backend_prefix: String,
}

impl Router {
    pub fn new(routes: &'static [Route], backend_prefix: impl Into<String>) -> Self {
        Self {
            routes,
            backend_prefix: backend_prefix.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn routes(&self) -> &'static [Route] {
        self.routes
    }

    pub fn route(&self, name: &str) -> Result<&'static Route, RouteError> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))
    }

    /// Absolute backend URL for a route
    pub fn backend_url(&self, name: &str, params: &Params, query: &Params) -> Result<String, RouteError> {
        let route = self.route(name)?;
        let backend = route
            .backend
            .ok_or_else(|| RouteError::NoBackend(name.to_string()))?;
        let path = fill_pattern(route, backend, params)?;

        let mut url = Url::parse(&format!("{}{}", self.backend_prefix, path))
            .map_err(|e| RouteError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(url.to_string())
    }

    /// Relative navigation URL for a route (path plus query string)
    pub fn nav_url(&self, name: &str, params: &Params, query: &Params) -> Result<String, RouteError> {
        let route = self.route(name)?;
        let path = fill_pattern(route, route.path, params)?;

        let mut url = nav_base()
            .join(&path)
            .map_err(|e| RouteError::InvalidUrl(e.to_string()))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query.iter());
        }
        Ok(relative(&url))
    }

    /// Match a navigation URL against the route table
    ///
    /// Routes are tried in table order; an unmatched path resolves to the
    /// `notFound` route when the table has one.
    pub fn resolve(&self, nav_url: &str) -> Result<Resolved, RouteError> {
        let url = nav_base()
            .join(nav_url)
            .map_err(|e| RouteError::InvalidUrl(e.to_string()))?;
        let query: Params = url.query_pairs().into_owned().collect();
        let segments = split_path(url.path());

        for route in self.routes {
            if route.name == NOT_FOUND {
                continue;
            }
            if let Some(params) = match_pattern(route.path, &segments) {
                return Ok(Resolved {
                    route,
                    params,
                    query,
                });
            }
        }

        let route = self.route(NOT_FOUND)?;
        Ok(Resolved {
            route,
            params: Params::new(),
            query,
        })
    }
}

fn nav_base() -> Url {
    Url::parse("http://app.local/").expect("static base url parses")
}

fn relative(url: &Url) -> String {
    match url.query() {
        Some(q) if !q.is_empty() => format!("{}?{}", url.path(), q),
        _ => url.path().to_string(),
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        // Url keeps path segments percent-encoded
        .map(percent_decode)
        .collect()
}

fn percent_decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn fill_pattern(route: &Route, pattern: &str, params: &Params) -> Result<String, RouteError> {
    let mut out = Vec::new();
    for segment in pattern.split('/') {
        match segment.strip_prefix(':') {
            Some(name) => {
                let value = params.get(name).ok_or_else(|| RouteError::MissingParam {
                    route: route.name.to_string(),
                    param: name.to_string(),
                })?;
                out.push(encode_segment(value));
            }
            None => out.push(segment.to_string()),
        }
    }
    let path = out.join("/");
    if path.starts_with('/') {
        Ok(path)
    } else {
        Ok(format!("/{}", path))
    }
}

fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

fn match_pattern(pattern: &str, segments: &[String]) -> Option<Params> {
    let parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    if parts.len() != segments.len() {
        return None;
    }

    let mut params = Params::new();
    for (part, segment) in parts.iter().zip(segments) {
        match part.strip_prefix(':') {
            Some(name) => {
                params.insert(name.to_string(), segment.clone());
            }
            None if part == segment => {}
            None => return None,
        }
    }
    Some(params)
}

/// Navigation side effects the page engine needs from its host
pub trait Navigator {
    /// Record a new URL without re-activating the page (deep link update)
    fn push_history(&mut self, url: String);

    /// Go to a URL, activating whatever route it resolves to
    fn navigate(&mut self, url: String);
}

/// Linear back/forward history of navigation URLs
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
    /// Set by `navigate`; the host drains it and activates the route
    pending: Option<String>,
}

impl History {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            entries: vec![start.into()],
            index: 0,
            pending: None,
        }
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    /// Push a URL, discarding any forward entries
    pub fn push(&mut self, url: String) {
        if self.current() == url {
            return;
        }
        self.entries.truncate(self.index + 1);
        self.entries.push(url);
        self.index += 1;
    }

    pub fn can_back(&self) -> bool {
        self.index > 0
    }

    pub fn can_forward(&self) -> bool {
        self.index + 1 < self.entries.len()
    }

    pub fn back(&mut self) -> Option<&str> {
        if !self.can_back() {
            return None;
        }
        self.index -= 1;
        Some(self.current())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if !self.can_forward() {
            return None;
        }
        self.index += 1;
        Some(self.current())
    }

    /// URL requested by `navigate()` that has not been activated yet
    pub fn take_pending(&mut self) -> Option<String> {
        self.pending.take()
    }
}

impl Navigator for History {
    fn push_history(&mut self, url: String) {
        self.push(url);
    }

    fn navigate(&mut self, url: String) {
        self.push(url.clone());
        self.pending = Some(url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ROUTES: &[Route] = &[
        Route {
            name: "me",
            path: "/users/me",
            backend: Some("/core/users/me"),
            title: "Me",
        },
        Route {
            name: "user",
            path: "/users/:cid",
            backend: Some("/core/users/cid/:cid"),
            title: "User",
        },
        Route {
            name: "users",
            path: "/users",
            backend: Some("/core/users"),
            title: "Users",
        },
        Route {
            name: "home",
            path: "/",
            backend: None,
            title: "Home",
        },
        Route {
            name: NOT_FOUND,
            path: ".*",
            backend: None,
            title: "Not Found",
        },
    ];

    fn router() -> Router {
        Router::new(ROUTES, "http://localhost:8000/api/v0/")
    }

    #[test]
    fn test_backend_url_fills_params() {
        let url = router()
            .backend_url("user", &params([("cid", "abc")]), &Params::new())
            .unwrap();
        assert_eq!(url, "http://localhost:8000/api/v0/core/users/cid/abc");
    }

    #[test]
    fn test_backend_url_with_query() {
        let url = router()
            .backend_url("users", &Params::new(), &params([("size", "5"), ("offset", "10")]))
            .unwrap();
        assert_eq!(url, "http://localhost:8000/api/v0/core/users?offset=10&size=5");
    }

    #[test]
    fn test_missing_param_is_an_error() {
        let err = router()
            .backend_url("user", &Params::new(), &Params::new())
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::MissingParam {
                route: "user".into(),
                param: "cid".into()
            }
        );
    }

    #[test]
    fn test_route_without_backend() {
        let err = router()
            .backend_url("home", &Params::new(), &Params::new())
            .unwrap_err();
        assert_eq!(err, RouteError::NoBackend("home".into()));
    }

    #[test]
    fn test_nav_url_is_relative() {
        let r = router();
        assert_eq!(
            r.nav_url("users", &Params::new(), &params([("size", "5"), ("offset", "0")]))
                .unwrap(),
            "/users?offset=0&size=5"
        );
        assert_eq!(r.nav_url("home", &Params::new(), &Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_param_values_are_encoded_and_decoded() {
        let r = router();
        let url = r
            .nav_url("user", &params([("cid", "a b/c")]), &Params::new())
            .unwrap();
        assert_eq!(url, "/users/a%20b%2Fc");

        let resolved = r.resolve(&url).unwrap();
        assert_eq!(resolved.route.name, "user");
        assert_eq!(resolved.params.get("cid").map(String::as_str), Some("a b/c"));
    }

    #[test]
    fn test_percent_and_non_ascii_params() {
        let r = router();
        let url = r
            .backend_url("user", &params([("cid", "50%é")]), &Params::new())
            .unwrap();
        assert_eq!(url, "http://localhost:8000/api/v0/core/users/cid/50%25%C3%A9");

        let nav = r
            .nav_url("user", &params([("cid", "50%é")]), &Params::new())
            .unwrap();
        let resolved = r.resolve(&nav).unwrap();
        assert_eq!(resolved.params.get("cid").map(String::as_str), Some("50%é"));
    }

    #[test]
    fn test_plus_in_path_is_literal() {
        let resolved = router().resolve("/users/a+b").unwrap();
        assert_eq!(resolved.params.get("cid").map(String::as_str), Some("a+b"));
    }

    #[test]
    fn test_resolve_prefers_table_order() {
        let r = router();
        assert_eq!(r.resolve("/users/me").unwrap().route.name, "me");
        assert_eq!(r.resolve("/users/x1").unwrap().route.name, "user");
        assert_eq!(r.resolve("/").unwrap().route.name, "home");
    }

    #[test]
    fn test_resolve_parses_query() {
        let resolved = router().resolve("/users?size=5&offset=10").unwrap();
        assert_eq!(resolved.route.name, "users");
        assert_eq!(resolved.query.get("size").map(String::as_str), Some("5"));
        assert_eq!(resolved.query.get("offset").map(String::as_str), Some("10"));
    }

    #[test]
    fn test_unknown_path_resolves_to_not_found() {
        assert_eq!(
            router().resolve("/nowhere/at/all").unwrap().route.name,
            NOT_FOUND
        );
    }

    #[test]
    fn test_history_back_forward() {
        let mut history = History::new("/");
        history.push("/users".into());
        history.push("/users/x1".into());

        assert_eq!(history.back(), Some("/users"));
        assert_eq!(history.back(), Some("/"));
        assert_eq!(history.back(), None);
        assert_eq!(history.forward(), Some("/users"));

        // Pushing drops the forward branch
        history.push("/artists".into());
        assert!(!history.can_forward());
        assert_eq!(history.current(), "/artists");
    }

    #[test]
    fn test_navigate_sets_pending() {
        let mut history = History::new("/");
        history.navigate("/login".into());
        assert_eq!(history.current(), "/login");
        assert_eq!(history.take_pending().as_deref(), Some("/login"));
        assert_eq!(history.take_pending(), None);
    }

    #[test]
    fn test_push_history_does_not_set_pending() {
        let mut history = History::new("/users");
        history.push_history("/users?offset=5&size=5".into());
        assert_eq!(history.current(), "/users?offset=5&size=5");
        assert_eq!(history.take_pending(), None);
    }
}
