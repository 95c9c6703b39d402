//! Request dispatcher - plain and bearer-authenticated backend requests
//!
//! All backend traffic goes through a `Transport` (reqwest in production,
//! a scripted fake in tests). `Dispatcher` adds the auth layer on top:
//! an authenticated request without a stored token fails with
//! `NotAuthenticated` before anything touches the network.
//!
//! No retries, no token refresh, no response inspection beyond status.

use crate::record::Record;
use crate::session::Session;
use anyhow::Context;
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// application/x-www-form-urlencoded
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

/// Caller-side request options (method, headers, body)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl RequestOptions {
    pub fn post(body: Body) -> Self {
        Self {
            method: Method::Post,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Body>,
}

impl HttpRequest {
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// Reason phrase; the only error detail surfaced to the user
    pub status_text: String,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors from dispatching a request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestError {
    /// No token stored; raised before any network call
    NotAuthenticated,
    /// Non-2xx response (status text only, body is not parsed)
    Http { status: u16, status_text: String },
    /// Network failure or unparseable body
    Transport(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "Not logged in"),
            Self::Http {
                status,
                status_text,
            } => {
                if status_text.is_empty() {
                    write!(f, "HTTP {}", status)
                } else {
                    f.write_str(status_text)
                }
            }
            Self::Transport(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for RequestError {}

/// The platform fetch primitive
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, RequestError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        builder = match request.body {
            Some(Body::Form(pairs)) => builder.form(&pairs),
            Some(Body::Json(json)) => builder.json(&json),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            body,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Signup payload, field names as the backend expects them
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub password1: String,
    pub password2: String,
}

impl NewUser {
    /// Local checks before anything is sent
    pub fn validate(&self) -> Result<(), String> {
        if self.email.trim().is_empty() {
            return Err("email is required".to_string());
        }
        if self.password1.is_empty() {
            return Err("password is required".to_string());
        }
        if self.password1 != self.password2 {
            return Err("passwords do not match".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
}

/// Backend request dispatcher, cheap to clone into spawned tasks
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Unauthenticated request, passed to the transport unchanged
    pub async fn fetch(&self, url: &str, options: RequestOptions) -> Result<HttpResponse, RequestError> {
        tracing::debug!("{} {}", options.method.as_str(), url);
        self.transport
            .send(HttpRequest {
                method: options.method,
                url: url.to_string(),
                headers: options.headers,
                body: options.body,
            })
            .await
    }

    /// Request with `Authorization: Bearer <token>`
    ///
    /// Caller headers are kept except any existing Authorization header.
    pub async fn authenticated_request(
        &self,
        url: &str,
        options: RequestOptions,
    ) -> Result<HttpResponse, RequestError> {
        let token = self.session.token().ok_or(RequestError::NotAuthenticated)?;

        let mut options = options;
        options
            .headers
            .retain(|(key, _)| !key.eq_ignore_ascii_case("authorization"));
        options
            .headers
            .push(("Authorization".to_string(), format!("Bearer {}", token)));

        self.fetch(url, options).await
    }

    /// GET a JSON document
    pub async fn get_json(&self, url: &str, authenticated: bool) -> Result<serde_json::Value, RequestError> {
        let response = if authenticated {
            self.authenticated_request(url, RequestOptions::default()).await?
        } else {
            self.fetch(url, RequestOptions::default()).await?
        };
        parse_json(response)
    }

    /// Exchange credentials for a token, store it and flip `logged_in`
    pub async fn login(&self, login_url: &str, credentials: &Credentials) -> Result<String, RequestError> {
        let form = vec![
            ("username".to_string(), credentials.username.clone()),
            ("password".to_string(), credentials.password.clone()),
        ];
        let response = self
            .fetch(login_url, RequestOptions::post(Body::Form(form)))
            .await?;
        let json = parse_json(response)?;

        let login: LoginResponse = serde_json::from_value(json)
            .map_err(|e| RequestError::Transport(format!("unexpected login response: {}", e)))?;

        self.session
            .store_token(&login.access_token)
            .map_err(|e| RequestError::Transport(format!("{:#}", e)))?;

        Ok(login.access_token)
    }

    /// Create a user account; returns the created user record
    pub async fn signup(&self, users_url: &str, new_user: &NewUser) -> Result<Record, RequestError> {
        let body = serde_json::to_value(new_user)
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        let response = self
            .fetch(users_url, RequestOptions::post(Body::Json(body)))
            .await?;
        let json = parse_json(response)?;

        Record::from_json(json)
            .ok_or_else(|| RequestError::Transport("expected a JSON object".to_string()))
    }
}

fn parse_json(response: HttpResponse) -> Result<serde_json::Value, RequestError> {
    if !response.ok() {
        tracing::warn!("Request failed: {} {}", response.status, response.status_text);
        return Err(RequestError::Http {
            status: response.status,
            status_text: response.status_text,
        });
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| RequestError::Transport(format!("invalid JSON response: {}", e)))
}


#[cfg(test)]
mod tests {
    use super::testing::MockTransport;
    use super::*;
    use crate::session::MemoryTokenStore;
    use serde_json::json;

    fn dispatcher(transport: Arc<MockTransport>, token: Option<&str>) -> Dispatcher {
        let store = match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::default(),
        };
        Dispatcher::new(transport, Arc::new(Session::new(Box::new(store))))
    }

    #[tokio::test]
    async fn test_no_token_means_no_network_call() {
        let transport = MockTransport::new();
        let dispatcher = dispatcher(transport.clone(), None);

        let result = dispatcher
            .authenticated_request("http://x/core/users/me", RequestOptions::default())
            .await;

        assert_eq!(result.unwrap_err(), RequestError::NotAuthenticated);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_bearer_header_merged_with_caller_headers() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({}));
        let dispatcher = dispatcher(transport.clone(), Some("tok"));

        let options = RequestOptions::default()
            .header("X-Trace", "1")
            .header("authorization", "Basic old");
        dispatcher
            .authenticated_request("http://x/me", options)
            .await
            .unwrap();

        let call = &transport.calls()[0];
        assert_eq!(call.header("X-Trace"), Some("1"));
        assert_eq!(call.header("Authorization"), Some("Bearer tok"));
        let auth_headers = call
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .count();
        assert_eq!(auth_headers, 1);
    }

    #[tokio::test]
    async fn test_fetch_sends_no_auth_header() {
        let transport = MockTransport::new();
        transport.push_json(200, json!([]));
        let dispatcher = dispatcher(transport.clone(), Some("tok"));

        dispatcher.get_json("http://x/users", false).await.unwrap();
        assert_eq!(transport.calls()[0].header("Authorization"), None);
    }

    #[tokio::test]
    async fn test_http_error_carries_status_text() {
        let transport = MockTransport::new();
        transport.push_json(404, json!({"detail": "ignored"}));
        let dispatcher = dispatcher(transport, None);

        let err = dispatcher.get_json("http://x/users/1", false).await.unwrap_err();
        assert_eq!(
            err,
            RequestError::Http {
                status: 404,
                status_text: "Not Found".into()
            }
        );
        assert_eq!(err.to_string(), "Not Found");
    }

    #[tokio::test]
    async fn test_invalid_json_is_transport_error() {
        let transport = MockTransport::new();
        transport.push_raw(b"<html>");
        let dispatcher = dispatcher(transport, None);

        let err = dispatcher.get_json("http://x/users", false).await.unwrap_err();
        assert!(matches!(err, RequestError::Transport(_)));
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({"access_token": "fresh", "token_type": "bearer"}));
        let dispatcher = dispatcher(transport.clone(), None);
        let mut logged_in = dispatcher.session().subscribe();

        let credentials = Credentials {
            username: "brad@email.com".into(),
            password: "password".into(),
        };
        let token = dispatcher
            .login("http://x/core/auth/login", &credentials)
            .await
            .unwrap();

        assert_eq!(token, "fresh");
        assert_eq!(dispatcher.session().token().as_deref(), Some("fresh"));
        assert!(logged_in.has_changed().unwrap());
        assert!(*logged_in.borrow_and_update());

        let call = &transport.calls()[0];
        assert_eq!(call.method, Method::Post);
        assert_eq!(
            call.body,
            Some(Body::Form(vec![
                ("username".into(), "brad@email.com".into()),
                ("password".into(), "password".into()),
            ]))
        );
    }

    #[tokio::test]
    async fn test_failed_login_keeps_session_anonymous() {
        let transport = MockTransport::new();
        transport.push_json(401, json!({}));
        let dispatcher = dispatcher(transport, None);

        let credentials = Credentials {
            username: "a".into(),
            password: "b".into(),
        };
        let err = dispatcher.login("http://x/login", &credentials).await.unwrap_err();

        assert_eq!(err.to_string(), "Unauthorized");
        assert!(!dispatcher.session().is_logged_in());
    }

    #[tokio::test]
    async fn test_signup_posts_json() {
        let transport = MockTransport::new();
        transport.push_json(200, json!({"cid": "u1", "email": "a@b.c"}));
        let dispatcher = dispatcher(transport.clone(), None);

        let new_user = NewUser {
            email: "a@b.c".into(),
            first_name: "A".into(),
            middle_name: String::new(),
            last_name: "B".into(),
            phone_number: "tel:+1-513-555-0123".into(),
            password1: "pw".into(),
            password2: "pw".into(),
        };
        let user = dispatcher.signup("http://x/core/users", &new_user).await.unwrap();

        assert_eq!(user.text("cid"), "u1");
        match &transport.calls()[0].body {
            Some(Body::Json(json)) => assert_eq!(json["first_name"], "A"),
            other => panic!("expected JSON body, got {:?}", other),
        }
    }

    #[test]
    fn test_new_user_validation() {
        let mut new_user = NewUser {
            email: "a@b.c".into(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            phone_number: String::new(),
            password1: "one".into(),
            password2: "two".into(),
        };
        assert_eq!(new_user.validate().unwrap_err(), "passwords do not match");

        new_user.password2 = "one".into();
        assert!(new_user.validate().is_ok());
    }
}
