//! Purpose: Issue HTTP verbs against the service home URL and enforce the status contract.
//! Exports: `Http`, `Query`, `Pages`, `dispatch_server_error`.
//! Role: Only place that touches a `Backend`; every resource operation funnels through here.
//! Invariants: Exactly one backend call per verb invocation and per page.
//! Invariants: Outgoing bodies and query keys are codec-transformed to wire form; responses are not.
//! Invariants: An optional action is addressed as `<path>:<action>`.
//! Invariants: Pagination stops when a page carries no (or an empty) `nextToken`.
#![allow(clippy::result_large_err)]

use crate::core::backend::{Backend, HttpRequest, HttpResponse, Method};
use crate::core::codec;
use crate::core::error::{ApiResult, Error, ErrorKind, status_label};
use regex::Regex;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Wire key of the continuation token in list responses.
pub const NEXT_TOKEN: &str = "nextToken";

static INVALID_REGISTRY_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(invalid|unknown)\b.*\bregistry ?ids?\b|\bregistry ?ids?\b.*\b(invalid|not found|does not exist)\b",
    )
    .expect("invalid registry id regex")
});

static DUPLICATE_REGISTRY_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bduplicate\b.*\b(name|alias|registry)|\b(name|alias|registry id)\b.*\balready (exists|registered|in use|taken)\b",
    )
    .expect("duplicate registry name regex")
});

static SCHEMA_VALIDATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\bschema\b.*\b(validation|invalid|required|mismatch)\b|\b(required|invalid)\b.*\bschema\b|\bvalidation (error|failed)\b",
    )
    .expect("schema validation regex")
});

/// Query parameters keyed in the local convention.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    params: Map<String, Value>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.params.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.params.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.params.iter()
    }

    /// Wire-keyed pairs ready for the URL; nulls are dropped, arrays comma-joined.
    pub fn wire_pairs(&self) -> Vec<(String, String)> {
        codec::map_to_wire(&self.params)
            .into_iter()
            .filter_map(|(key, value)| render_query_value(&value).map(|value| (key, value)))
            .collect()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Query {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = Query::new();
        for (key, value) in iter {
            query.set(key, value);
        }
        query
    }
}

#[derive(Clone)]
pub struct Http {
    inner: Arc<HttpInner>,
}

struct HttpInner {
    home: Url,
    timeout: Duration,
    backend: Arc<dyn Backend>,
}

impl fmt::Debug for Http {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Http")
            .field("home", &self.inner.home.as_str())
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

impl Http {
    pub fn new(home: Url, timeout: Duration, backend: Arc<dyn Backend>) -> Self {
        Self {
            inner: Arc::new(HttpInner {
                home,
                timeout,
                backend,
            }),
        }
    }

    pub fn home(&self) -> &Url {
        &self.inner.home
    }

    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    pub fn get(&self, path: &str, query: &Query, action: Option<&str>) -> ApiResult<Value> {
        self.request(Method::Get, path, query, None, action)
    }

    pub fn post(
        &self,
        path: &str,
        query: &Query,
        body: &Value,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        self.request(Method::Post, path, query, Some(body), action)
    }

    pub fn patch(
        &self,
        path: &str,
        query: &Query,
        body: &Value,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        self.request(Method::Patch, path, query, Some(body), action)
    }

    pub fn delete(&self, path: &str, query: &Query, action: Option<&str>) -> ApiResult<Value> {
        self.request(Method::Delete, path, query, None, action)
    }

    /// Lazily walk a paginated listing; nothing is sent until the first `next()`.
    pub fn pages(&self, path: &str, query: Query, action: Option<&str>) -> Pages {
        Pages {
            http: self.clone(),
            path: path.to_string(),
            action: action.map(str::to_string),
            query,
            state: PageState::Start,
        }
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        query: &Query,
        body: Option<&Value>,
        action: Option<&str>,
    ) -> ApiResult<Value> {
        let url = build_url(&self.inner.home, path, action, query)?;
        let request = HttpRequest {
            method,
            url,
            body: body.map(codec::to_wire),
            timeout: self.inner.timeout,
        };
        debug!(method = %method, url = %request.url, "sending request");
        let response = self.inner.backend.execute(&request)?;
        debug!(method = %method, status = response.status, "received response");

        if !method.accepts(response.status) {
            return Err(status_error(&request, response));
        }
        parse_body(&request, &response.body)
    }
}

pub struct Pages {
    http: Http,
    path: String,
    action: Option<String>,
    query: Query,
    state: PageState,
}

enum PageState {
    Start,
    Next(String),
    Done,
}

impl Iterator for Pages {
    type Item = ApiResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match std::mem::replace(&mut self.state, PageState::Done) {
            PageState::Done => return None,
            PageState::Start => {}
            PageState::Next(token) => self.query.set(codec::local_key(NEXT_TOKEN), token),
        }

        match self
            .http
            .get(&self.path, &self.query, self.action.as_deref())
        {
            Ok(page) => {
                if let Some(token) = next_token(&page) {
                    trace!(path = %self.path, "page has continuation token");
                    self.state = PageState::Next(token);
                }
                Some(Ok(page))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

fn next_token(page: &Value) -> Option<String> {
    page.get(NEXT_TOKEN)
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

pub fn build_url(home: &Url, path: &str, action: Option<&str>, query: &Query) -> ApiResult<Url> {
    let mut url = home.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("home url cannot be a base")
        })?;
        segments.pop_if_empty();
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        if let Some((last, head)) = parts.split_last() {
            segments.extend(head);
            match action {
                Some(action) => segments.push(&format!("{last}:{action}")),
                None => segments.push(last),
            };
        }
    }
    let pairs = query.wire_pairs();
    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
    Ok(url)
}

fn render_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(render_query_value)
                .collect::<Vec<_>>()
                .join(","),
        ),
        other => Some(other.to_string()),
    }
}

fn parse_body(request: &HttpRequest, body: &str) -> ApiResult<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|err| {
        Error::new(ErrorKind::Deserialize)
            .with_message("invalid response json")
            .with_url(request.url.as_str())
            .with_source(err)
    })
}

fn status_error(request: &HttpRequest, response: HttpResponse) -> Error {
    let status = response.status;
    let message = match status_label(status) {
        Some(label) => format!("HTTP Response Failed {status} {label}"),
        None => format!("HTTP Response Failed {status}"),
    };
    let body = serde_json::from_str::<Value>(&response.body)
        .unwrap_or_else(|_| Value::String(response.body.clone()));
    let err = Error::new(ErrorKind::Api)
        .with_message(message)
        .with_status(status)
        .with_url(request.url.as_str())
        .with_body(body);
    dispatch_server_error(err)
}

/// Re-kind a generic API error when the server's message names a known failure.
pub fn dispatch_server_error(err: Error) -> Error {
    let Some(server_message) = err.body().and_then(extract_server_message) else {
        return err;
    };
    let kind = if INVALID_REGISTRY_ID_RE.is_match(&server_message) {
        ErrorKind::InvalidRegistryId
    } else if DUPLICATE_REGISTRY_NAME_RE.is_match(&server_message) {
        ErrorKind::DuplicateRegistryName
    } else if SCHEMA_VALIDATION_RE.is_match(&server_message) {
        ErrorKind::SchemaValidation
    } else {
        ErrorKind::Api
    };
    if kind != ErrorKind::Api {
        warn!(?kind, status = ?err.status(), "server rejected request");
    }
    let message = match err.message() {
        Some(base) => format!("{base}: {server_message}"),
        None => server_message,
    };
    err.with_kind(kind).with_message(message)
}

fn extract_server_message(body: &Value) -> Option<String> {
    let error = body.get("error").unwrap_or(body);
    ["message", "userMessage"]
        .iter()
        .find_map(|key| error.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}
