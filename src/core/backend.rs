//! Purpose: Define the wire seam between the transport and an HTTP implementation.
//! Exports: `Backend`, `UreqBackend`, `HttpRequest`, `HttpResponse`, `Method`.
//! Role: `Http` builds fully-formed requests; a `Backend` only moves bytes.
//! Invariants: A backend returns every HTTP status as a response; only I/O failures are errors.
//! Invariants: One `execute` call performs exactly one network exchange (no retries).
#![allow(clippy::result_large_err)]

use crate::core::error::{ApiResult, Error, ErrorKind};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;
use std::fmt;
use std::io::Read;
use std::time::Duration;
use url::Url;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Status codes that count as success for this verb.
    pub fn accepted_statuses(self) -> &'static [u16] {
        match self {
            Method::Get | Method::Delete => &[200],
            Method::Post => &[200, 201, 202],
            Method::Patch => &[200, 201],
        }
    }

    pub fn accepts(self, status: u16) -> bool {
        self.accepted_statuses().contains(&status)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    /// Wire-convention JSON body, already codec-transformed.
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Query pair value by wire key.
    pub fn query_param(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.into_owned())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn json(status: u16, body: &Value) -> Self {
        Self::new(status, body.to_string())
    }
}

pub trait Backend: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse>;
}

/// `ureq`-backed transport authenticating with a static API key.
pub struct UreqBackend {
    agent: ureq::Agent,
    authorization: String,
}

impl UreqBackend {
    pub fn new(api_key: &str) -> Self {
        let agent = ureq::AgentBuilder::new().build();
        Self::with_agent(agent, api_key)
    }

    pub fn with_agent(agent: ureq::Agent, api_key: &str) -> Self {
        // The key travels as the basic-auth user name with an empty password.
        let credentials = STANDARD.encode(format!("{api_key}:"));
        Self {
            agent,
            authorization: format!("Basic {credentials}"),
        }
    }
}

impl fmt::Debug for UreqBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqBackend").finish_non_exhaustive()
    }
}

impl Backend for UreqBackend {
    fn execute(&self, request: &HttpRequest) -> ApiResult<HttpResponse> {
        let call = self
            .agent
            .request(request.method.as_str(), request.url.as_str())
            .timeout(request.timeout)
            .set("Authorization", &self.authorization)
            .set("Accept", "application/json");

        let response = match &request.body {
            Some(body) => {
                let payload = serde_json::to_string(body).map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to encode request json")
                        .with_source(err)
                })?;
                call.set("Content-Type", "application/json")
                    .send_string(&payload)
            }
            None => call.call(),
        };

        match response {
            Ok(resp) => read_response(resp),
            Err(ureq::Error::Status(_, resp)) => read_response(resp),
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Transport)
                .with_message("request failed")
                .with_url(request.url.as_str())
                .with_source(err)),
        }
    }
}

fn read_response(response: ureq::Response) -> ApiResult<HttpResponse> {
    let status = response.status();
    // `into_string` caps bodies at 10 MB; a full page of long sequences exceeds that.
    let mut bytes = Vec::new();
    response.into_reader().read_to_end(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Transport)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    let body = String::from_utf8(bytes).map_err(|err| {
        Error::new(ErrorKind::Deserialize)
            .with_message("response body is not valid utf-8")
            .with_source(err)
    })?;
    Ok(HttpResponse { status, body })
}
