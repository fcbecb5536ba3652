//! Purpose: Session configuration (credentials, home URL, timeout, wire backend).
//! Exports: `SessionConfig`, `DEFAULT_HOME`.
//! Role: Resolves the effective home URL and builds the default `ureq` backend.
//! Invariants: An explicit home wins over an organization shorthand, which wins over the default.
//! Invariants: The API key never appears in `Debug` output.
#![allow(clippy::result_large_err)]

use crate::core::backend::{Backend, UreqBackend};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::DEFAULT_TIMEOUT;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_HOME: &str = "https://benchling.com/api/v2";

pub const ENV_API_KEY: &str = "BENCHLING_API_KEY";
pub const ENV_ORG: &str = "BENCHLING_ORG";
pub const ENV_HOME: &str = "BENCHLING_HOME";
pub const ENV_TIMEOUT_SECS: &str = "BENCHLING_TIMEOUT_SECS";

#[derive(Clone)]
pub struct SessionConfig {
    api_key: String,
    org: Option<String>,
    home: Option<String>,
    timeout: Duration,
    backend: Option<Arc<dyn Backend>>,
}

impl SessionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            org: None,
            home: None,
            timeout: DEFAULT_TIMEOUT,
            backend: None,
        }
    }

    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source using the `BENCHLING_*` names.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ApiResult<Self> {
        let api_key = lookup(ENV_API_KEY)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("{ENV_API_KEY} is not set"))
            })?;
        let mut config = Self::new(api_key);
        if let Some(org) = lookup(ENV_ORG).filter(|org| !org.is_empty()) {
            config = config.with_org(org);
        }
        if let Some(home) = lookup(ENV_HOME).filter(|home| !home.is_empty()) {
            config = config.with_home(home);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))
                    .with_source(err)
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the default `ureq` backend.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn home_url(&self) -> ApiResult<Url> {
        let raw = match (&self.home, &self.org) {
            (Some(home), _) => home.clone(),
            (None, Some(org)) => format!("https://{org}.benchling.com/api/v2"),
            (None, None) => DEFAULT_HOME.to_string(),
        };
        normalize_home(&raw)
    }

    pub(crate) fn backend(&self) -> Arc<dyn Backend> {
        match &self.backend {
            Some(backend) => backend.clone(),
            None => Arc::new(UreqBackend::new(&self.api_key)),
        }
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &"<redacted>")
            .field("org", &self.org)
            .field("home", &self.home)
            .field("timeout", &self.timeout)
            .field("custom_backend", &self.backend.is_some())
            .finish()
    }
}

fn normalize_home(raw: &str) -> ApiResult<Url> {
    let mut url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid home url")
            .with_source(err)
    })?;
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(
            Error::new(ErrorKind::Usage).with_message("home url must use http or https scheme")
        );
    }
    let path = url.path().trim_end_matches('/').to_string();
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
