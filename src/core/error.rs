use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Internal,
    Usage,
    ModelNotFound,
    Api,
    InvalidRegistryId,
    DuplicateRegistryName,
    SchemaValidation,
    Deserialize,
    Transport,
}

impl ErrorKind {
    /// True for kinds that originate from an HTTP response the server sent back.
    pub fn is_remote(self) -> bool {
        matches!(
            self,
            ErrorKind::Api
                | ErrorKind::InvalidRegistryId
                | ErrorKind::DuplicateRegistryName
                | ErrorKind::SchemaValidation
        )
    }
}

pub type ApiResult<T> = Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    hint: Option<String>,
    url: Option<String>,
    status: Option<u16>,
    body: Option<Value>,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            hint: None,
            url: None,
            status: None,
            body: None,
            source: None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// HTTP status of the offending response, when the error came from one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Decoded body of the offending response, when it was valid JSON.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_not_found(&self) -> bool {
        self.kind.is_remote() && self.status == Some(404)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.kind)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        if let Some(status) = self.status {
            write!(f, " (status: {status})")?;
        }
        if let Some(url) = &self.url {
            write!(f, " (url: {url})")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " hint: {hint}")?;
        }
        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn StdError + 'static))
    }
}

/// Human-readable label for the status codes the service documents.
pub fn status_label(status: u16) -> Option<&'static str> {
    match status {
        400 => Some("BAD REQUEST"),
        403 => Some("FORBIDDEN"),
        404 => Some("NOT FOUND"),
        500 => Some("INTERNAL SERVER ERROR"),
        503 => Some("SERVICE UNAVAILABLE"),
        504 => Some("SERVER TIMEOUT"),
        _ => None,
    }
}
