//! Purpose: Authenticated connection to one service home plus its bound resource interfaces.
//! Exports: `Session`.
//! Role: Entry point of the crate; owns the transport every interface of the session uses.
//! Invariants: Each session builds its own transport and interface table; sessions share nothing.
//! Invariants: The interface table mirrors `ResourceRegistry::global()` at construction.
#![allow(clippy::result_large_err)]

use crate::core::config::SessionConfig;
use crate::core::dynamic::DynInterface;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Http;
use crate::core::model::{Interface, Resource};
use crate::core::registry::ResourceRegistry;
use crate::resources::{
    AaSequence, Annotation, Batch, CustomEntity, DnaAlignment, DnaSequence, EntitySchema, Folder,
    Oligo, Project, Registry, Task, Translation,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    http: Http,
    interfaces: BTreeMap<&'static str, DynInterface>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("url", &self.url())
            .field("timeout", &self.timeout())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Session against the default home with a static API key.
    pub fn new(api_key: impl Into<String>) -> ApiResult<Self> {
        Self::from_config(SessionConfig::new(api_key))
    }

    /// Session configured from `BENCHLING_*` environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_config(SessionConfig::from_env()?)
    }

    pub fn from_config(config: SessionConfig) -> ApiResult<Self> {
        let home = config.home_url()?;
        let http = Http::new(home, config.timeout(), config.backend());
        let registry = ResourceRegistry::global();
        let interfaces = registry
            .descriptors()
            .map(|descriptor| (descriptor.name, DynInterface::new(http.clone(), descriptor)))
            .collect::<BTreeMap<_, _>>();
        debug!(url = %http.home(), models = interfaces.len(), "session ready");
        Ok(Self {
            inner: Arc::new(SessionInner { http, interfaces }),
        })
    }

    pub fn http(&self) -> &Http {
        &self.inner.http
    }

    /// Home URL every request is resolved against.
    pub fn url(&self) -> &str {
        self.inner.http.home().as_str()
    }

    pub fn timeout(&self) -> Duration {
        self.inner.http.timeout()
    }

    pub fn models(&self) -> Vec<&'static str> {
        self.inner.interfaces.keys().copied().collect()
    }

    /// Interface for a type name or alias.
    pub fn interface(&self, name: &str) -> ApiResult<&DynInterface> {
        let descriptor = ResourceRegistry::global().get(name).map_err(|err| {
            err.with_hint(format!("available models: {}", self.models().join(", ")))
        })?;
        self.inner.interfaces.get(descriptor.name).ok_or_else(|| {
            Error::new(ErrorKind::ModelNotFound)
                .with_message(format!("Model \"{name}\" has no interface on this session."))
        })
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &DynInterface> {
        self.inner.interfaces.values()
    }

    pub fn resource<T: Resource>(&self) -> Interface<T> {
        Interface::new(self.clone())
    }

    /// True when both handles refer to the same session.
    pub fn same_session(&self, other: &Session) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn dna_sequence(&self) -> Interface<DnaSequence> {
        self.resource()
    }

    pub fn aa_sequence(&self) -> Interface<AaSequence> {
        self.resource()
    }

    /// Alias of `aa_sequence`.
    pub fn protein(&self) -> Interface<AaSequence> {
        self.resource()
    }

    pub fn oligo(&self) -> Interface<Oligo> {
        self.resource()
    }

    pub fn custom_entity(&self) -> Interface<CustomEntity> {
        self.resource()
    }

    pub fn batch(&self) -> Interface<Batch> {
        self.resource()
    }

    pub fn folder(&self) -> Interface<Folder> {
        self.resource()
    }

    pub fn project(&self) -> Interface<Project> {
        self.resource()
    }

    pub fn registry(&self) -> Interface<Registry> {
        self.resource()
    }

    pub fn entity_schema(&self) -> Interface<EntitySchema> {
        self.resource()
    }

    pub fn annotation(&self) -> Interface<Annotation> {
        self.resource()
    }

    pub fn translation(&self) -> Interface<Translation> {
        self.resource()
    }

    pub fn dna_alignment(&self) -> Interface<DnaAlignment> {
        self.resource()
    }

    pub fn task(&self) -> Interface<Task> {
        self.resource()
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::core::config::SessionConfig;
    use crate::core::error::ErrorKind;
    use std::time::Duration;

    #[test]
    fn session_builds_interface_per_registered_model() {
        let session = Session::new("sk_test").expect("session");
        assert_eq!(session.url(), "https://benchling.com/api/v2");
        assert!(session.models().contains(&"DNASequence"));
        assert_eq!(
            session.interface("Protein").expect("alias").model_name(),
            "AASequence"
        );
    }

    #[test]
    fn unknown_interface_is_model_not_found() {
        let session = Session::new("sk_test").expect("session");
        let err = session.interface("Plasmid").expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::ModelNotFound);
        assert!(err.message().expect("message").contains("Plasmid"));
    }

    #[test]
    fn sessions_are_independent() {
        let first = Session::from_config(SessionConfig::new("a").with_org("alpha")).expect("first");
        let second = Session::from_config(
            SessionConfig::new("b")
                .with_org("beta")
                .with_timeout(Duration::from_secs(3)),
        )
        .expect("second");
        assert!(!first.same_session(&second));
        assert!(first.same_session(&first.clone()));
        assert_eq!(first.dna_sequence().session().url(), "https://alpha.benchling.com/api/v2");
        assert_eq!(second.folder().session().timeout(), Duration::from_secs(3));
    }
}
