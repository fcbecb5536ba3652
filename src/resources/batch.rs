#![allow(clippy::result_large_err)]

use crate::core::capability::{
    ArchiveRecord, Archivable, Creatable, Entity, Listable, Readable, Updatable,
};
use crate::core::error::ApiResult;
use crate::core::http::Query;
use crate::core::model::{Model, Resource};
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::EntityMeta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A physical batch of an entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    #[serde(flatten)]
    meta: EntityMeta,
    pub entity_id: Option<String>,
    pub fields: Map<String, Value>,
}

impl Batch {
    pub fn new(entity_id: impl Into<String>) -> Self {
        Self {
            entity_id: Some(entity_id.into()),
            ..Self::default()
        }
    }

    pub fn meta(&self) -> &EntityMeta {
        &self.meta
    }
}

impl Resource for Batch {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Batch",
        alias: None,
        capabilities: CapabilitySet::ENTITY,
        create_fields: &["entity_id", "fields"],
        update_fields: &["fields"],
        entity_type: None,
    };

    fn id(&self) -> Option<&str> {
        self.meta.id()
    }

    fn clear_server_fields(&mut self) {
        self.meta = EntityMeta::default();
    }
}

impl Readable for Batch {}
impl Listable for Batch {}
impl Creatable for Batch {}
impl Updatable for Batch {}
impl Entity for Batch {}

impl Archivable for Batch {
    fn archive_record(&self) -> Option<&ArchiveRecord> {
        self.meta.archive_record()
    }
}

impl<T: Entity> Model<T> {
    /// Batches made from this entity.
    pub fn batches(&self) -> ApiResult<Vec<Model<Batch>>> {
        let id = self.require_id("list batches of")?;
        let page = self
            .session()
            .http()
            .get(&format!("entities/{id}/batches"), &Query::new(), None)?;
        self.session().batch().load_page(page)
    }
}
