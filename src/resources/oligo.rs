use crate::core::model::Resource;
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::EntityMeta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Short single-stranded DNA.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Oligo {
    #[serde(flatten)]
    meta: EntityMeta,
    pub name: Option<String>,
    pub bases: Option<String>,
    pub folder_id: Option<String>,
    pub schema_id: Option<String>,
    pub aliases: Vec<String>,
    pub custom_fields: Map<String, Value>,
    pub fields: Map<String, Value>,
    length: Option<u64>,
}

impl Oligo {
    pub fn new(name: impl Into<String>, bases: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            bases: Some(bases.into()),
            ..Self::default()
        }
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

const OLIGO_FIELDS: &[&str] = &[
    "aliases",
    "bases",
    "custom_fields",
    "fields",
    "folder_id",
    "name",
    "schema_id",
];

impl Resource for Oligo {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Oligo",
        alias: None,
        capabilities: CapabilitySet::ENTITY
            .union(CapabilitySet::REGISTRY)
            .union(CapabilitySet::INVENTORY),
        create_fields: OLIGO_FIELDS,
        update_fields: OLIGO_FIELDS,
        entity_type: Some("oligo"),
    };

    fn id(&self) -> Option<&str> {
        self.meta.id()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clear_server_fields(&mut self) {
        self.meta = EntityMeta::default();
        self.length = None;
    }
}

registry_entity!(Oligo);
