use crate::core::model::Resource;
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::EntityMeta;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema-defined entity without sequence content.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomEntity {
    #[serde(flatten)]
    meta: EntityMeta,
    pub name: Option<String>,
    pub folder_id: Option<String>,
    pub schema_id: Option<String>,
    pub aliases: Vec<String>,
    pub custom_fields: Map<String, Value>,
    pub fields: Map<String, Value>,
}

impl CustomEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

const CUSTOM_ENTITY_FIELDS: &[&str] = &[
    "aliases",
    "custom_fields",
    "fields",
    "folder_id",
    "name",
    "schema_id",
];

impl Resource for CustomEntity {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "CustomEntity",
        alias: None,
        capabilities: CapabilitySet::ENTITY
            .union(CapabilitySet::REGISTRY)
            .union(CapabilitySet::INVENTORY),
        create_fields: CUSTOM_ENTITY_FIELDS,
        update_fields: CUSTOM_ENTITY_FIELDS,
        entity_type: Some("custom_entity"),
    };

    fn id(&self) -> Option<&str> {
        self.meta.id()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clear_server_fields(&mut self) {
        self.meta = EntityMeta::default();
    }
}

registry_entity!(CustomEntity);
