//! Purpose: Server-side registries and the entity schemas they define.
//! Exports: `Registry`, `EntitySchema`.
//! Role: Registration endpoints used by `RegistryAware` models, plus registry-level lookups.
//! Invariants: Registries are list-only on the server; single lookups scan the listing.
#![allow(clippy::result_large_err)]

use crate::core::capability::{ArchiveRecord, Listable, Lookup, NamingStrategy};
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model, Resource};
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::UserSummary;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Registry {
    id: Option<String>,
    pub name: Option<String>,
    owner: Option<UserSummary>,
}

impl Registry {
    pub fn owner(&self) -> Option<&UserSummary> {
        self.owner.as_ref()
    }
}

impl Resource for Registry {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Registry",
        alias: None,
        capabilities: CapabilitySet::LIST,
        create_fields: &[],
        update_fields: &[],
        entity_type: None,
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clear_server_fields(&mut self) {
        self.id = None;
        self.owner = None;
    }
}

impl Listable for Registry {}

/// Field layout an entity must satisfy to join a registry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitySchema {
    id: Option<String>,
    pub name: Option<String>,
    /// Entity type the schema applies to (`dna_sequence`, `custom_entity`, ...).
    #[serde(rename = "type")]
    pub schema_type: Option<String>,
    pub prefix: Option<String>,
    registry_id: Option<String>,
    pub field_definitions: Vec<Value>,
    archive_record: Option<ArchiveRecord>,
}

impl EntitySchema {
    pub fn registry_id(&self) -> Option<&str> {
        self.registry_id.as_deref()
    }

    pub fn archive_record(&self) -> Option<&ArchiveRecord> {
        self.archive_record.as_ref()
    }
}

impl Resource for EntitySchema {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor::new("EntitySchema");

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clear_server_fields(&mut self) {
        self.id = None;
        self.registry_id = None;
        self.archive_record = None;
    }
}

impl Interface<Registry> {
    /// Scan the listing for `id`.
    pub fn get(&self, id: &str) -> ApiResult<Option<Model<Registry>>> {
        let found = self.search(|registry| registry.id() == Some(id), 1, None, Query::new())?;
        Ok(found.into_iter().next())
    }

    pub fn find(&self, id: &str) -> ApiResult<Option<Model<Registry>>> {
        self.get(id)
    }

    /// By id or name; with no selector, the only registry if exactly one exists.
    pub fn find_registry(&self, lookup: Option<Lookup<'_>>) -> ApiResult<Option<Model<Registry>>> {
        match lookup {
            Some(Lookup::Id(id)) => self.get(id),
            Some(Lookup::Name(name)) => self.find_by_name(name),
            None => {
                let mut registries = self.list(&Query::new())?;
                if registries.len() == 1 {
                    Ok(registries.pop())
                } else {
                    debug!(count = registries.len(), "no unique registry to default to");
                    Ok(None)
                }
            }
        }
    }

    pub(crate) fn require_registry(&self, lookup: Option<Lookup<'_>>) -> ApiResult<Model<Registry>> {
        self.find_registry(lookup)?.ok_or_else(|| {
            let message = match lookup {
                Some(Lookup::Id(id)) => format!("no registry with id \"{id}\""),
                Some(Lookup::Name(name)) => format!("no registry named \"{name}\""),
                None => "no registry selected and more than one (or none) exists".to_string(),
            };
            Error::new(ErrorKind::Usage).with_message(message)
        })
    }

    /// Registry owning the schema `schema_id`.
    pub fn find_from_schema_id(&self, schema_id: &str) -> ApiResult<Option<Model<Registry>>> {
        for registry in self.list(&Query::new())? {
            let owns = registry
                .entity_schemas()?
                .iter()
                .any(|schema| schema.id() == Some(schema_id));
            if owns {
                return Ok(Some(registry));
            }
        }
        Ok(None)
    }

    pub fn register_entities(
        &self,
        registry_id: &str,
        entity_ids: &[&str],
        strategy: NamingStrategy,
    ) -> ApiResult<Value> {
        debug!(registry_id, count = entity_ids.len(), %strategy, "registering entities");
        let body = json!({
            "entity_ids": entity_ids,
            "naming_strategy": strategy.as_str(),
        });
        self.raw_post(&[registry_id], &Query::new(), &body, Some("register-entities"))
    }

    pub fn unregister_entities(
        &self,
        registry_id: &str,
        entity_ids: &[&str],
        folder_id: &str,
    ) -> ApiResult<Value> {
        debug!(registry_id, count = entity_ids.len(), folder_id, "unregistering entities");
        let body = json!({
            "entity_ids": entity_ids,
            "folder_id": folder_id,
        });
        self.raw_post(&[registry_id], &Query::new(), &body, Some("unregister-entities"))
    }
}

impl Model<Registry> {
    pub fn entity_schemas(&self) -> ApiResult<Vec<Model<EntitySchema>>> {
        let id = self.require_id("list schemas of")?;
        let page = self
            .interface()
            .raw_get(&[&id, "entity-schemas"], &Query::new(), None)?;
        self.session().entity_schema().load_page(page)
    }

    pub fn get_schema(&self, lookup: Lookup<'_>) -> ApiResult<Option<Model<EntitySchema>>> {
        Ok(self.entity_schemas()?.into_iter().find(|schema| match lookup {
            Lookup::Id(id) => schema.id() == Some(id),
            Lookup::Name(name) => schema.name.as_deref() == Some(name),
        }))
    }

    pub fn register_entities(&self, entity_ids: &[&str], strategy: NamingStrategy) -> ApiResult<Value> {
        let id = self.require_id("register into")?;
        self.interface().register_entities(&id, entity_ids, strategy)
    }

    pub fn unregister_entities(&self, entity_ids: &[&str], folder_id: &str) -> ApiResult<Value> {
        let id = self.require_id("unregister from")?;
        self.interface().unregister_entities(&id, entity_ids, folder_id)
    }

    /// Raw wire records for the given entity registry ids.
    pub fn get_entities(&self, entity_registry_ids: &[&str]) -> ApiResult<Vec<Value>> {
        let id = self.require_id("look up entities in")?;
        let query = Query::new().with("entity_registry_ids", entity_registry_ids.to_vec());
        let response = self.interface().raw_get(
            &[&id, "registered-entities"],
            &query,
            Some("bulk-get"),
        )?;
        match response {
            Value::Object(mut map) => match map.remove("entities") {
                Some(Value::Array(entities)) => Ok(entities),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(_) => Err(Error::new(ErrorKind::Deserialize)
                    .with_message("registered entities response is not an array")),
            },
            _ => Err(Error::new(ErrorKind::Deserialize)
                .with_message("registered entities response is not an object")),
        }
    }

    pub fn find_in_registry(&self, entity_registry_id: &str) -> ApiResult<Option<Value>> {
        Ok(self.get_entities(&[entity_registry_id])?.into_iter().next())
    }
}
