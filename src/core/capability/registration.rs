//! Purpose: Registry membership for entities (schema staging, register, unregister).
//! Exports: `NamingStrategy`, `Lookup`.
//! Role: Drives the `unregistered -> pending -> registered` lifecycle of a `Model<T>`.
//! Invariants: `register` requires a schema staged by `set_schema`; nothing is sent otherwise.
//! Invariants: The registry id is only ever taken from server responses.
//! Invariants: `is_registered` is false while a different registry is staged.
#![allow(clippy::result_large_err)]

use crate::core::capability::RegistryAware;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model, StagedSchema};
use crate::resources::{EntitySchema, Registry};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// How a registered entity's name relates to its registry identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum NamingStrategy {
    #[default]
    NewIds,
    IdsFromNames,
    DeleteNames,
    SetFromNameParts,
}

impl NamingStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            NamingStrategy::NewIds => "NEW_IDS",
            NamingStrategy::IdsFromNames => "IDS_FROM_NAMES",
            NamingStrategy::DeleteNames => "DELETE_NAMES",
            NamingStrategy::SetFromNameParts => "SET_FROM_NAME_PARTS",
        }
    }
}

impl fmt::Display for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Select a record by id or by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup<'a> {
    Id(&'a str),
    Name(&'a str),
}

impl<T: RegistryAware> Interface<T> {
    /// Every (registry, schema) pair whose schema type matches this resource.
    pub fn valid_schemas(&self) -> ApiResult<Vec<(Model<Registry>, Model<EntitySchema>)>> {
        let Some(entity_type) = T::DESCRIPTOR.entity_type else {
            return Ok(Vec::new());
        };
        let mut valid = Vec::new();
        for registry in self.session().registry().list(&Query::new())? {
            for schema in registry.entity_schemas()? {
                if schema.schema_type.as_deref() == Some(entity_type) {
                    valid.push((registry.clone(), schema));
                }
            }
        }
        Ok(valid)
    }

    /// First page of records in the selected registry (the only one when `registry` is `None`).
    pub fn list_in_registry(&self, registry: Option<Lookup<'_>>, query: &Query) -> ApiResult<Vec<Model<T>>> {
        let registry = self.session().registry().require_registry(registry)?;
        let registry_id = registry.require_id("list")?;
        self.list(&query.clone().with("registry_id", registry_id))
    }

    /// Registered records keyed by their entity registry id.
    pub fn registry_dict(
        &self,
        registry: Option<Lookup<'_>>,
        query: &Query,
    ) -> ApiResult<BTreeMap<String, Model<T>>> {
        let mut by_registry_id = BTreeMap::new();
        for model in self.list_in_registry(registry, query)? {
            if let Some(key) = model.entity_registry_id().map(str::to_string) {
                by_registry_id.insert(key, model);
            }
        }
        Ok(by_registry_id)
    }

    pub fn find_by_name_in_registry(
        &self,
        name: &str,
        registry: Option<Lookup<'_>>,
    ) -> ApiResult<Option<Model<T>>> {
        let query = Query::new().with("name", name);
        Ok(self.list_in_registry(registry, &query)?.into_iter().next())
    }

    pub fn get_in_registry(
        &self,
        entity_registry_ids: &[&str],
        registry: Option<Lookup<'_>>,
    ) -> ApiResult<Vec<Model<T>>> {
        let registry = self.session().registry().require_registry(registry)?;
        let records = registry.get_entities(entity_registry_ids)?;
        self.load_many(records)
    }

    pub fn find_in_registry(
        &self,
        entity_registry_id: &str,
        registry: Option<Lookup<'_>>,
    ) -> ApiResult<Option<Model<T>>> {
        Ok(self
            .get_in_registry(&[entity_registry_id], registry)?
            .into_iter()
            .next())
    }
}

impl<T: RegistryAware> Model<T> {
    pub fn staged_schema(&self) -> Option<&StagedSchema> {
        self.staged.as_ref()
    }

    pub fn is_registered(&self) -> bool {
        match (self.data().registry_id(), &self.staged) {
            (None, _) => false,
            (Some(registry_id), Some(staged)) => staged.registry_id == registry_id,
            (Some(_), None) => true,
        }
    }

    /// The registry holding this record, if any.
    pub fn registry(&self) -> ApiResult<Option<Model<Registry>>> {
        match self.data().registry_id() {
            Some(registry_id) => self.session().registry().get(registry_id),
            None => Ok(None),
        }
    }

    pub fn add_alias(&mut self, alias: impl Into<String>) -> &mut Self {
        let alias = alias.into();
        let aliases = self.aliases_mut();
        if !aliases.contains(&alias) {
            aliases.push(alias);
        }
        self
    }

    /// Pick a schema by name from `valid_schemas`, stage its registry and persist the schema id.
    pub fn set_schema(&mut self, schema_name: &str) -> ApiResult<&mut Self> {
        let valid = self.interface().valid_schemas()?;
        if valid.is_empty() {
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "no valid schemas found for {}",
                T::DESCRIPTOR.name
            )));
        }
        let Some((registry, schema)) = valid
            .iter()
            .find(|(_, schema)| schema.name.as_deref() == Some(schema_name))
        else {
            let names: Vec<_> = valid
                .iter()
                .filter_map(|(_, schema)| schema.name.as_deref())
                .collect();
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("no schema \"{schema_name}\" found"))
                .with_hint(format!("select from {names:?}")));
        };
        let schema_id = schema.require_id("stage")?;
        let registry_id = match schema.registry_id() {
            Some(registry_id) => registry_id.to_string(),
            None => registry.require_id("stage")?,
        };
        debug!(model = T::DESCRIPTOR.name, %schema_id, %registry_id, "staging schema");
        self.set_schema_id(Some(schema_id.clone()));
        self.staged = Some(StagedSchema {
            registry_id,
            schema_id,
        });
        self.update()
    }

    pub fn register(&mut self, strategy: NamingStrategy) -> ApiResult<&mut Self> {
        let staged = self.staged.clone().ok_or_else(|| {
            Error::new(ErrorKind::Usage)
                .with_message(format!("no schema set for this {}", T::DESCRIPTOR.name))
                .with_hint("use set_schema() to stage one; valid_schemas() lists the candidates")
        })?;
        let id = self.require_id("register")?;
        self.session()
            .registry()
            .register_entities(&staged.registry_id, &[id.as_str()], strategy)?;
        self.reload()
    }

    /// Move the record out of its registry and into `folder_id`. A no-op when unregistered.
    pub fn unregister(&mut self, folder_id: &str) -> ApiResult<&mut Self> {
        let Some(registry_id) = self.data().registry_id().map(str::to_string) else {
            return Ok(self);
        };
        let id = self.require_id("unregister")?;
        self.session()
            .registry()
            .unregister_entities(&registry_id, &[id.as_str()], folder_id)?;
        self.staged = None;
        self.reload()
    }

    /// Register using `custom_id` as the registry id; the original name is restored afterwards.
    pub fn register_with_custom_id(&mut self, custom_id: &str) -> ApiResult<&mut Self> {
        let original = crate::core::model::Resource::name(self.data()).map(str::to_string);
        self.set_name(custom_id.to_string());
        self.update()?;
        let registered = self.register(NamingStrategy::IdsFromNames).map(|_| ());
        if let Some(name) = original {
            self.set_name(name);
        }
        self.update()?;
        registered?;
        Ok(self)
    }

    /// Register with `DELETE_NAMES` and keep the old name as an alias.
    pub fn register_and_save_name_as_alias(&mut self) -> ApiResult<&mut Self> {
        let original = crate::core::model::Resource::name(self.data()).map(str::to_string);
        self.register(NamingStrategy::DeleteNames)?;
        if let Some(name) = original {
            if !self.aliases().contains(&name) {
                self.add_alias(name);
                self.update()?;
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::NamingStrategy;

    #[test]
    fn naming_strategy_wire_names() {
        assert_eq!(NamingStrategy::default().as_str(), "NEW_IDS");
        assert_eq!(NamingStrategy::DeleteNames.to_string(), "DELETE_NAMES");
        assert_eq!(NamingStrategy::SetFromNameParts.as_str(), "SET_FROM_NAME_PARTS");
    }
}
