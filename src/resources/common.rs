//! Purpose: Value objects shared by several resources.
//! Exports: `EntityMeta`, `UserSummary`, `SchemaSummary`, `Annotation`, `Translation`.
//! Role: Server-owned metadata block and nested sequence features.
//! Invariants: `EntityMeta` has no setters; it only changes through server responses.

use crate::core::capability::ArchiveRecord;
use crate::core::model::Resource;
use crate::core::registry::ResourceDescriptor;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// Fields the server assigns to every entity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityMeta {
    id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    modified_at: Option<OffsetDateTime>,
    web_url: Option<String>,
    archive_record: Option<ArchiveRecord>,
    registry_id: Option<String>,
    entity_registry_id: Option<String>,
    creator: Option<UserSummary>,
    schema: Option<SchemaSummary>,
}

impl EntityMeta {
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn created_at(&self) -> Option<OffsetDateTime> {
        self.created_at
    }

    pub fn modified_at(&self) -> Option<OffsetDateTime> {
        self.modified_at
    }

    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }

    pub fn archive_record(&self) -> Option<&ArchiveRecord> {
        self.archive_record.as_ref()
    }

    pub fn registry_id(&self) -> Option<&str> {
        self.registry_id.as_deref()
    }

    pub fn entity_registry_id(&self) -> Option<&str> {
        self.entity_registry_id.as_deref()
    }

    pub fn creator(&self) -> Option<&UserSummary> {
        self.creator.as_ref()
    }

    pub fn schema(&self) -> Option<&SchemaSummary> {
        self.schema.as_ref()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSummary {
    pub id: Option<String>,
    pub handle: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaSummary {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A feature on a sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Annotation {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub feature_type: Option<String>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    /// 1, -1, or 0 for unstranded.
    pub strand: Option<i8>,
    pub color: Option<String>,
}

impl Resource for Annotation {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor::new("Annotation");

    fn id(&self) -> Option<&str> {
        None
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn clear_server_fields(&mut self) {}
}

/// A protein translation of a sequence region.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Translation {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub strand: Option<i8>,
    pub amino_acids: Option<String>,
    pub regions: Vec<Map<String, Value>>,
}

impl Resource for Translation {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor::new("Translation");

    fn id(&self) -> Option<&str> {
        None
    }

    fn clear_server_fields(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::EntityMeta;
    use serde_json::json;

    #[test]
    fn meta_reads_server_fields() {
        let meta: EntityMeta = serde_json::from_value(json!({
            "id": "seq_1",
            "created_at": "2019-04-01T12:30:00Z",
            "modified_at": null,
            "archive_record": {"reason": "Retired"},
            "registry_id": "src_1",
            "schema": {"id": "ts_1", "name": "Plasmid"}
        }))
        .expect("meta");
        assert_eq!(meta.id(), Some("seq_1"));
        assert_eq!(meta.created_at().map(|at| at.year()), Some(2019));
        assert_eq!(meta.modified_at(), None);
        assert!(meta.archive_record().is_some());
        assert_eq!(meta.registry_id(), Some("src_1"));
        assert_eq!(meta.schema().and_then(|s| s.name.as_deref()), Some("Plasmid"));
    }
}
