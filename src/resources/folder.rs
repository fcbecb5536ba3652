#![allow(clippy::result_large_err)]

use crate::core::capability::{ArchiveRecord, Archivable, Creatable, Inventory, Listable, Readable};
use crate::core::error::ApiResult;
use crate::core::http::Query;
use crate::core::model::{Interface, Model, Resource};
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::core::session::Session;
use crate::resources::{AaSequence, CustomEntity, DnaSequence, Oligo, UserSummary};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Folder {
    id: Option<String>,
    pub name: Option<String>,
    pub parent_folder_id: Option<String>,
    project_id: Option<String>,
    archive_record: Option<ArchiveRecord>,
}

impl Folder {
    pub fn new(name: impl Into<String>, parent_folder_id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parent_folder_id: Some(parent_folder_id.into()),
            ..Self::default()
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }
}

impl Resource for Folder {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Folder",
        alias: None,
        capabilities: CapabilitySet::READ
            .union(CapabilitySet::LIST)
            .union(CapabilitySet::CREATE)
            .union(CapabilitySet::ARCHIVE),
        create_fields: &["name", "parent_folder_id"],
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
        self.project_id = None;
        self.archive_record = None;
    }
}

impl Readable for Folder {}
impl Listable for Folder {}
impl Creatable for Folder {}

impl Archivable for Folder {
    fn archive_record(&self) -> Option<&ArchiveRecord> {
        self.archive_record.as_ref()
    }
}

/// Any record that can live inside a folder.
#[derive(Clone, Debug)]
pub enum InventoryEntity {
    DnaSequence(Model<DnaSequence>),
    AaSequence(Model<AaSequence>),
    Oligo(Model<Oligo>),
    CustomEntity(Model<CustomEntity>),
}

impl InventoryEntity {
    pub fn id(&self) -> Option<&str> {
        match self {
            InventoryEntity::DnaSequence(model) => model.id(),
            InventoryEntity::AaSequence(model) => model.id(),
            InventoryEntity::Oligo(model) => model.id(),
            InventoryEntity::CustomEntity(model) => model.id(),
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            InventoryEntity::DnaSequence(model) => model.model_name(),
            InventoryEntity::AaSequence(model) => model.model_name(),
            InventoryEntity::Oligo(model) => model.model_name(),
            InventoryEntity::CustomEntity(model) => model.model_name(),
        }
    }
}

fn in_folder<T: Inventory + Listable>(
    interface: Interface<T>,
    folder_id: &str,
    wrap: fn(Model<T>) -> InventoryEntity,
) -> impl Iterator<Item = ApiResult<InventoryEntity>> + use<T> {
    interface
        .all(None, None, Query::new().with("folder_id", folder_id))
        .map(move |model: ApiResult<Model<T>>| model.map(wrap))
}

fn contents(
    folder_id: &str,
    session: &Session,
) -> Box<dyn Iterator<Item = ApiResult<InventoryEntity>>> {
    Box::new(
        in_folder(session.dna_sequence(), folder_id, InventoryEntity::DnaSequence)
            .chain(in_folder(session.aa_sequence(), folder_id, InventoryEntity::AaSequence))
            .chain(in_folder(session.oligo(), folder_id, InventoryEntity::Oligo))
            .chain(in_folder(session.custom_entity(), folder_id, InventoryEntity::CustomEntity)),
    )
}

impl Model<Folder> {
    /// Lazily walk every inventory entity filed in this folder, one type after another.
    pub fn all_entities(&self) -> ApiResult<Box<dyn Iterator<Item = ApiResult<InventoryEntity>>>> {
        let id = self.require_id("list entities of")?;
        Ok(contents(&id, self.session()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    id: Option<String>,
    pub name: Option<String>,
    owner: Option<UserSummary>,
    archive_record: Option<ArchiveRecord>,
}

impl Project {
    pub fn owner(&self) -> Option<&UserSummary> {
        self.owner.as_ref()
    }
}

impl Resource for Project {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Project",
        alias: None,
        capabilities: CapabilitySet::READ
            .union(CapabilitySet::LIST)
            .union(CapabilitySet::ARCHIVE),
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
        self.archive_record = None;
    }
}

impl Readable for Project {}
impl Listable for Project {}

impl Archivable for Project {
    fn archive_record(&self) -> Option<&ArchiveRecord> {
        self.archive_record.as_ref()
    }
}
