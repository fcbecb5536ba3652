//! Purpose: Concrete resource types of the service.
//! Exports: every resource struct, `DESCRIPTORS`.
//! Role: Declares field sets, create/update subsets and capabilities per type.
//! Invariants: `DESCRIPTORS` is the single list the resource registry is built from.

use crate::core::model::Resource;
use crate::core::registry::ResourceDescriptor;

/// Capability impls shared by registrable inventory entities.
///
/// The type needs `meta: EntityMeta`, `name`, `folder_id`, `schema_id` and `aliases` fields.
macro_rules! registry_entity {
    ($ty:ty) => {
        impl $ty {
            pub fn meta(&self) -> &$crate::resources::EntityMeta {
                &self.meta
            }
        }

        impl $crate::core::capability::Readable for $ty {}
        impl $crate::core::capability::Listable for $ty {}
        impl $crate::core::capability::Creatable for $ty {}
        impl $crate::core::capability::Updatable for $ty {}
        impl $crate::core::capability::Entity for $ty {}

        impl $crate::core::capability::Archivable for $ty {
            fn archive_record(&self) -> Option<&$crate::core::capability::ArchiveRecord> {
                self.meta.archive_record()
            }
        }

        impl $crate::core::capability::Inventory for $ty {
            fn folder_id(&self) -> Option<&str> {
                self.folder_id.as_deref()
            }

            fn set_folder_id(&mut self, folder_id: Option<String>) {
                self.folder_id = folder_id;
            }
        }

        impl $crate::core::capability::RegistryAware for $ty {
            fn registry_id(&self) -> Option<&str> {
                self.meta.registry_id()
            }

            fn entity_registry_id(&self) -> Option<&str> {
                self.meta.entity_registry_id()
            }

            fn schema_id(&self) -> Option<&str> {
                self.schema_id
                    .as_deref()
                    .or_else(|| self.meta.schema().and_then(|schema| schema.id.as_deref()))
            }

            fn set_schema_id(&mut self, schema_id: Option<String>) {
                self.schema_id = schema_id;
            }

            fn set_name(&mut self, name: String) {
                self.name = Some(name);
            }

            fn aliases(&self) -> &[String] {
                &self.aliases
            }

            fn aliases_mut(&mut self) -> &mut Vec<String> {
                &mut self.aliases
            }
        }
    };
}

pub mod alignment;
pub mod batch;
pub mod common;
pub mod custom_entity;
pub mod folder;
pub mod oligo;
pub mod registry;
pub mod sequence;

pub use alignment::{AlignmentAlgorithm, AlignmentInput, AlignmentRequest, DnaAlignment, Task, TaskStatus};
pub use batch::Batch;
pub use common::{Annotation, EntityMeta, SchemaSummary, Translation, UserSummary};
pub use custom_entity::CustomEntity;
pub use folder::{Folder, InventoryEntity, Project};
pub use oligo::Oligo;
pub use registry::{EntitySchema, Registry};
pub use sequence::{AaSequence, DnaSequence};

/// Every built-in resource type, in registration order.
pub const DESCRIPTORS: &[&ResourceDescriptor] = &[
    <DnaSequence as Resource>::DESCRIPTOR,
    <AaSequence as Resource>::DESCRIPTOR,
    <Oligo as Resource>::DESCRIPTOR,
    <CustomEntity as Resource>::DESCRIPTOR,
    <Batch as Resource>::DESCRIPTOR,
    <Folder as Resource>::DESCRIPTOR,
    <Project as Resource>::DESCRIPTOR,
    <Registry as Resource>::DESCRIPTOR,
    <EntitySchema as Resource>::DESCRIPTOR,
    <Annotation as Resource>::DESCRIPTOR,
    <Translation as Resource>::DESCRIPTOR,
    <DnaAlignment as Resource>::DESCRIPTOR,
    <Task as Resource>::DESCRIPTOR,
];
