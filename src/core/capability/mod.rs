//! Purpose: Capability contracts a resource type opts into.
//! Exports: `Readable`, `Listable`, `Creatable`, `Updatable`, `Archivable`, `RegistryAware`,
//! `Inventory`, `Entity`, plus the per-capability helper types.
//! Role: Marker and accessor traits; behaviour lives in bounded `Interface<T>` / `Model<T>` impls
//! inside the sibling modules.
//! Invariants: A type implements a trait here iff its descriptor carries the matching capability.

pub mod archive;
pub mod create;
pub mod inventory;
pub mod list;
pub mod read;
pub mod registration;
pub mod update;

pub use archive::{ArchiveReason, ArchiveRecord};
pub use list::{Items, MAX_PAGE_SIZE, Paged};
pub use registration::{Lookup, NamingStrategy};

use crate::core::model::Resource;

/// Fetch one record by identifier.
pub trait Readable: Resource {}

/// Page through the collection.
pub trait Listable: Resource {}

/// Create new records from the descriptor's create fields.
pub trait Creatable: Resource {}

/// Patch existing records with the descriptor's update fields.
pub trait Updatable: Resource {}

pub trait Archivable: Resource {
    fn archive_record(&self) -> Option<&ArchiveRecord>;
}

/// Lives inside a folder.
pub trait Inventory: Updatable {
    fn folder_id(&self) -> Option<&str>;

    fn set_folder_id(&mut self, folder_id: Option<String>);
}

/// Full record lifecycle: read, list, create, update and archive.
pub trait Entity: Readable + Listable + Creatable + Updatable + Archivable {}

/// Can be registered into (and out of) a server-side registry.
pub trait RegistryAware: Readable + Listable + Updatable {
    /// Registry holding this record; server-owned.
    fn registry_id(&self) -> Option<&str>;

    /// Identifier assigned by the registry; server-owned.
    fn entity_registry_id(&self) -> Option<&str>;

    fn schema_id(&self) -> Option<&str>;

    fn set_schema_id(&mut self, schema_id: Option<String>);

    fn set_name(&mut self, name: String);

    fn aliases(&self) -> &[String];

    fn aliases_mut(&mut self) -> &mut Vec<String>;
}
