//! Purpose: Define the public Rust API boundary of the client.
//! Exports: Session, configuration, resource types, capability helpers and errors.
//! Role: Additive-only surface; callers should not need paths into `core`.
//! Invariants: Everything needed to read, list, create, update, archive and register
//! records is reachable from here.

pub use crate::core::backend::{Backend, HttpRequest, HttpResponse, Method, UreqBackend};
pub use crate::core::capability::{
    Archivable, ArchiveReason, ArchiveRecord, Creatable, Entity, Inventory, Items, Listable,
    Lookup, MAX_PAGE_SIZE, NamingStrategy, Paged, Readable, RegistryAware, Updatable,
};
pub use crate::core::config::{DEFAULT_HOME, SessionConfig};
pub use crate::core::dynamic::DynInterface;
pub use crate::core::error::{ApiResult, Error, ErrorKind};
pub use crate::core::http::{Http, Pages, Query};
pub use crate::core::model::{Interface, Model, Resource, StagedSchema};
pub use crate::core::registry::{Capability, CapabilitySet, ResourceDescriptor, ResourceRegistry};
pub use crate::core::session::Session;
pub use crate::resources::{
    AaSequence, AlignmentAlgorithm, AlignmentInput, AlignmentRequest, Annotation, Batch,
    CustomEntity, DnaAlignment, DnaSequence, EntityMeta, EntitySchema, Folder, InventoryEntity,
    Oligo, Project, Registry, SchemaSummary, Task, TaskStatus, Translation, UserSummary,
};
