//! Purpose: Map resource type names to their static descriptors.
//! Exports: `ResourceRegistry`, `ResourceDescriptor`, `Capability`, `CapabilitySet`.
//! Role: Process-wide lookup table built by one explicit registration pass.
//! Invariants: Each type name (and alias) resolves to exactly one descriptor.
//! Invariants: Re-registering an identical descriptor is a no-op; a different one is rejected.
//! Invariants: The global registry is immutable once initialized.
#![allow(clippy::result_large_err)]

use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::inflect;
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// A behaviour contract a resource type may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Fetch one record by identifier.
    Read,
    /// Page through the collection.
    List,
    /// Create new records.
    Create,
    /// Patch existing records.
    Update,
    /// Archive and unarchive records.
    Archive,
    /// Register into and out of a server-side registry.
    Registry,
    /// Lives inside a folder.
    Inventory,
}

bitflags::bitflags! {
    /// A set of resource capabilities.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CapabilitySet: u16 {
        const READ = 1 << 0;
        const LIST = 1 << 1;
        const CREATE = 1 << 2;
        const UPDATE = 1 << 3;
        const ARCHIVE = 1 << 4;
        const REGISTRY = 1 << 5;
        const INVENTORY = 1 << 6;
        /// Read, list, create, update and archive.
        const ENTITY = Self::READ.bits()
            | Self::LIST.bits()
            | Self::CREATE.bits()
            | Self::UPDATE.bits()
            | Self::ARCHIVE.bits();
    }
}

impl Capability {
    pub const fn as_set(self) -> CapabilitySet {
        match self {
            Self::Read => CapabilitySet::READ,
            Self::List => CapabilitySet::LIST,
            Self::Create => CapabilitySet::CREATE,
            Self::Update => CapabilitySet::UPDATE,
            Self::Archive => CapabilitySet::ARCHIVE,
            Self::Registry => CapabilitySet::REGISTRY,
            Self::Inventory => CapabilitySet::INVENTORY,
        }
    }
}

impl From<Capability> for CapabilitySet {
    fn from(cap: Capability) -> Self {
        cap.as_set()
    }
}

impl<const N: usize> From<[Capability; N]> for CapabilitySet {
    fn from(caps: [Capability; N]) -> Self {
        caps.into_iter().collect()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        let mut set = CapabilitySet::empty();
        for cap in iter {
            set |= cap.as_set();
        }
        set
    }
}

/// Static description of one resource type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub name: &'static str,
    pub alias: Option<&'static str>,
    pub capabilities: CapabilitySet,
    /// Local field names sent when creating.
    pub create_fields: &'static [&'static str],
    /// Local field names sent when updating.
    pub update_fields: &'static [&'static str],
    /// Schema type this resource registers as (`dna_sequence`, ...).
    pub entity_type: Option<&'static str>,
}

impl ResourceDescriptor {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            alias: None,
            capabilities: CapabilitySet::empty(),
            create_fields: &[],
            update_fields: &[],
            entity_type: None,
        }
    }

    pub fn path(&self) -> String {
        inflect::collection_path(self.name)
    }

    pub fn collection_key(&self) -> String {
        inflect::snake_plural(self.name)
    }

    pub fn ids_key(&self) -> String {
        inflect::ids_key(self.name)
    }

    pub fn supports(&self, caps: impl Into<CapabilitySet>) -> bool {
        self.capabilities.contains(caps.into())
    }

    pub(crate) fn require(&self, cap: Capability) -> ApiResult<()> {
        if self.supports(cap) {
            return Ok(());
        }
        Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{} does not support {cap:?}", self.name)))
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    by_name: BTreeMap<&'static str, &'static ResourceDescriptor>,
    aliases: BTreeMap<&'static str, &'static str>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in resource type.
    pub fn builtin() -> ApiResult<Self> {
        let mut registry = Self::new();
        for descriptor in crate::resources::DESCRIPTORS.iter().copied() {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn global() -> &'static ResourceRegistry {
        static GLOBAL: OnceLock<ResourceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| {
            Self::builtin().expect("built-in resource descriptors must register cleanly")
        })
    }

    pub fn register(&mut self, descriptor: &'static ResourceDescriptor) -> ApiResult<()> {
        if let Some(existing) = self.by_name.get(descriptor.name) {
            if *existing == descriptor {
                return Ok(());
            }
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "model \"{}\" is already registered with a different definition",
                descriptor.name
            )));
        }
        if self.aliases.contains_key(descriptor.name) {
            return Err(Error::new(ErrorKind::Usage).with_message(format!(
                "model name \"{}\" collides with an alias",
                descriptor.name
            )));
        }
        if let Some(alias) = descriptor.alias {
            if self.by_name.contains_key(alias) || self.aliases.contains_key(alias) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(format!("alias \"{alias}\" is already taken")));
            }
            self.aliases.insert(alias, descriptor.name);
        }
        self.by_name.insert(descriptor.name, descriptor);
        Ok(())
    }

    pub fn get(&self, name: &str) -> ApiResult<&'static ResourceDescriptor> {
        let canonical = self.aliases.get(name).copied().unwrap_or(name);
        self.by_name.get(canonical).copied().ok_or_else(|| {
            Error::new(ErrorKind::ModelNotFound)
                .with_message(format!("Model \"{name}\" not found in ResourceRegistry."))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_name.keys().copied()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static ResourceDescriptor> + '_ {
        self.by_name.values().copied()
    }

    /// Descriptors supporting every requested capability.
    pub fn filter_by_capabilities(
        &self,
        caps: impl Into<CapabilitySet>,
    ) -> Vec<&'static ResourceDescriptor> {
        let caps = caps.into();
        self.descriptors()
            .filter(|descriptor| descriptor.capabilities.contains(caps))
            .collect()
    }

    /// Reverse of `ResourceDescriptor::path`.
    pub fn descriptor_for_path(&self, path: &str) -> ApiResult<&'static ResourceDescriptor> {
        let segment = path.trim_matches('/');
        self.descriptors()
            .find(|descriptor| descriptor.path() == segment)
            .ok_or_else(|| {
                Error::new(ErrorKind::ModelNotFound)
                    .with_message(format!("no model is served at path \"{segment}\""))
            })
    }
}
