use crate::core::model::Resource;
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::{Annotation, EntityMeta, Translation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const SEQUENCE_CAPABILITIES: CapabilitySet = CapabilitySet::ENTITY
    .union(CapabilitySet::REGISTRY)
    .union(CapabilitySet::INVENTORY);

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnaSequence {
    #[serde(flatten)]
    meta: EntityMeta,
    pub name: Option<String>,
    pub bases: Option<String>,
    pub is_circular: Option<bool>,
    pub folder_id: Option<String>,
    pub schema_id: Option<String>,
    pub aliases: Vec<String>,
    pub custom_fields: Map<String, Value>,
    pub fields: Map<String, Value>,
    pub annotations: Vec<Annotation>,
    pub translations: Vec<Translation>,
    length: Option<u64>,
}

impl DnaSequence {
    pub fn new(name: impl Into<String>, bases: impl Into<String>, is_circular: bool) -> Self {
        Self {
            name: Some(name.into()),
            bases: Some(bases.into()),
            is_circular: Some(is_circular),
            ..Self::default()
        }
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

impl Resource for DnaSequence {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "DNASequence",
        alias: None,
        capabilities: SEQUENCE_CAPABILITIES,
        create_fields: &[
            "aliases",
            "annotations",
            "bases",
            "custom_fields",
            "fields",
            "folder_id",
            "is_circular",
            "name",
            "schema_id",
            "translations",
        ],
        update_fields: &[
            "aliases",
            "bases",
            "custom_fields",
            "fields",
            "folder_id",
            "is_circular",
            "name",
            "schema_id",
        ],
        entity_type: Some("dna_sequence"),
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

registry_entity!(DnaSequence);

/// Protein sequence.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AaSequence {
    #[serde(flatten)]
    meta: EntityMeta,
    pub name: Option<String>,
    pub amino_acids: Option<String>,
    pub folder_id: Option<String>,
    pub schema_id: Option<String>,
    pub aliases: Vec<String>,
    pub custom_fields: Map<String, Value>,
    pub fields: Map<String, Value>,
    pub annotations: Vec<Annotation>,
    length: Option<u64>,
}

impl AaSequence {
    pub fn new(name: impl Into<String>, amino_acids: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            amino_acids: Some(amino_acids.into()),
            ..Self::default()
        }
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }
}

const AA_FIELDS: &[&str] = &[
    "aliases",
    "amino_acids",
    "custom_fields",
    "fields",
    "folder_id",
    "name",
    "schema_id",
];

impl Resource for AaSequence {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "AASequence",
        alias: Some("Protein"),
        capabilities: SEQUENCE_CAPABILITIES,
        create_fields: AA_FIELDS,
        update_fields: AA_FIELDS,
        entity_type: Some("aa_sequence"),
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

registry_entity!(AaSequence);
