//! Purpose: Template alignments and the long-running tasks that produce them.
//! Exports: `DnaAlignment`, `Task`, `TaskStatus`, `AlignmentAlgorithm`, `AlignmentInput`,
//! `AlignmentRequest`.
//! Role: Submits alignment jobs (sequence ids, loaded sequences or local trace files) and polls tasks.
//! Invariants: Unknown algorithms are rejected locally before any request.
//! Invariants: Local files are read and base64-encoded at submission time.
#![allow(clippy::result_large_err)]

use crate::core::capability::Readable;
use crate::core::error::{ApiResult, Error, ErrorKind};
use crate::core::http::Query;
use crate::core::model::{Interface, Model, Resource};
use crate::core::registry::{CapabilitySet, ResourceDescriptor};
use crate::resources::DnaSequence;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AlignmentAlgorithm {
    Mafft,
    Clustalo,
}

impl AlignmentAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            AlignmentAlgorithm::Mafft => "mafft",
            AlignmentAlgorithm::Clustalo => "clustalo",
        }
    }
}

impl fmt::Display for AlignmentAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlignmentAlgorithm {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mafft" => Ok(AlignmentAlgorithm::Mafft),
            "clustalo" => Ok(AlignmentAlgorithm::Clustalo),
            _ => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown alignment algorithm \"{value}\""))
                .with_hint("use \"mafft\" or \"clustalo\"")),
        }
    }
}

/// One sequence to align against the template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlignmentInput {
    /// An existing DNA sequence.
    SequenceId(String),
    /// A local trace or sequence file (`.ab1`, `.fasta`, ...).
    File(PathBuf),
    /// Already base64-encoded file content.
    Encoded { name: String, data: String },
}

impl AlignmentInput {
    fn to_wire_file(&self) -> ApiResult<Value> {
        match self {
            AlignmentInput::SequenceId(id) => Ok(json!({"sequence_id": id})),
            AlignmentInput::Encoded { name, data } => Ok(json!({"name": name, "data": data})),
            AlignmentInput::File(path) => {
                let bytes = std::fs::read(path).map_err(|err| {
                    Error::new(ErrorKind::Usage)
                        .with_message(format!("cannot read alignment input {}", path.display()))
                        .with_source(err)
                })?;
                let name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "untitled".to_string());
                Ok(json!({"name": name, "data": STANDARD.encode(bytes)}))
            }
        }
    }
}

impl From<&Model<DnaSequence>> for AlignmentInput {
    fn from(sequence: &Model<DnaSequence>) -> Self {
        AlignmentInput::SequenceId(sequence.id().unwrap_or_default().to_string())
    }
}

impl From<PathBuf> for AlignmentInput {
    fn from(path: PathBuf) -> Self {
        AlignmentInput::File(path)
    }
}

/// A template alignment job.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentRequest {
    pub name: String,
    pub algorithm: AlignmentAlgorithm,
    pub template_sequence_id: String,
    pub inputs: Vec<AlignmentInput>,
}

impl AlignmentRequest {
    pub fn new(
        name: impl Into<String>,
        algorithm: AlignmentAlgorithm,
        template_sequence_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            algorithm,
            template_sequence_id: template_sequence_id.into(),
            inputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, input: impl Into<AlignmentInput>) -> Self {
        self.inputs.push(input.into());
        self
    }

    fn body(&self) -> ApiResult<Value> {
        if self.template_sequence_id.is_empty() {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("alignment template has no sequence id")
                .with_hint("save the template sequence first"));
        }
        let mut files = vec![json!({"sequence_id": self.template_sequence_id})];
        for input in &self.inputs {
            if matches!(input, AlignmentInput::SequenceId(id) if id.is_empty()) {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("alignment input sequence has no id")
                    .with_hint("save input sequences before aligning"));
            }
            files.push(input.to_wire_file()?);
        }
        Ok(json!({
            "algorithm": self.algorithm.as_str(),
            "name": self.name,
            "template_sequence_id": self.template_sequence_id,
            "files": files,
        }))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnaAlignment {
    id: Option<String>,
    pub name: Option<String>,
    pub aligned_sequences: Vec<Map<String, Value>>,
    web_url: Option<String>,
}

impl DnaAlignment {
    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }
}

impl Resource for DnaAlignment {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "DNAAlignment",
        alias: None,
        capabilities: CapabilitySet::READ,
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
        self.web_url = None;
    }
}

impl Readable for DnaAlignment {}

impl Interface<DnaAlignment> {
    /// Start a template alignment; the returned task resolves to the alignment.
    pub fn submit_alignment(&self, request: &AlignmentRequest) -> ApiResult<Model<Task>> {
        let body = request.body()?;
        info!(
            algorithm = %request.algorithm,
            inputs = request.inputs.len(),
            "submitting alignment"
        );
        let response = self.raw_post(&[], &Query::new(), &body, Some("create-template-alignment"))?;
        let task_id = response
            .get("taskId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::new(ErrorKind::Deserialize)
                    .with_message("alignment response has no taskId")
                    .with_body(response.clone())
            })?;
        self.session()
            .task()
            .load(json!({"id": task_id, "status": "RUNNING"}))
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        self.raw_delete(&[id], &Query::new(), None)?;
        Ok(())
    }
}

impl Model<DnaAlignment> {
    pub fn delete(self) -> ApiResult<()> {
        let id = self.require_id("delete")?;
        self.interface().delete(&id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Running,
    Succeeded,
    Failed,
}

/// Handle on a long-running server job.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Task {
    id: Option<String>,
    status: TaskStatus,
    message: Option<String>,
    response: Option<Value>,
    errors: Option<Value>,
}

impl Task {
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Result payload once the task has succeeded (local form).
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    pub fn errors(&self) -> Option<&Value> {
        self.errors.as_ref()
    }
}

impl Resource for Task {
    const DESCRIPTOR: &'static ResourceDescriptor = &ResourceDescriptor {
        name: "Task",
        alias: None,
        capabilities: CapabilitySet::READ,
        create_fields: &[],
        update_fields: &[],
        entity_type: None,
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn clear_server_fields(&mut self) {
        *self = Task::default();
    }
}

impl Readable for Task {}

impl Model<Task> {
    /// Poll until the task leaves `RUNNING` or `max_polls` reloads have been spent.
    pub fn wait(&mut self, poll: Duration, max_polls: usize) -> ApiResult<TaskStatus> {
        let mut polls = 0;
        while self.status() == TaskStatus::Running && polls < max_polls {
            if polls > 0 {
                thread::sleep(poll);
            }
            self.reload()?;
            polls += 1;
            debug!(status = ?self.status(), polls, "task polled");
        }
        Ok(self.status())
    }

    /// The alignment a succeeded alignment task produced.
    pub fn alignment(&self) -> ApiResult<Option<Model<DnaAlignment>>> {
        match (self.status(), self.response()) {
            (TaskStatus::Succeeded, Some(response)) => self
                .session()
                .dna_alignment()
                .load(response.clone())
                .map(Some),
            _ => Ok(None),
        }
    }
}
