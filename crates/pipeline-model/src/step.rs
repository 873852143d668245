//! Step input and output contract.
//!
//! The orchestration layer hands each step a JSON event:
//!
//! ```json
//! {
//!   "execution_name": "boligpriser-UUID",
//!   "task": "validate_input",
//!   "payload": {
//!     "pipeline": {"id": "...", "task_config": {"validate_input": {...}}},
//!     "output_dataset": {"id": "...", "version": "1"},
//!     "step_data": {"s3_input_prefixes": {...}, "status": "PENDING", "errors": []}
//!   }
//! }
//! ```
//!
//! and expects the updated `step_data` back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ModelError, Result};
use crate::status::Status;

/// Reference to the data a step operates on. Exactly one kind is ever set.
#[derive(Debug, Clone, PartialEq)]
pub enum StepInput {
    /// Dataset id to object-store key prefix.
    S3Prefixes(BTreeMap<String, String>),
    /// Already materialised JSON documents.
    Events(Vec<Value>),
}

impl StepInput {
    /// Build from the two optional wire fields. Empty collections count as unset.
    pub fn from_parts(
        s3_input_prefixes: Option<BTreeMap<String, String>>,
        input_events: Option<Vec<Value>>,
    ) -> Result<Self> {
        let prefixes = s3_input_prefixes.filter(|p| !p.is_empty());
        let events = input_events.filter(|e| !e.is_empty());
        match (prefixes, events) {
            (Some(_), Some(_)) => Err(ModelError::BothInputs),
            (None, None) => Err(ModelError::NoInput),
            (Some(prefixes), None) => Ok(StepInput::S3Prefixes(prefixes)),
            (None, Some(events)) => Ok(StepInput::Events(events)),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            StepInput::S3Prefixes(prefixes) => prefixes.len(),
            StepInput::Events(events) => events.len(),
        }
    }

    pub fn s3_prefixes(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            StepInput::S3Prefixes(prefixes) => Some(prefixes),
            StepInput::Events(_) => None,
        }
    }

    pub fn events(&self) -> Option<&[Value]> {
        match self {
            StepInput::Events(events) => Some(events),
            StepInput::S3Prefixes(_) => None,
        }
    }
}

/// Wire shape of [`StepData`]; both input fields are always written.
#[derive(Debug, Serialize, Deserialize)]
struct RawStepData {
    status: String,
    #[serde(default)]
    errors: Vec<Value>,
    #[serde(default)]
    s3_input_prefixes: Option<BTreeMap<String, String>>,
    #[serde(default)]
    input_events: Option<Vec<Value>>,
}

/// Per-step state passed between pipeline stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawStepData", into = "RawStepData")]
pub struct StepData {
    /// Kept as text: earlier steps may report statuses this crate does not know.
    pub status: String,
    pub errors: Vec<Value>,
    pub input: StepInput,
}

impl StepData {
    pub fn new(status: Status, errors: Vec<Value>, input: StepInput) -> Self {
        Self {
            status: status.as_str().to_string(),
            errors,
            input,
        }
    }

    /// Build from the wire fields, enforcing the one-input invariant.
    pub fn from_parts(
        status: impl Into<String>,
        errors: Vec<Value>,
        s3_input_prefixes: Option<BTreeMap<String, String>>,
        input_events: Option<Vec<Value>>,
    ) -> Result<Self> {
        Ok(Self {
            status: status.into(),
            errors,
            input: StepInput::from_parts(s3_input_prefixes, input_events)?,
        })
    }

    /// Same input reference with a terminal status and error list.
    pub fn finished(&self, status: Status, errors: Vec<Value>) -> Self {
        Self::new(status, errors, self.input.clone())
    }

    pub fn input_count(&self) -> usize {
        self.input.count()
    }

    pub fn s3_input_prefixes(&self) -> Option<&BTreeMap<String, String>> {
        self.input.s3_prefixes()
    }

    pub fn input_events(&self) -> Option<&[Value]> {
        self.input.events()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl TryFrom<RawStepData> for StepData {
    type Error = ModelError;

    fn try_from(raw: RawStepData) -> Result<Self> {
        StepData::from_parts(
            raw.status,
            raw.errors,
            raw.s3_input_prefixes,
            raw.input_events,
        )
    }
}

impl From<StepData> for RawStepData {
    fn from(data: StepData) -> Self {
        let (s3_input_prefixes, input_events) = match data.input {
            StepInput::S3Prefixes(prefixes) => (Some(prefixes), None),
            StepInput::Events(events) => (None, Some(events)),
        };
        RawStepData {
            status: data.status,
            errors: data.errors,
            s3_input_prefixes,
            input_events,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    /// Per-task configuration of this pipeline instance, keyed by task name.
    #[serde(default)]
    pub task_config: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDataset {
    pub id: String,
    pub version: String,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub s3_prefix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub pipeline: Pipeline,
    pub output_dataset: OutputDataset,
    pub step_data: StepData,
}

#[derive(Debug, Deserialize)]
struct RawStepEvent {
    execution_name: String,
    task: String,
    payload: Payload,
    #[serde(default)]
    task_config: Option<Map<String, Value>>,
}

/// A parsed step event with its effective task configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct StepEvent {
    pub execution_name: String,
    pub task: String,
    pub payload: Payload,
    /// Template-level `task_config` updated with the pipeline instance's
    /// config for `task`.
    pub task_config: Map<String, Value>,
}

impl StepEvent {
    pub fn from_value(event: Value) -> Result<Self> {
        let raw: RawStepEvent = serde_json::from_value(event)?;
        Self::from_raw(raw)
    }

    pub fn from_json(event: &str) -> Result<Self> {
        let raw: RawStepEvent = serde_json::from_str(event)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawStepEvent) -> Result<Self> {
        let mut task_config = raw.task_config.unwrap_or_default();

        let instance_config = raw
            .payload
            .pipeline
            .task_config
            .as_ref()
            .and_then(|configs| configs.get(&raw.task));
        match instance_config {
            None | Some(Value::Null) => {}
            Some(Value::Object(overrides)) => {
                for (key, value) in overrides {
                    task_config.insert(key.clone(), value.clone());
                }
            }
            Some(other) => {
                return Err(ModelError::InvalidField {
                    field: format!("pipeline.task_config.{}", raw.task),
                    reason: format!("expected an object, got {other}"),
                });
            }
        }

        Ok(Self {
            execution_name: raw.execution_name,
            task: raw.task,
            payload: raw.payload,
            task_config,
        })
    }

    pub fn step_data(&self) -> &StepData {
        &self.payload.step_data
    }
}
