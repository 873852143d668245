//! JSON validation step.

use std::io::Read;

use serde_json::Value;

use pipeline_model::{Status, StepData, StepEvent, StepInput};
use pipeline_validate::JsonSchemaValidator;

use crate::config::JsonStepConfig;
use crate::error::{Result, StepError};
use crate::input::{first_s3_prefix, open_first_object};
use crate::outcome::finish;
use crate::retry::RetryPolicy;
use crate::store::{ObjectStore, StoreError};

/// Validate the JSON input of `event`, given inline or as one S3 object.
///
/// An S3 object holding a top-level array is validated element by element;
/// any other document is validated as a single record.
pub fn validate_json<S>(event: &StepEvent, store: &S, retry: &RetryPolicy) -> Result<StepData>
where
    S: ObjectStore + ?Sized,
{
    let span = tracing::info_span!(
        "validate_json",
        execution_name = %event.execution_name,
        task = %event.task,
    );
    let _guard = span.enter();

    let config = JsonStepConfig::from_task_config(&event.task_config)?;
    let step_data = event.step_data();
    let dataset = &event.payload.output_dataset;
    tracing::info!(
        dataset_id = %dataset.id,
        version = %dataset.version,
        edition = ?dataset.edition,
        "validating JSON input"
    );

    if let Some(prefixes) = step_data.s3_input_prefixes()
        && prefixes.len() > 1
    {
        return Err(StepError::IllegalWrite {
            count: prefixes.len(),
        });
    }

    let Some(schema) = config.schema.as_ref() else {
        tracing::info!("no schema provided for validation");
        return Ok(step_data.finished(Status::ValidationSuccess, Vec::new()));
    };

    let validator = JsonSchemaValidator::new(schema)?;
    let documents = resolve_input(step_data, store, retry)?;
    let errors = validator.validate_list(&documents);
    Ok(finish(step_data, &errors))
}

fn resolve_input<S>(step_data: &StepData, store: &S, retry: &RetryPolicy) -> Result<Vec<Value>>
where
    S: ObjectStore + ?Sized,
{
    if let StepInput::Events(events) = &step_data.input {
        return Ok(events.clone());
    }

    let prefix = first_s3_prefix(step_data)?;
    let (key, mut body) = open_first_object(store, prefix, retry)?;
    let mut text = String::new();
    body.read_to_string(&mut text)
        .map_err(|source| StoreError::Io {
            key: key.clone(),
            source,
        })?;
    let document: Value =
        serde_json::from_str(&text).map_err(|source| StepError::InvalidJson { key, source })?;

    Ok(match document {
        Value::Array(records) => records,
        other => vec![other],
    })
}
