//! Locating and opening a step's input object.

use pipeline_model::StepData;

use crate::error::{Result, StepError};
use crate::retry::RetryPolicy;
use crate::store::{Body, ObjectStore};

/// Prefix of the first S3 input dataset.
pub(crate) fn first_s3_prefix(step_data: &StepData) -> Result<&str> {
    step_data
        .s3_input_prefixes()
        .and_then(|prefixes| prefixes.values().next())
        .map(String::as_str)
        .ok_or(StepError::MissingS3Input)
}

/// Open the first object under `prefix`, retrying transient store failures.
pub(crate) fn open_first_object<S>(
    store: &S,
    prefix: &str,
    retry: &RetryPolicy,
) -> Result<(String, Body)>
where
    S: ObjectStore + ?Sized,
{
    let key = retry.run("list_keys", || store.first_key(prefix))?;
    let body = retry.run("get_object", || store.get_object(&key))?;
    tracing::info!(s3_input_prefix = prefix, s3_input_path = %key, "opened input object");
    Ok((key, body))
}
