//! Errors raised by the pipeline steps.
//!
//! Problems with the validated *content* are never raised; they are returned
//! in the step output. These errors mean the step could not run at all.

use thiserror::Error;

use pipeline_ingest::IngestError;
use pipeline_model::ModelError;
use pipeline_validate::SchemaError;

use crate::store::StoreError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StepError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The task configuration could not be read.
    #[error("invalid task config: {0}")]
    InvalidConfig(String),

    /// The step needs an object-store input but got inline events.
    #[error("step input has no S3 prefix")]
    MissingS3Input,

    #[error("cannot combine multiple S3 datasets: {count}")]
    IllegalWrite { count: usize },

    #[error("input object {key} is not valid JSON: {source}")]
    InvalidJson {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StepError>;
