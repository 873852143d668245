//! Pipeline validation steps.
//!
//! Each step takes a [`StepEvent`] and an injected [`ObjectStore`] and returns
//! the updated [`StepData`]:
//!
//! - [`validate_csv`]: stream a (possibly gzipped) CSV object, type its rows
//!   and validate them against a JSON Schema.
//! - [`validate_json`]: validate inline JSON events or one JSON object.

pub mod config;
pub mod error;
mod input;
pub mod outcome;
pub mod retry;
pub mod store;
pub mod validate_csv;
pub mod validate_json;

use std::fmt;
use std::str::FromStr;

pub use config::{CsvStepConfig, JsonStepConfig};
pub use error::{Result, StepError};
pub use outcome::{MAX_ERRORS, finish};
pub use retry::{RetryPolicy, Retryable};
pub use store::{Body, LocalObjectStore, ObjectStore, StoreError};
pub use validate_csv::validate_csv;
pub use validate_json::validate_json;

use pipeline_model::{StepData, StepEvent};

/// The steps this crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ValidateCsv,
    ValidateJson,
}

impl Step {
    pub const ALL: [Step; 2] = [Step::ValidateCsv, Step::ValidateJson];

    pub fn name(&self) -> &'static str {
        match self {
            Step::ValidateCsv => "validate-csv",
            Step::ValidateJson => "validate-json",
        }
    }

    pub fn run<S>(&self, event: &StepEvent, store: &S, retry: &RetryPolicy) -> Result<StepData>
    where
        S: ObjectStore + ?Sized,
    {
        match self {
            Step::ValidateCsv => validate_csv(event, store, retry),
            Step::ValidateJson => validate_json(event, store, retry),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Step::ALL
            .into_iter()
            .find(|step| step.name() == s)
            .ok_or_else(|| format!("unknown step: {s}"))
    }
}
