//! Running a step from files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{info, info_span, trace};

use pipeline_model::{Status, StepData, StepEvent};
use pipeline_steps::{LocalObjectStore, RetryPolicy, Step};

use crate::logging::redact_value;

/// Inputs for one step run.
#[derive(Debug, Clone)]
pub struct StepRequest {
    /// JSON file holding the step event.
    pub event: PathBuf,
    /// Directory used as the object store root.
    pub store: PathBuf,
    /// Attempts per storage call.
    pub attempts: u32,
}

/// Read the event, run `step` against the local store and return the
/// resulting step data.
pub fn run_step(step: Step, request: &StepRequest) -> Result<StepData> {
    let span = info_span!("run_step", step = %step, event = %request.event.display());
    let _guard = span.enter();

    let text = fs::read_to_string(&request.event)
        .with_context(|| format!("read step event {}", request.event.display()))?;
    let event = StepEvent::from_json(&text)
        .with_context(|| format!("parse step event {}", request.event.display()))?;
    let store = LocalObjectStore::new(&request.store);
    let retry = RetryPolicy::new(request.attempts);

    let output = step
        .run(&event, &store, &retry)
        .with_context(|| format!("{step} failed for {}", event.execution_name))?;

    for error in &output.errors {
        let message = error.get("message").and_then(Value::as_str).unwrap_or_default();
        trace!(
            row = %error["row"],
            column = %error["column"],
            message = redact_value(message),
            "finding"
        );
    }
    info!(status = %output.status, errors = output.errors.len(), "run finished");
    Ok(output)
}

/// Write the step data as pretty JSON to `path`, or stdout when `None`.
pub fn write_output(output: &StepData, path: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(output).context("serialize step data")?;
    match path {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("write output {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Process exit code for a finished step: 0 on success, 1 on findings.
pub fn exit_code(output: &StepData) -> i32 {
    if output.status == Status::ValidationSuccess.as_str() {
        0
    } else {
        1
    }
}
