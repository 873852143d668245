//! Building the step output.

use serde::Serialize;
use serde_json::Value;

use pipeline_model::{Status, StepData};

/// Errors reported in the output beyond this count are dropped.
pub const MAX_ERRORS: usize = 100;

/// Finish `step_data`: success when `errors` is empty, otherwise failure with
/// at most [`MAX_ERRORS`] errors.
pub fn finish<E: Serialize>(step_data: &StepData, errors: &[E]) -> StepData {
    let status = Status::from_error_count(errors.len());
    let reported: Vec<Value> = errors
        .iter()
        .take(MAX_ERRORS)
        .filter_map(|err| serde_json::to_value(err).ok())
        .collect();
    if errors.len() > reported.len() {
        tracing::info!(
            %status,
            errors = errors.len(),
            reported = reported.len(),
            "truncated error list"
        );
    } else {
        tracing::info!(%status, errors = errors.len(), "step finished");
    }
    step_data.finished(status, reported)
}
