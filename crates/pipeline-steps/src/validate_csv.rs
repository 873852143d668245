//! CSV validation step.
//!
//! Streams the first object under the step's S3 input prefix through the
//! line reader, splits it into CSV records, types each row against the
//! configured schema and validates the result.

use serde_json::Value;

use pipeline_ingest::{CsvRecords, LineReader, RowsOutcome, parse_csv};
use pipeline_model::{Status, StepData, StepEvent, ValidationError};
use pipeline_validate::JsonSchemaValidator;

use crate::config::CsvStepConfig;
use crate::error::Result;
use crate::input::{first_s3_prefix, open_first_object};
use crate::outcome::finish;
use crate::retry::RetryPolicy;
use crate::store::ObjectStore;

pub const NO_DATA_ROWS: &str = "Input file contains no data rows";
pub const MISSING_HEADER: &str = "Input file is missing the header row";

/// Validate the CSV input of `event`.
///
/// Content problems end in `VALIDATION_FAILED` with the (capped) error list.
/// Configuration, schema, storage and stream errors are returned as `Err`;
/// the schema is checked before the input object is opened.
pub fn validate_csv<S>(event: &StepEvent, store: &S, retry: &RetryPolicy) -> Result<StepData>
where
    S: ObjectStore + ?Sized,
{
    let span = tracing::info_span!(
        "validate_csv",
        execution_name = %event.execution_name,
        task = %event.task,
    );
    let _guard = span.enter();

    let config = CsvStepConfig::from_task_config(&event.task_config)?;
    let step_data = event.step_data();
    tracing::info!(
        header_row = config.header_row,
        delimiter = %config.delimiter,
        quote = %config.quote,
        gzipped = config.gzipped,
        output_prefix = ?event.payload.output_dataset.s3_prefix,
        "validating CSV input"
    );

    let Some(schema) = config.schema.as_ref() else {
        tracing::info!("no schema provided for validation");
        return Ok(step_data.finished(Status::ValidationSuccess, Vec::new()));
    };

    let validator = JsonSchemaValidator::new(schema)?;
    let prefix = first_s3_prefix(step_data)?;
    let (key, body) = open_first_object(store, prefix, retry)?;
    let gzipped = config.gzipped || key.ends_with(".gz");

    let lines = LineReader::new(body, gzipped)?;
    let mut records = CsvRecords::new(lines, config.dialect()?);
    let header = if config.header_row {
        match records.next().transpose()? {
            Some(header) => Some(header),
            None => return Ok(finish(step_data, &[ValidationError::root(MISSING_HEADER)])),
        }
    } else {
        None
    };

    let rows = match parse_csv(records, schema, header.as_deref())? {
        RowsOutcome::Parsed(rows) => rows,
        RowsOutcome::Rejected(errors) => {
            tracing::info!(errors = errors.len(), "rows do not match column types");
            return Ok(finish(step_data, &errors));
        }
    };
    if rows.is_empty() {
        return Ok(finish(step_data, &[ValidationError::root(NO_DATA_ROWS)]));
    }
    tracing::debug!(rows = rows.len(), "parsed input rows");

    let data: Value = rows.to_json();
    let errors = validator.validate(&data);
    Ok(finish(step_data, &errors))
}
