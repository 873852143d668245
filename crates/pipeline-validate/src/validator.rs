//! Draft-07 JSON Schema validation with position-tagged errors.

use std::fmt;

use serde_json::Value;

use pipeline_model::{RowRef, ValidationError};

use crate::error::{Result, SchemaError};
use crate::formats::{is_date_time, is_year};

/// `$schema` values a validator can be built for.
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["http://json-schema.org/draft-07/schema#"];

/// A compiled schema.
///
/// Content problems in validated documents are returned as
/// [`ValidationError`]s; only an unusable schema is an error.
pub struct JsonSchemaValidator {
    validator: jsonschema::Validator,
}

impl fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaValidator").finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Compile `schema`.
    ///
    /// The document must declare a supported `$schema` and be valid against
    /// its meta-schema.
    pub fn new(schema: &Value) -> Result<Self> {
        let version = schema_version(schema)?;
        tracing::debug!(schema_version = version, "building schema validator");

        let validator = jsonschema::draft7::options()
            .should_validate_formats(true)
            .with_format("date-time", is_date_time)
            .with_format("year", is_year)
            .build(schema)
            .map_err(|err| SchemaError::InvalidSchema {
                message: err.to_string(),
            })?;
        Ok(Self { validator })
    }

    /// Validate one document.
    ///
    /// Each error is tagged with the first two segments of its location: the
    /// record (`row`) and the field inside it (`column`). Errors about the
    /// document itself have `row: "root"`.
    pub fn validate(&self, data: &Value) -> Vec<ValidationError> {
        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(data)
            .map(|err| locate(data, &err.instance_path.to_string(), err.to_string()))
            .collect();
        tracing::debug!(errors = errors.len(), "validated document");
        errors
    }

    /// Validate each document on its own; errors are concatenated in order.
    pub fn validate_list(&self, documents: &[Value]) -> Vec<ValidationError> {
        documents
            .iter()
            .flat_map(|document| self.validate(document))
            .collect()
    }
}

fn schema_version(schema: &Value) -> Result<&str> {
    let version = schema.get("$schema").ok_or(SchemaError::MissingVersion)?;
    match version.as_str() {
        Some(version) if SUPPORTED_SCHEMA_VERSIONS.contains(&version) => Ok(version),
        Some(version) => Err(SchemaError::UnsupportedVersion {
            version: version.to_string(),
        }),
        None => Err(SchemaError::UnsupportedVersion {
            version: version.to_string(),
        }),
    }
}

/// Map a JSON pointer into `data` to a row/column position.
fn locate(data: &Value, pointer: &str, message: String) -> ValidationError {
    let mut segments = pointer.split('/').skip(1).map(unescape);
    let Some(first) = segments.next() else {
        return ValidationError::root(message);
    };

    let row = match (data, first.parse::<usize>()) {
        (Value::Array(_), Ok(index)) => RowRef::Index(index),
        _ => RowRef::Key(first),
    };
    ValidationError {
        row,
        column: segments.next(),
        message,
    }
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}
