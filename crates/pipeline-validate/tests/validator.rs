//! Schema validation of parsed CSV rows and JSON documents.

use serde_json::{Value, json};

use pipeline_ingest::parse_records;
use pipeline_model::{RowRef, ValidationError};
use pipeline_validate::{JsonSchemaValidator, SchemaError};

fn dates_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "id": {"type": "integer"},
                "year": {"type": "string", "format": "year"},
                "date": {"type": "string", "format": "date"},
                "datetime": {"type": "string", "format": "date-time"}
            },
            "required": ["id", "year", "date", "datetime"]
        }
    })
}

fn dates_header() -> Vec<String> {
    ["id", "year", "date", "datetime"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn record_schema() -> Value {
    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": {
            "id": {"type": "string"},
            "year": {"type": "string", "format": "year"},
            "date": {"type": "string", "format": "date"},
            "datetime": {"type": "string", "format": "date-time"}
        },
        "required": ["id", "year", "date", "datetime"]
    })
}

/// Parse one CSV row against the dates schema and validate the result.
fn validate_row(cells: [&str; 4]) -> Vec<ValidationError> {
    let schema = dates_schema();
    let header = dates_header();
    let rows = vec![cells.iter().map(|s| s.to_string()).collect()];
    let parsed = parse_records(rows, &schema, Some(&header))
        .into_result()
        .expect("row parses");
    JsonSchemaValidator::new(&schema)
        .expect("schema compiles")
        .validate(&parsed.to_json())
}

#[test]
fn correct_dates_pass() {
    for datetime in [
        "2020-01-01T12:01:01",
        "2020-01-01 12:01:01",
        "2020-12-01T12-01",
        "0009-12-01T12:01:01",
        "2020-12-12T12:01:01",
    ] {
        let errors = validate_row(["1", "2020", "2020-01-01", datetime]);
        assert!(errors.is_empty(), "{datetime}: {errors:?}");
    }
}

#[test]
fn incorrect_date_time_is_reported_with_position() {
    for datetime in ["2020-13-01T12:01:01", "2020 12 32T12:01:01", "garbish data"] {
        let errors = validate_row(["1", "2020", "2020-12-30", datetime]);
        assert_eq!(errors.len(), 1, "{datetime}: {errors:?}");
        assert_eq!(errors[0].row, RowRef::Index(0));
        assert_eq!(errors[0].column.as_deref(), Some("datetime"));
    }
}

#[test]
fn incorrect_date_column() {
    let errors = validate_row(["1", "2020", "garbish data", "2020-01-01T12:01:01"]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].column.as_deref(), Some("date"));
}

#[test]
fn year_column() {
    for year in ["2020", "-100", "9999"] {
        assert!(validate_row(["1", year, "2020-12-30", "2020-12-01T12:01:01"]).is_empty());
    }
    // An empty cell is omitted by the parser and trips `required`.
    for year in ["abc", ""] {
        let errors = validate_row(["1", year, "2020-12-30", "2020-12-01T12:01:01"]);
        assert_eq!(errors.len(), 1, "{year:?}: {errors:?}");
        assert_eq!(errors[0].row, RowRef::Index(0));
    }
}

#[test]
fn unsupported_schema_version_fails_construction() {
    let mut schema = dates_schema();
    schema["$schema"] = json!("http://json-schema.org/draft-04/schema#");
    let err = JsonSchemaValidator::new(&schema).expect_err("unsupported");
    assert!(matches!(err, SchemaError::UnsupportedVersion { .. }));

    let err = JsonSchemaValidator::new(&json!({"type": "array"})).expect_err("missing");
    assert!(matches!(err, SchemaError::MissingVersion));
}

#[test]
fn malformed_schema_fails_construction() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "no-such-type"
    });
    let err = JsonSchemaValidator::new(&schema).expect_err("invalid schema");
    assert!(matches!(err, SchemaError::InvalidSchema { .. }));
}

#[test]
fn document_level_errors_use_root() {
    let validator = JsonSchemaValidator::new(&dates_schema()).expect("schema compiles");
    let errors = validator.validate(&json!({"not": "an array"}));
    assert_eq!(errors.len(), 1);
    assert!(errors[0].row.is_root());
    assert_eq!(errors[0].column, None);
}

#[test]
fn errors_keep_validator_order_across_rows() {
    let validator = JsonSchemaValidator::new(&dates_schema()).expect("schema compiles");
    let data = json!([
        {"id": 1, "year": "2020", "date": "2020-01-01", "datetime": "2020-01-01T12:01:01"},
        {"id": 2, "year": "abc", "date": "2020-01-01", "datetime": "2020-01-01T12:01:01"},
        {"id": 3, "year": "2020", "date": "2020-01-01", "datetime": "nope"}
    ]);
    let positions: Vec<_> = validator
        .validate(&data)
        .into_iter()
        .map(|err| (err.row, err.column))
        .collect();
    assert_eq!(
        positions,
        vec![
            (RowRef::Index(1), Some("year".to_string())),
            (RowRef::Index(2), Some("datetime".to_string())),
        ]
    );
}

#[test]
fn validate_list_over_documents() {
    let validator = JsonSchemaValidator::new(&record_schema()).expect("schema compiles");
    let valid = [
        json!({"id": "1", "year": "2020", "date": "2020-01-01", "datetime": "2020-01-01T12:01:01"}),
        json!({"id": "1", "year": "2020", "date": "2020-01-01", "datetime": "2020-12-01T12-01"}),
    ];
    assert!(validator.validate_list(&valid).is_empty());

    let invalid = [
        json!({"id": "1", "year": "2020", "date": "garbish data", "datetime": "2020-01-01T12:01:01"}),
        json!({"id": "2", "year": "2020", "date": "2020-01-01", "datetime": "garbish data"}),
    ];
    let errors = validator.validate_list(&invalid);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].row, RowRef::Key("date".to_string()));
    assert_eq!(errors[1].row, RowRef::Key("datetime".to_string()));
}

#[test]
fn validate_list_reports_only_the_incomplete_document() {
    let validator = JsonSchemaValidator::new(&record_schema()).expect("schema compiles");
    let documents = [
        json!({"id": "1", "year": "2020", "date": "2020-01-01", "datetime": "2020-01-01T12:01:01"}),
        json!({"id": "2", "year": "2020", "date": "2020-01-01"}),
    ];
    let errors = validator.validate_list(&documents);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].row.is_root());
    assert_eq!(errors[0].column, None);
    assert!(errors[0].message.contains("datetime"), "{}", errors[0].message);
}
