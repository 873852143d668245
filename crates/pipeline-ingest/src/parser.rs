//! Typed CSV row parsing.
//!
//! Converts raw string fields into typed, sparse records according to a
//! [`ColumnSchema`]. Conversion failures are collected per cell; a batch with
//! any failure is rejected as a whole with the complete error list.

use std::collections::BTreeMap;
use std::convert::Infallible;

use serde_json::{Map, Number, Value};
use thiserror::Error;

use pipeline_model::ParseError;

use crate::error::Result;
use crate::schema::{ColumnSchema, ColumnType};

/// A converted cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    /// Exact for anything that fits `i64` or `u64`; wider values are kept as
    /// the nearest float.
    Integer(Number),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Integer(n) => Value::Number(n.clone()),
            CellValue::Number(n) => Number::from_f64(*n).map_or(Value::Null, Value::Number),
            CellValue::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Column key to value. Empty input cells have no entry.
pub type ParsedRow = BTreeMap<String, CellValue>;

/// Rows produced by a successful parse, in input order.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedRows {
    Typed(Vec<ParsedRow>),
    /// The schema has no row properties; fields are returned verbatim.
    Raw(Vec<Vec<String>>),
}

impl ParsedRows {
    pub fn len(&self) -> usize {
        match self {
            ParsedRows::Typed(rows) => rows.len(),
            ParsedRows::Raw(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// JSON array handed to schema validation.
    pub fn to_json(&self) -> Value {
        match self {
            ParsedRows::Typed(rows) => Value::Array(
                rows.iter()
                    .map(|row| {
                        Value::Object(
                            row.iter()
                                .map(|(key, cell)| (key.clone(), cell.to_json()))
                                .collect::<Map<_, _>>(),
                        )
                    })
                    .collect(),
            ),
            ParsedRows::Raw(rows) => Value::Array(
                rows.iter()
                    .map(|row| Value::Array(row.iter().cloned().map(Value::String).collect()))
                    .collect(),
            ),
        }
    }
}

/// Result of parsing a batch: every row, or every cell error.
#[derive(Debug, Clone, PartialEq)]
pub enum RowsOutcome {
    Parsed(ParsedRows),
    /// Never empty.
    Rejected(Vec<ParseError>),
}

impl RowsOutcome {
    pub fn into_result(self) -> std::result::Result<ParsedRows, Vec<ParseError>> {
        match self {
            RowsOutcome::Parsed(rows) => Ok(rows),
            RowsOutcome::Rejected(errors) => Err(errors),
        }
    }
}

/// A raw value that does not fit its column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CellError {
    message: String,
}

impl CellError {
    fn new(message: String) -> Self {
        Self { message }
    }
}

/// Convert one raw cell to `column_type`.
///
/// - `null`: only the literal `null`.
/// - `integer`: base-10 integer.
/// - `number`: the last `,` is read as a decimal point, so `1,5` is `1.5`.
/// - `boolean`: only the literals `true` and `false`.
/// - anything else: the raw string.
pub fn parse_value(value: &str, column_type: ColumnType) -> std::result::Result<CellValue, CellError> {
    match column_type {
        ColumnType::Null => {
            if value == "null" {
                Ok(CellValue::Null)
            } else {
                Err(CellError::new(format!(
                    "Null must be \"null\" but was \"{value}\""
                )))
            }
        }
        ColumnType::Integer => parse_integer(value.trim())
            .map(CellValue::Integer)
            .ok_or_else(|| {
                CellError::new(format!(
                    "invalid literal for integer with base 10: '{value}'"
                ))
            }),
        ColumnType::Number => {
            let normalized = match value.rsplit_once(',') {
                Some((head, tail)) => format!("{head}.{tail}"),
                None => value.to_string(),
            };
            match normalized.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => Ok(CellValue::Number(number)),
                _ => Err(CellError::new(format!(
                    "could not convert string to float: '{normalized}'"
                ))),
            }
        }
        ColumnType::Boolean => match value {
            "true" => Ok(CellValue::Bool(true)),
            "false" => Ok(CellValue::Bool(false)),
            _ => Err(CellError::new(format!(
                "Boolean must be \"true\" or \"false\" but was \"{value}\""
            ))),
        },
        ColumnType::Text => Ok(CellValue::Text(value.to_string())),
    }
}

/// Base-10 integer of any width.
fn parse_integer(value: &str) -> Option<Number> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n.into());
    }
    if let Ok(n) = value.parse::<u64>() {
        return Some(n.into());
    }
    let digits = value.strip_prefix(['+', '-']).unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse::<f64>().ok().and_then(Number::from_f64)
}

/// Parse CSV records against a schema document.
///
/// Rows are typed when `schema` has `items.properties`; otherwise they are
/// passed through unchanged. With a header, cells are keyed by the trimmed
/// header name, else by their zero-based column index. Structural errors
/// from `rows` abort immediately.
pub fn parse_csv<I>(rows: I, schema: &Value, header: Option<&[String]>) -> Result<RowsOutcome>
where
    I: IntoIterator<Item = Result<Vec<String>>>,
{
    parse_rows(rows, schema, header)
}

/// [`parse_csv`] for rows already in memory.
pub fn parse_records<I>(rows: I, schema: &Value, header: Option<&[String]>) -> RowsOutcome
where
    I: IntoIterator<Item = Vec<String>>,
{
    let rows = rows.into_iter().map(Ok::<_, Infallible>);
    match parse_rows(rows, schema, header) {
        Ok(outcome) => outcome,
        Err(never) => match never {},
    }
}

fn parse_rows<I, E>(
    rows: I,
    schema: &Value,
    header: Option<&[String]>,
) -> std::result::Result<RowsOutcome, E>
where
    I: IntoIterator<Item = std::result::Result<Vec<String>, E>>,
{
    let Some(columns) = ColumnSchema::from_schema(schema) else {
        let rows = rows.into_iter().collect::<std::result::Result<Vec<_>, E>>()?;
        tracing::debug!(rows = rows.len(), "schema has no row properties, passing rows through");
        return Ok(RowsOutcome::Parsed(ParsedRows::Raw(rows)));
    };

    let header: Option<Vec<String>> = header
        .filter(|names| !names.is_empty())
        .map(|names| names.iter().map(|name| name.trim().to_string()).collect());

    let mut errors = Vec::new();
    let mut data = Vec::new();
    for (row_index, row) in rows.into_iter().enumerate() {
        let row = row?;
        let mut record = ParsedRow::new();

        for (col_index, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let key = header
                .as_ref()
                .and_then(|names| names.get(col_index).cloned())
                .unwrap_or_else(|| col_index.to_string());

            let Some(spec) = columns.get(&key) else {
                let message = format!("Unexpected header: '{key}'");
                errors.push(ParseError::new(row_index, key, message));
                continue;
            };
            match parse_value(value, spec.column_type) {
                Ok(cell) => {
                    record.insert(key, cell);
                }
                Err(err) => errors.push(ParseError::new(row_index, key, err.to_string())),
            }
        }

        // Once the batch is rejected the records are never returned.
        if errors.is_empty() {
            data.push(record);
        }
    }

    if errors.is_empty() {
        tracing::debug!(rows = data.len(), columns = columns.len(), "parsed typed rows");
        Ok(RowsOutcome::Parsed(ParsedRows::Typed(data)))
    } else {
        tracing::debug!(errors = errors.len(), "rejected rows with parse errors");
        Ok(RowsOutcome::Rejected(errors))
    }
}
