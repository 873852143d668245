//! Position-tagged error records returned in a step's `errors` list.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker used for errors that concern a whole document rather than a record.
pub const ROOT_ROW: &str = "root";

/// A cell that could not be converted to its column type.
///
/// Collected while parsing; one bad cell never aborts the rest of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    /// Zero-based data row index (the header row is not counted).
    pub row: usize,
    pub column: String,
    pub message: String,
}

impl ParseError {
    pub fn new(row: usize, column: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            column: column.into(),
            message: message.into(),
        }
    }
}

/// Identifies the record a validation error belongs to.
///
/// Array positions serialize as integers and object keys as strings, so the
/// JSON shape matches the location inside the validated document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RowRef {
    Index(usize),
    Key(String),
}

impl RowRef {
    pub fn root() -> Self {
        RowRef::Key(ROOT_ROW.to_string())
    }

    pub fn is_root(&self) -> bool {
        matches!(self, RowRef::Key(key) if key == ROOT_ROW)
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRef::Index(index) => write!(f, "{index}"),
            RowRef::Key(key) => f.write_str(key),
        }
    }
}

/// A schema violation found while validating parsed records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub row: RowRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub message: String,
}

impl ValidationError {
    /// Error about the document as a whole.
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            row: RowRef::root(),
            column: None,
            message: message.into(),
        }
    }
}
