//! Column types derived from a JSON Schema document.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Primitive type a raw cell is converted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Null,
    Integer,
    Number,
    Boolean,
    /// `string`, a type list, or anything unrecognised: kept verbatim.
    Text,
}

impl ColumnType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "null" => ColumnType::Null,
            "integer" => ColumnType::Integer,
            "number" => ColumnType::Number,
            "boolean" => ColumnType::Boolean,
            _ => ColumnType::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Null => "null",
            ColumnType::Integer => "integer",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "string",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub column_type: ColumnType,
}

/// Column name to type mapping taken from `items.properties`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    columns: BTreeMap<String, ColumnSpec>,
}

impl ColumnSchema {
    /// Read the row schema of an array-of-objects schema document.
    ///
    /// Returns `None` when the document has no `items.properties` object, in
    /// which case rows are not typed at all.
    pub fn from_schema(schema: &Value) -> Option<Self> {
        let properties = schema.get("items")?.get("properties")?.as_object()?;
        let columns = properties
            .iter()
            .map(|(name, property)| (name.clone(), column_spec(property)))
            .collect();
        Some(Self { columns })
    }

    pub fn get(&self, column: &str) -> Option<&ColumnSpec> {
        self.columns.get(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn column_spec(property: &Value) -> ColumnSpec {
    let column_type = property
        .get("type")
        .and_then(Value::as_str)
        .map_or(ColumnType::Text, ColumnType::from_tag);
    ColumnSpec { column_type }
}
