//! Step configuration read from the effective task config.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use pipeline_ingest::CsvDialect;

use crate::error::{Result, StepError};

/// Configuration of the CSV validation step.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CsvStepConfig {
    /// Schema document; `None` disables validation.
    #[serde(deserialize_with = "deserialize_schema")]
    pub schema: Option<Value>,
    /// Whether the first record names the columns.
    pub header_row: bool,
    pub delimiter: String,
    pub quote: String,
    /// Force decompression. Keys ending in `.gz` are always decompressed.
    pub gzipped: bool,
}

impl Default for CsvStepConfig {
    fn default() -> Self {
        Self {
            schema: None,
            header_row: true,
            delimiter: ",".to_string(),
            quote: "\"".to_string(),
            gzipped: false,
        }
    }
}

impl CsvStepConfig {
    /// Read and check the config; a bad delimiter or quote fails here.
    pub fn from_task_config(task_config: &Map<String, Value>) -> Result<Self> {
        let config: Self = from_map(task_config)?;
        config.dialect()?;
        Ok(config)
    }

    pub fn dialect(&self) -> Result<CsvDialect> {
        Ok(CsvDialect::new(&self.delimiter, &self.quote)?)
    }
}

/// Configuration of the JSON validation step.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct JsonStepConfig {
    #[serde(deserialize_with = "deserialize_schema")]
    pub schema: Option<Value>,
}

impl JsonStepConfig {
    pub fn from_task_config(task_config: &Map<String, Value>) -> Result<Self> {
        from_map(task_config)
    }
}

fn from_map<T: for<'de> Deserialize<'de>>(task_config: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(task_config.clone()))
        .map_err(|err| StepError::InvalidConfig(err.to_string()))
}

/// The schema may be an object or a JSON-encoded string. `null`, `""` and
/// `{}` all mean "no schema".
fn deserialize_schema<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let schema = match raw {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => serde_json::from_str(&text)
            .map_err(|err| D::Error::custom(format!("schema is not valid JSON: {err}")))?,
        Some(other) => other,
    };
    match schema {
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(map) => Ok(Some(Value::Object(map))),
        other => Err(D::Error::custom(format!(
            "schema must be a JSON object, got {other}"
        ))),
    }
}
