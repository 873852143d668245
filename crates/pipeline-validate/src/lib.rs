//! JSON Schema validation of parsed records.

pub mod error;
pub mod formats;
pub mod iso8601;
pub mod validator;

pub use error::{Result, SchemaError};
pub use formats::{is_date_time, is_year};
pub use iso8601::{DateTimeError, IsoDateTime, parse_isodatetime};
pub use validator::{JsonSchemaValidator, SUPPORTED_SCHEMA_VERSIONS};
