use thiserror::Error;

/// A schema document that cannot be used for validation.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema version not defined in schema")]
    MissingVersion,

    #[error("Schema version: {version} is not supported")]
    UnsupportedVersion { version: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
