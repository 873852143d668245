use thiserror::Error;

/// Errors raised while reading or building step contract values.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Both input references were populated.
    #[error("can only set values for one of 's3_input_prefixes' or 'input_events'")]
    BothInputs,

    /// Neither input reference was populated.
    #[error("either 's3_input_prefixes' or 'input_events' must be assigned a value")]
    NoInput,

    /// The step event did not match the expected shape.
    #[error("malformed step event: {0}")]
    MalformedEvent(#[from] serde_json::Error),

    /// A field was present but had the wrong shape.
    #[error("invalid value for '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
