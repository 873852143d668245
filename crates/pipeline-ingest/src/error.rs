//! Error types for streaming ingestion.

use std::string::FromUtf8Error;

use thiserror::Error;

/// Structural failures: the input cannot be read at all.
///
/// Cell-level conversion problems are not errors of this type; they are
/// collected as [`pipeline_model::ParseError`] records instead.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Reading from the underlying byte source failed.
    #[error("failed to read input stream: {source}")]
    Read {
        #[source]
        source: std::io::Error,
    },

    /// The gzip or zlib stream is corrupt.
    #[error("failed to decompress input stream: {source}")]
    Decompress {
        #[source]
        source: std::io::Error,
    },

    /// A line is not valid UTF-8.
    #[error("line {line} is not valid UTF-8: {source}")]
    Utf8 {
        line: usize,
        #[source]
        source: FromUtf8Error,
    },

    /// The CSV reader rejected a record.
    #[error("failed to read CSV record: {source}")]
    Csv {
        #[source]
        source: csv::Error,
    },

    /// Delimiter or quote character is not a single ASCII character.
    #[error("{field} must be a 1-character string: {value:?}")]
    InvalidDialect { field: &'static str, value: String },
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
