//! Streaming ingestion for the CSV validation step.
//!
//! Data flows one way and is pulled on demand:
//!
//! ```text
//! byte chunks -> LineReader -> CsvRecords -> parse_csv -> RowsOutcome
//! ```
//!
//! [`LineReader`] optionally decompresses the byte source and yields complete
//! UTF-8 lines, [`CsvRecords`] splits those lines into fields using the
//! configured dialect, and [`parse_csv`] converts fields into typed, sparse
//! records while collecting per-cell errors.

pub mod dialect;
pub mod error;
pub mod lines;
pub mod parser;
pub mod schema;

pub use dialect::{CsvDialect, CsvRecords};
pub use error::{IngestError, Result};
pub use lines::{ChunkSource, DEFAULT_CHUNK_SIZE, LineReader};
pub use parser::{
    CellError, CellValue, ParsedRow, ParsedRows, RowsOutcome, parse_csv, parse_records,
    parse_value,
};
pub use schema::{ColumnSchema, ColumnSpec, ColumnType};
