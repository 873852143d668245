//! Step contract types for the tabular validation pipeline.
//!
//! Every step receives a [`StepEvent`] and answers with a [`StepData`]. The
//! record types in [`records`] are the position-tagged errors carried in the
//! `errors` field of the answer.

pub mod error;
pub mod records;
pub mod status;
pub mod step;

pub use error::{ModelError, Result};
pub use records::{ParseError, RowRef, ValidationError};
pub use status::Status;
pub use step::{OutputDataset, Payload, Pipeline, StepData, StepEvent, StepInput};
