use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal status of a validation step.
///
/// A validation call starts as `Pending` and ends in exactly one of the two
/// terminal states; there are no intermediate states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    ValidationSuccess,
    ValidationFailed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::ValidationSuccess => "VALIDATION_SUCCESS",
            Status::ValidationFailed => "VALIDATION_FAILED",
        }
    }

    /// Outcome for a finished validation with `error_count` findings.
    pub fn from_error_count(error_count: usize) -> Self {
        if error_count == 0 {
            Status::ValidationSuccess
        } else {
            Status::ValidationFailed
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Status::ValidationSuccess)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
