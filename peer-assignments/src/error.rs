use thiserror::Error;

/// Errors raised while loading tables or generating assignments.
///
/// Slots that end up without a class are not errors; they are reported as
/// [`Outcome::NoClass`](crate::schedule::Outcome::NoClass) or
/// [`Outcome::NoEligible`](crate::schedule::Outcome::NoEligible).
#[derive(Error, Debug)]
pub enum AssignError {
    /// A required table, sheet or column is missing, or a setting is invalid.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Nothing to assign within one scope (a day or the whole week).
    #[error("empty input for {scope}: {reason}")]
    EmptyInput { scope: String, reason: String },

    /// A day value outside Monday..Sunday where day ordering is required.
    #[error("invalid day value: {0:?}")]
    InvalidDay(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AssignError {
    pub fn empty_input(scope: impl Into<String>, reason: impl Into<String>) -> Self {
        AssignError::EmptyInput {
            scope: scope.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that only invalidate a single scope of a batch.
    pub fn is_scope_local(&self) -> bool {
        matches!(self, AssignError::EmptyInput { .. })
    }
}

pub type AssignResult<T> = Result<T, AssignError>;
