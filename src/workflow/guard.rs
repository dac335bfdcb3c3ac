use super::WorkflowError;

/// True when `value` has visible content and at most `max_chars` characters.
pub fn field_fits(value: &str, max_chars: usize) -> bool {
    !value.trim().is_empty() && value.chars().count() <= max_chars
}

/// Trims a free-text identifier, rejecting one that is blank.
pub fn required_field(value: &str) -> Result<&str, WorkflowError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(WorkflowError::InvalidField);
    }
    Ok(value)
}

/// Ordered list of guard predicates. The first one that does not hold decides
/// the outcome; predicates after it are never evaluated.
#[must_use]
#[derive(Debug, Default)]
pub struct GuardChain {
    failure: Option<WorkflowError>,
}

impl GuardChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(self, holds: impl FnOnce() -> bool, failure: WorkflowError) -> Self {
        if self.failure.is_some() || holds() {
            self
        } else {
            Self {
                failure: Some(failure),
            }
        }
    }

    /// Like [`require`](Self::require) but only checked when `applies` is true.
    pub fn require_if(
        self,
        applies: bool,
        holds: impl FnOnce() -> bool,
        failure: WorkflowError,
    ) -> Self {
        if applies {
            self.require(holds, failure)
        } else {
            self
        }
    }

    pub fn evaluate(self) -> Result<(), WorkflowError> {
        match self.failure {
            Some(failure) => {
                tracing::debug!(code = failure.code(), "guard rejected operation");
                Err(failure)
            }
            None => Ok(()),
        }
    }
}
