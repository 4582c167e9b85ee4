use thiserror::Error;

/// A fault raised by a [`LogicEvaluator`](crate::LogicEvaluator) while
/// evaluating one rule's logic expression.
///
/// Only the human-readable message is kept; it becomes the text of an
/// [`RuleOutcome::EvaluationError`](crate::RuleOutcome::EvaluationError).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct EvaluationError {
    message: String,
}

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_displayed_verbatim() {
        let err = EvaluationError::new("unrecognised operator: \"xor\"");
        assert_eq!(err.to_string(), "unrecognised operator: \"xor\"");
        assert_eq!(err.message(), "unrecognised operator: \"xor\"");
    }
}
