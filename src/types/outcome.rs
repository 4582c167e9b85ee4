use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::EvaluationError;

/// The result of evaluating one rule's logic expression.
///
/// Only [`Satisfied`](Self::Satisfied) counts towards a rule set's
/// conjunction. A successful evaluation that yields something other than a
/// boolean is kept verbatim in [`NonBoolean`](Self::NonBoolean) for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RuleOutcome {
    /// The expression evaluated to `true`.
    Satisfied,
    /// The expression evaluated to `false`.
    Violated,
    /// The expression evaluated to a value that is not a boolean.
    NonBoolean(Value),
    /// Evaluation raised a fault; holds the message shown to the user.
    EvaluationError(String),
}

/// The three visually distinct states a rule can be displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    Satisfied,
    Violated,
    Errored,
}

impl RuleOutcome {
    /// Classify a successful evaluation result without coercing it.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Bool(true) => RuleOutcome::Satisfied,
            Value::Bool(false) => RuleOutcome::Violated,
            other => RuleOutcome::NonBoolean(other),
        }
    }

    /// Wrap an evaluation fault, formatting the message for display.
    pub fn from_error(err: &EvaluationError) -> Self {
        RuleOutcome::EvaluationError(format!(
            "Error occurred during evaluation: {}.",
            err.message()
        ))
    }

    /// Whether this outcome satisfies the rule set's conjunction.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RuleOutcome::Satisfied)
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, RuleOutcome::EvaluationError(_))
    }

    /// Non-boolean results display as violated: they never satisfy a rule.
    #[must_use]
    pub fn status(&self) -> OutcomeStatus {
        match self {
            RuleOutcome::Satisfied => OutcomeStatus::Satisfied,
            RuleOutcome::Violated | RuleOutcome::NonBoolean(_) => OutcomeStatus::Violated,
            RuleOutcome::EvaluationError(_) => OutcomeStatus::Errored,
        }
    }

    /// The evaluated value, or `None` for an errored rule.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        match self {
            RuleOutcome::Satisfied => Some(Value::Bool(true)),
            RuleOutcome::Violated => Some(Value::Bool(false)),
            RuleOutcome::NonBoolean(v) => Some(v.clone()),
            RuleOutcome::EvaluationError(_) => None,
        }
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        match self {
            RuleOutcome::EvaluationError(message) => Some(message),
            _ => None,
        }
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOutcome::Satisfied => write!(f, "true"),
            RuleOutcome::Violated => write!(f, "false"),
            RuleOutcome::NonBoolean(v) => write!(f, "{v}"),
            RuleOutcome::EvaluationError(message) => write!(f, "{message}"),
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeStatus::Satisfied => write!(f, "satisfied"),
            OutcomeStatus::Violated => write!(f, "violated"),
            OutcomeStatus::Errored => write!(f, "errored"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn from_value_classifies_without_coercion() {
        assert_eq!(RuleOutcome::from_value(json!(true)), RuleOutcome::Satisfied);
        assert_eq!(RuleOutcome::from_value(json!(false)), RuleOutcome::Violated);
        assert_eq!(
            RuleOutcome::from_value(json!(1)),
            RuleOutcome::NonBoolean(json!(1))
        );
        assert_eq!(
            RuleOutcome::from_value(json!(null)),
            RuleOutcome::NonBoolean(json!(null))
        );
    }

    #[test]
    fn from_error_formats_message() {
        let outcome = RuleOutcome::from_error(&EvaluationError::new("boom"));
        assert_eq!(
            outcome,
            RuleOutcome::EvaluationError("Error occurred during evaluation: boom.".into())
        );
        assert_eq!(
            outcome.error_message(),
            Some("Error occurred during evaluation: boom.")
        );
        assert!(outcome.is_error());
    }

    #[test]
    fn only_satisfied_is_satisfied() {
        assert!(RuleOutcome::Satisfied.is_satisfied());
        assert!(!RuleOutcome::Violated.is_satisfied());
        assert!(!RuleOutcome::NonBoolean(json!("yes")).is_satisfied());
        assert!(!RuleOutcome::EvaluationError("x".into()).is_satisfied());
    }

    #[test]
    fn status() {
        assert_eq!(RuleOutcome::Satisfied.status(), OutcomeStatus::Satisfied);
        assert_eq!(RuleOutcome::Violated.status(), OutcomeStatus::Violated);
        assert_eq!(
            RuleOutcome::NonBoolean(json!(3)).status(),
            OutcomeStatus::Violated
        );
        assert_eq!(
            RuleOutcome::EvaluationError("x".into()).status(),
            OutcomeStatus::Errored
        );
    }

    #[test]
    fn display() {
        assert_eq!(RuleOutcome::Satisfied.to_string(), "true");
        assert_eq!(RuleOutcome::Violated.to_string(), "false");
        assert_eq!(RuleOutcome::NonBoolean(json!("x")).to_string(), "\"x\"");
        assert_eq!(
            RuleOutcome::EvaluationError("bad".into()).to_string(),
            "bad"
        );
    }

    #[test]
    fn serialized_shape() {
        assert_eq!(
            serde_json::to_value(RuleOutcome::Satisfied).unwrap(),
            json!({ "status": "satisfied" })
        );
        assert_eq!(
            serde_json::to_value(RuleOutcome::NonBoolean(json!(7))).unwrap(),
            json!({ "status": "non_boolean", "value": 7 })
        );
        assert_eq!(
            serde_json::to_value(RuleOutcome::EvaluationError("m".into())).unwrap(),
            json!({ "status": "evaluation_error", "value": "m" })
        );
    }
}
