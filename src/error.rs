use std::path::PathBuf;

use thiserror::Error;

/// Unified error type covering loading, parsing and parameter handling.
///
/// Returned by loaders like [`RuleSets::from_file()`](crate::RuleSets::from_file)
/// and [`ValueSets::from_json()`](crate::ValueSets::from_json). Evaluation
/// itself never fails with this type: per-rule faults are reported through
/// [`RuleOutcome`](crate::RuleOutcome).
#[derive(Debug, Error)]
pub enum CrosscheckError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid external parameter '{input}': expected NAME=VALUE")]
    InvalidParameter { input: String },

    #[error("invalid validation clock '{value}': {source}")]
    InvalidClock {
        value: String,
        source: chrono::ParseError,
    },

    #[error("no rule '{rule}' in any rule set")]
    UnknownRule { rule: String },
}

impl CrosscheckError {
    /// A failed read of the file at `path`.
    #[must_use]
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CrosscheckError::Read {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_message() {
        let err: CrosscheckError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("invalid JSON: EOF while parsing"));
    }

    #[test]
    fn read_message() {
        let err = CrosscheckError::read(
            "rules.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "failed to read 'rules.json': not found");
    }

    #[test]
    fn invalid_parameter_message() {
        let err = CrosscheckError::InvalidParameter {
            input: "validationClock".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid external parameter 'validationClock': expected NAME=VALUE"
        );
    }

    #[test]
    fn unknown_rule_message() {
        let err = CrosscheckError::UnknownRule {
            rule: "VR-XX-9999".into(),
        };
        assert_eq!(err.to_string(), "no rule 'VR-XX-9999' in any rule set");
    }
}
