//! Helpers for user-supplied JSON text.

use serde_json::Value;

use crate::CrosscheckError;

/// Parse JSON text, reporting why it isn't JSON when it fails.
///
/// # Errors
///
/// Returns [`CrosscheckError::Json`] with the parser's message.
pub fn parse(text: &str) -> Result<Value, CrosscheckError> {
    Ok(serde_json::from_str(text)?)
}

/// Render a value as JSON indented with two spaces.
#[must_use]
pub fn pretty(value: &Value) -> String {
    // Serializing a `Value` to a string cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_valid() {
        assert_eq!(parse(r#"{"dob": "1998-02-26"}"#).unwrap(), json!({ "dob": "1998-02-26" }));
    }

    #[test]
    fn parse_invalid_reports_position() {
        let err = parse("{\"dob\": }").unwrap_err();
        assert!(matches!(err, CrosscheckError::Json(_)));
        assert!(err.to_string().starts_with("invalid JSON: "));
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn pretty_uses_two_spaces() {
        assert_eq!(
            pretty(&json!({ "a": [1, 2] })),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }
}
