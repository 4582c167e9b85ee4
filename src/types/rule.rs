use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A localized, human-readable description of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub lang: String,
    pub desc: String,
}

/// A single business rule, as published in the DCC business-rule format.
///
/// Only [`identifier`](Self::identifier) and [`logic`](Self::logic) are
/// required. Everything else is descriptive metadata that evaluation never
/// inspects; unknown keys are kept in [`extra`](Self::extra) so they survive
/// a round trip to presentation.
///
/// The logic expression is an opaque JSON tree. It is handed verbatim to a
/// [`LogicEvaluator`](crate::LogicEvaluator) and never pattern-matched here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Rule {
    pub identifier: String,

    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<Description>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affected_fields: Vec<String>,

    pub logic: Value,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Rule {
    /// Create a rule with the given identifier and logic expression and no metadata.
    #[must_use]
    pub fn new(identifier: impl Into<String>, logic: Value) -> Self {
        Self {
            identifier: identifier.into(),
            rule_type: None,
            country: None,
            version: None,
            schema_version: None,
            engine: None,
            engine_version: None,
            certificate_type: None,
            description: Vec::new(),
            valid_from: None,
            valid_to: None,
            affected_fields: Vec::new(),
            logic,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, lang: impl Into<String>, desc: impl Into<String>) -> Self {
        self.description.push(Description {
            lang: lang.into(),
            desc: desc.into(),
        });
        self
    }

    #[must_use]
    pub fn with_affected_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The description in the given language, falling back to the first one.
    #[must_use]
    pub fn description_in(&self, lang: &str) -> Option<&str> {
        self.description
            .iter()
            .find(|d| d.lang == lang)
            .or_else(|| self.description.first())
            .map(|d| d.desc.as_str())
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description_in("en") {
            Some(desc) => write!(f, "{}: {desc}", self.identifier),
            None => write!(f, "{}", self.identifier),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn deserialize_full_record() {
        let rule: Rule = serde_json::from_value(json!({
            "Identifier": "VR-AT-0001",
            "Type": "Acceptance",
            "Country": "AT",
            "Version": "1.0.0",
            "SchemaVersion": "1.0.0",
            "Engine": "CERTLOGIC",
            "EngineVersion": "0.7.5",
            "CertificateType": "Vaccination",
            "Description": [{ "lang": "en", "desc": "Vaccine must be approved." }],
            "ValidFrom": "2021-07-01T00:00:00Z",
            "ValidTo": "2030-06-01T00:00:00Z",
            "AffectedFields": ["v.0", "v.0.mp"],
            "Logic": { "var": "payload.v.0.mp" }
        }))
        .unwrap();

        assert_eq!(rule.identifier, "VR-AT-0001");
        assert_eq!(rule.rule_type.as_deref(), Some("Acceptance"));
        assert_eq!(rule.engine_version.as_deref(), Some("0.7.5"));
        assert_eq!(rule.affected_fields, vec!["v.0", "v.0.mp"]);
        assert_eq!(rule.logic, json!({ "var": "payload.v.0.mp" }));
        assert!(rule.extra.is_empty());
    }

    #[test]
    fn metadata_is_optional() {
        let rule: Rule = serde_json::from_value(json!({
            "Identifier": "R",
            "Logic": true
        }))
        .unwrap();
        assert_eq!(rule, Rule::new("R", json!(true)));
    }

    #[test]
    fn missing_logic_is_rejected() {
        let err = serde_json::from_value::<Rule>(json!({ "Identifier": "R" })).unwrap_err();
        assert!(err.to_string().contains("Logic"));
    }

    #[test]
    fn unknown_keys_pass_through() {
        let rule: Rule = serde_json::from_value(json!({
            "Identifier": "R",
            "Logic": true,
            "Region": "north"
        }))
        .unwrap();
        assert_eq!(rule.extra.get("Region"), Some(&json!("north")));

        let back = serde_json::to_value(&rule).unwrap();
        assert_eq!(back["Region"], json!("north"));
    }

    #[test]
    fn description_lookup_falls_back_to_first() {
        let rule = Rule::new("R", json!(true))
            .with_description("de", "Impfstoff")
            .with_description("en", "Vaccine");
        assert_eq!(rule.description_in("en"), Some("Vaccine"));
        assert_eq!(rule.description_in("fr"), Some("Impfstoff"));
        assert_eq!(rule.to_string(), "R: Vaccine");
    }
}
