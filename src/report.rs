//! Presentation of evaluation results for a terminal or for machines.
//!
//! Colours follow [`colored`]'s global switch, so callers turn them off with
//! `colored::control::set_override(false)`.

use std::fmt;

use colored::{ColoredString, Colorize};

use crate::{
    json, CrosscheckError, EvaluationResults, ExternalParameters, OutcomeStatus, Rule, RuleOutcome,
};

const LABEL_WIDTH: usize = 16;

fn paint(text: &str, status: OutcomeStatus) -> ColoredString {
    match status {
        OutcomeStatus::Satisfied => text.green(),
        OutcomeStatus::Violated => text.red(),
        OutcomeStatus::Errored => text.yellow(),
    }
}

/// One line per rule set: the set id coloured by its verdict, then every
/// rule id coloured by its outcome.
///
/// ```text
/// AT: VR-AT-0000 VR-AT-0001 VR-AT-0002
/// NL: VR-NL-0000
/// ```
#[must_use]
pub fn results_text(results: &EvaluationResults) -> String {
    ResultsText(results).to_string()
}

/// The external parameters as a name/value table.
#[must_use]
pub fn parameters_text(params: &ExternalParameters) -> String {
    ParametersText(params).to_string()
}

/// Every field of a rule, its pretty-printed logic and its outcome.
#[must_use]
pub fn rule_detail(rule: &Rule, outcome: Option<&RuleOutcome>) -> String {
    RuleDetail { rule, outcome }.to_string()
}

struct ResultsText<'a>(&'a EvaluationResults);

impl fmt::Display for ResultsText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (rule_set_id, verdict) in self.0.iter() {
            let id = if verdict.all_satisfied() {
                rule_set_id.green()
            } else {
                rule_set_id.red()
            };
            write!(f, "{}:", id.bold())?;
            for (rule_id, outcome) in verdict.outcomes() {
                write!(f, " {}", paint(rule_id, outcome.status()))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

struct ParametersText<'a>(&'a ExternalParameters);

impl fmt::Display for ParametersText<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.0.iter() {
            match value {
                serde_json::Value::String(s) => row(f, name.dimmed(), s)?,
                other => row(f, name.dimmed(), other)?,
            }
        }
        Ok(())
    }
}

struct RuleDetail<'a> {
    rule: &'a Rule,
    outcome: Option<&'a RuleOutcome>,
}

impl fmt::Display for RuleDetail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = self.rule;
        let optional = |value: &Option<String>| value.clone().unwrap_or_default();

        row(f, "Identifier".bold(), &rule.identifier)?;
        row(f, "Type".bold(), optional(&rule.rule_type))?;
        row(f, "Country".bold(), optional(&rule.country))?;
        row(f, "Version".bold(), optional(&rule.version))?;
        row(f, "SchemaVersion".bold(), optional(&rule.schema_version))?;
        row(f, "Engine".bold(), optional(&rule.engine))?;
        row(f, "EngineVersion".bold(), optional(&rule.engine_version))?;
        row(f, "CertificateType".bold(), optional(&rule.certificate_type))?;
        let descriptions = rule
            .description
            .iter()
            .map(|d| format!("[{}:] {}", d.lang, d.desc))
            .collect::<Vec<_>>()
            .join(" ");
        row(f, "Description".bold(), descriptions)?;
        row(f, "ValidFrom".bold(), optional(&rule.valid_from))?;
        row(f, "ValidTo".bold(), optional(&rule.valid_to))?;
        row(f, "AffectedFields".bold(), rule.affected_fields.join(", "))?;

        let logic = json::pretty(&rule.logic);
        let mut lines = logic.lines();
        row(f, "Logic".bold(), lines.next().unwrap_or_default())?;
        for line in lines {
            row(f, "".normal(), line)?;
        }

        if let Some(outcome) = self.outcome {
            let text = outcome.to_string();
            row(f, "Result".bold(), paint(&text, outcome.status()))?;
        }
        Ok(())
    }
}

fn row(f: &mut fmt::Formatter<'_>, label: ColoredString, value: impl fmt::Display) -> fmt::Result {
    writeln!(f, "{label:<LABEL_WIDTH$}{value}")
}

/// The result set as pretty-printed JSON.
///
/// # Errors
///
/// Returns [`CrosscheckError::Json`] if serialization fails.
pub fn results_json(results: &EvaluationResults) -> Result<String, CrosscheckError> {
    Ok(serde_json::to_string_pretty(results)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{Crosscheck, RuleSet, RuleSets, ValueSets};

    fn results() -> EvaluationResults {
        let rule_sets = RuleSets::new()
            .with_rule_set(
                "AT",
                RuleSet::new()
                    .with_rule(Rule::new("VR-AT-0000", json!(true)))
                    .with_rule(Rule::new("VR-AT-0001", json!({ "+": ["x", 1] }))),
            )
            .with_rule_set(
                "NL",
                RuleSet::new().with_rule(Rule::new("VR-NL-0000", json!(true))),
            );
        Crosscheck::new(rule_sets, ValueSets::new())
            .evaluate(&json!({}), &ExternalParameters::new())
    }

    #[test]
    fn text_lists_every_rule() {
        let text = results_text(&results());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("AT"));
        assert!(lines[0].contains("VR-AT-0000"));
        assert!(lines[0].contains("VR-AT-0001"));
        assert!(lines[1].contains("VR-NL-0000"));
    }

    #[test]
    fn parameters_table() {
        let params = ExternalParameters::new()
            .set("validationClock", "2021-06-01T12:00:00.000Z")
            .set("limit", 3);
        let text = parameters_text(&params);
        assert!(text.contains("2021-06-01T12:00:00.000Z"));
        assert!(!text.contains("\"2021"));
        assert!(text.contains('3'));
    }

    #[test]
    fn detail_shows_metadata_logic_and_error() {
        let rule = Rule::new("VR-AT-0001", json!({ "+": ["x", 1] }))
            .with_country("AT")
            .with_description("en", "Adds things")
            .with_affected_fields(["v.0.dn", "v.0.sd"]);
        let results = results();
        let detail = rule_detail(&rule, results.outcome("AT", "VR-AT-0001"));
        assert!(detail.contains("[en:] Adds things"));
        assert!(detail.contains("v.0.dn, v.0.sd"));
        assert!(detail.contains("\"+\": ["));
        assert!(detail.contains(
            "Error occurred during evaluation: left-hand side of a \"+\" operation must be an integer."
        ));
    }

    #[test]
    fn detail_without_outcome_has_no_result_row() {
        let detail = rule_detail(&Rule::new("r", json!(true)), None);
        assert!(!detail.contains("Result"));
        // twelve metadata rows and a one-line logic row
        assert_eq!(detail.lines().count(), 13);
    }

    #[test]
    fn json_uses_wire_names() {
        let value: serde_json::Value = serde_json::from_str(&results_json(&results()).unwrap()).unwrap();
        assert_eq!(value["AT"]["allSatisfied"], json!(false));
        assert_eq!(value["AT"]["perRule"]["VR-AT-0000"]["status"], json!("satisfied"));
        assert_eq!(
            value["AT"]["perRule"]["VR-AT-0001"]["status"],
            json!("evaluation_error")
        );
        assert_eq!(value["NL"]["allSatisfied"], json!(true));
    }
}
