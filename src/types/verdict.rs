use std::fmt;

use serde::Serialize;

use super::outcome::{OutcomeStatus, RuleOutcome};
use super::registry::Registry;

/// Per-rule outcomes of one rule set, plus their conjunction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[must_use]
pub struct RuleSetVerdict {
    per_rule: Registry<RuleOutcome>,
    all_satisfied: bool,
}

impl RuleSetVerdict {
    pub(crate) fn new(per_rule: Registry<RuleOutcome>, all_satisfied: bool) -> Self {
        Self {
            per_rule,
            all_satisfied,
        }
    }

    /// `true` iff every rule in the set is [`RuleOutcome::Satisfied`].
    /// Vacuously `true` for an empty set.
    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.all_satisfied
    }

    #[must_use]
    pub fn outcome(&self, rule_id: &str) -> Option<&RuleOutcome> {
        self.per_rule.get(rule_id)
    }

    /// `(rule id, outcome)` pairs in rule-set order.
    pub fn outcomes(&self) -> impl ExactSizeIterator<Item = (&str, &RuleOutcome)> {
        self.per_rule.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.per_rule.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.per_rule.is_empty()
    }

    /// Number of rules displayed in the given state.
    #[must_use]
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.per_rule
            .values()
            .filter(|outcome| outcome.status() == status)
            .count()
    }
}

impl fmt::Display for RuleSetVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}/{} satisfied",
            if self.all_satisfied { "pass" } else { "fail" },
            self.count(OutcomeStatus::Satisfied),
            self.per_rule.len(),
        )?;
        let errored = self.count(OutcomeStatus::Errored);
        if errored > 0 {
            write!(f, ", {errored} errored")?;
        }
        write!(f, ")")
    }
}

/// Verdicts for every evaluated rule set, keyed by rule-set identifier.
///
/// Returned by [`Crosscheck::evaluate()`](crate::Crosscheck::evaluate) and
/// [`evaluate_rule_sets()`](crate::evaluate_rule_sets). Built fresh for each
/// request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
#[must_use]
pub struct EvaluationResults {
    verdicts: Registry<RuleSetVerdict>,
}

impl EvaluationResults {
    pub(crate) fn new(verdicts: Registry<RuleSetVerdict>) -> Self {
        Self { verdicts }
    }

    #[must_use]
    pub fn get(&self, rule_set_id: &str) -> Option<&RuleSetVerdict> {
        self.verdicts.get(rule_set_id)
    }

    /// The outcome of a single rule, for detail display.
    #[must_use]
    pub fn outcome(&self, rule_set_id: &str, rule_id: &str) -> Option<&RuleOutcome> {
        self.verdicts.get(rule_set_id)?.outcome(rule_id)
    }

    /// `(rule-set id, verdict)` pairs in rule-set order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &RuleSetVerdict)> {
        self.verdicts.iter()
    }

    /// Identifiers of rule sets whose rules are all satisfied.
    pub fn satisfied_rule_sets(&self) -> impl Iterator<Item = &str> {
        self.verdicts
            .iter()
            .filter(|(_, verdict)| verdict.all_satisfied())
            .map(|(id, _)| id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }

    /// Total number of per-rule outcomes across all rule sets.
    #[must_use]
    pub fn outcome_count(&self) -> usize {
        self.verdicts.values().map(RuleSetVerdict::len).sum()
    }
}

impl fmt::Display for EvaluationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .verdicts
            .iter()
            .map(|(id, verdict)| format!("{id}: {verdict}"))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn verdict(outcomes: Vec<(&str, RuleOutcome)>, all_satisfied: bool) -> RuleSetVerdict {
        RuleSetVerdict::new(outcomes.into_iter().collect(), all_satisfied)
    }

    #[test]
    fn verdict_accessors() {
        let v = verdict(
            vec![
                ("R-1", RuleOutcome::Satisfied),
                ("R-2", RuleOutcome::EvaluationError("x".into())),
            ],
            false,
        );
        assert!(!v.all_satisfied());
        assert_eq!(v.len(), 2);
        assert_eq!(v.outcome("R-1"), Some(&RuleOutcome::Satisfied));
        assert_eq!(v.outcome("R-3"), None);
        assert_eq!(v.count(OutcomeStatus::Errored), 1);
        assert_eq!(
            v.outcomes().map(|(id, _)| id).collect::<Vec<_>>(),
            vec!["R-1", "R-2"]
        );
    }

    #[test]
    fn verdict_display() {
        let v = verdict(
            vec![
                ("R-1", RuleOutcome::Satisfied),
                ("R-2", RuleOutcome::EvaluationError("x".into())),
            ],
            false,
        );
        assert_eq!(v.to_string(), "fail (1/2 satisfied, 1 errored)");
        assert_eq!(verdict(vec![], true).to_string(), "pass (0/0 satisfied)");
    }

    #[test]
    fn results_lookup_and_display() {
        let results = EvaluationResults::new(
            [
                ("AT", verdict(vec![("VR-AT-0000", RuleOutcome::Satisfied)], true)),
                ("NL", verdict(vec![("VR-NL-0000", RuleOutcome::Violated)], false)),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(results.len(), 2);
        assert_eq!(results.outcome_count(), 2);
        assert_eq!(
            results.outcome("NL", "VR-NL-0000"),
            Some(&RuleOutcome::Violated)
        );
        assert_eq!(results.outcome("NL", "VR-AT-0000"), None);
        assert_eq!(results.satisfied_rule_sets().collect::<Vec<_>>(), vec!["AT"]);
        assert_eq!(
            results.to_string(),
            "AT: pass (1/1 satisfied), NL: fail (0/1 satisfied)"
        );
    }

    #[test]
    fn results_serialized_shape() {
        let results = EvaluationResults::new(
            [("AT", verdict(vec![("VR-AT-0000", RuleOutcome::Satisfied)], true))]
                .into_iter()
                .collect(),
        );
        assert_eq!(
            serde_json::to_value(&results).unwrap(),
            json!({
                "AT": {
                    "perRule": { "VR-AT-0000": { "status": "satisfied" } },
                    "allSatisfied": true
                }
            })
        );
    }
}
