use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::certlogic::CertLogic;
use crate::evaluate::{evaluate_rule_sets, LogicEvaluator};
use crate::{EvaluationResults, ExternalParameters, Rule, RuleSets, ValueSets};

/// Loaded rule sets and value sets, ready to evaluate payloads.
///
/// Immutable once built. With a `Send + Sync` evaluator (the default
/// [`CertLogic`] is) one engine can live behind `Arc` and serve any number
/// of threads.
///
/// # Example
///
/// ```
/// use crosscheck::{Crosscheck, ExternalParameters, Rule, RuleSet, RuleSets, ValueSets};
/// use serde_json::json;
///
/// let rule_sets = RuleSets::new().with_rule_set(
///     "AT",
///     RuleSet::new().with_rule(Rule::new(
///         "VR-AT-0001",
///         json!({ "if": [{ "var": "payload.dob" }, true, false] }),
///     )),
/// );
/// let engine = Crosscheck::new(rule_sets, ValueSets::new());
///
/// let results = engine.evaluate(&json!({ "dob": "1998-02-26" }), &ExternalParameters::new());
/// assert!(results.get("AT").unwrap().all_satisfied());
/// ```
#[derive(Debug, Clone)]
pub struct Crosscheck<E = CertLogic> {
    rule_sets: RuleSets,
    value_sets: Arc<ValueSets>,
    evaluator: E,
}

impl Crosscheck<CertLogic> {
    /// Build an engine that evaluates with the built-in CertLogic interpreter.
    #[must_use]
    pub fn new(rule_sets: RuleSets, value_sets: impl Into<Arc<ValueSets>>) -> Self {
        Self::with_evaluator(rule_sets, value_sets, CertLogic)
    }
}

impl<E: LogicEvaluator> Crosscheck<E> {
    /// Build an engine around a custom evaluator.
    #[must_use]
    pub fn with_evaluator(
        rule_sets: RuleSets,
        value_sets: impl Into<Arc<ValueSets>>,
        evaluator: E,
    ) -> Self {
        Self {
            rule_sets,
            value_sets: value_sets.into(),
            evaluator,
        }
    }

    /// Evaluate every rule of every rule set against `payload`.
    ///
    /// Never fails: faults are reported per rule in the returned results.
    #[must_use]
    pub fn evaluate(&self, payload: &Value, params: &ExternalParameters) -> EvaluationResults {
        evaluate_rule_sets(
            &self.evaluator,
            &self.rule_sets,
            payload,
            &self.value_sets,
            params,
        )
    }

    #[must_use]
    pub fn rule_sets(&self) -> &RuleSets {
        &self.rule_sets
    }

    #[must_use]
    pub fn value_sets(&self) -> &Arc<ValueSets> {
        &self.value_sets
    }

    #[must_use]
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Look up a rule by rule-set and rule identifier, for detail display.
    #[must_use]
    pub fn rule(&self, rule_set_id: &str, rule_id: &str) -> Option<&Rule> {
        self.rule_sets.rule(rule_set_id, rule_id)
    }
}

impl<E> fmt::Display for Crosscheck<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Crosscheck({} rule sets, {} rules, {} value sets)",
            self.rule_sets.len(),
            self.rule_sets.rule_count(),
            self.value_sets.len()
        )
    }
}
