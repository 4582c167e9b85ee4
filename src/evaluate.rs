use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde_json::Value;
use tracing::{debug, debug_span, trace};

use crate::types::Registry;
use crate::{
    EvaluationContext, EvaluationError, EvaluationResults, ExternalParameters, RuleOutcome,
    RuleSet, RuleSetVerdict, RuleSets, ValueSets,
};

/// Interprets a rule's logic expression against an evaluation context.
///
/// Implementations must be pure: no side effects and no mutable state shared
/// between calls. Any closure with the right signature is an evaluator,
/// which is how tests substitute a mock.
pub trait LogicEvaluator {
    /// Evaluate `expr` against `data`.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError`] when the expression cannot be evaluated.
    fn evaluate(&self, expr: &Value, data: &Value) -> Result<Value, EvaluationError>;
}

impl<F> LogicEvaluator for F
where
    F: Fn(&Value, &Value) -> Result<Value, EvaluationError>,
{
    fn evaluate(&self, expr: &Value, data: &Value) -> Result<Value, EvaluationError> {
        self(expr, data)
    }
}

/// Evaluate one expression, containing every fault as an outcome.
///
/// `true` and `false` become [`RuleOutcome::Satisfied`] and
/// [`RuleOutcome::Violated`], any other value is kept as
/// [`RuleOutcome::NonBoolean`]. Errors and panics raised by the evaluator
/// become [`RuleOutcome::EvaluationError`].
///
/// A contained panic still passes through the process panic hook, which by
/// default prints it to stderr. The outcome carries only the panic message.
/// Callers that want silent containment install their own hook with
/// [`std::panic::set_hook`].
pub fn evaluate_safe<E>(evaluator: &E, expr: &Value, context: &EvaluationContext) -> RuleOutcome
where
    E: LogicEvaluator + ?Sized,
{
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        evaluator.evaluate(expr, context.as_value())
    }));
    match result {
        Ok(Ok(value)) => RuleOutcome::from_value(value),
        Ok(Err(err)) => RuleOutcome::from_error(&err),
        Err(payload) => RuleOutcome::from_error(&EvaluationError::new(panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "evaluator panicked".to_owned()
    }
}

/// Evaluate every rule of every rule set against one shared context.
///
/// The result has exactly one verdict per rule set and one outcome per rule,
/// in input order. Evaluation never stops early: a violated or failing rule
/// is recorded and its siblings are still evaluated.
pub fn evaluate_rule_sets<E>(
    evaluator: &E,
    rule_sets: &RuleSets,
    payload: &Value,
    value_sets: &ValueSets,
    params: &ExternalParameters,
) -> EvaluationResults
where
    E: LogicEvaluator + ?Sized,
{
    let span = debug_span!(
        "evaluate_rule_sets",
        rule_sets = rule_sets.len(),
        rules = rule_sets.rule_count()
    );
    let _guard = span.enter();

    let context = EvaluationContext::new(payload.clone(), value_sets, params);
    let verdicts = rule_sets
        .iter()
        .map(|(rule_set_id, rule_set)| {
            let verdict = evaluate_rule_set(evaluator, rule_set, &context);
            debug!(rule_set = rule_set_id, %verdict, "evaluated rule set");
            (rule_set_id, verdict)
        })
        .collect();
    EvaluationResults::new(verdicts)
}

pub(crate) fn evaluate_rule_set<E>(
    evaluator: &E,
    rule_set: &RuleSet,
    context: &EvaluationContext,
) -> RuleSetVerdict
where
    E: LogicEvaluator + ?Sized,
{
    let mut per_rule = Registry::with_capacity(rule_set.len());
    let mut all_satisfied = true;
    for (rule_id, rule) in rule_set.iter() {
        let outcome = evaluate_safe(evaluator, &rule.logic, context);
        trace!(rule = rule_id, %outcome, "evaluated rule");
        all_satisfied &= outcome.is_satisfied();
        per_rule.insert(rule_id, outcome);
    }
    RuleSetVerdict::new(per_rule, all_satisfied)
}
