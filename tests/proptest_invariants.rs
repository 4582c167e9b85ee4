
use crosscheck::{
    evaluate_rule_sets, EvaluationResults, ExternalParameters, OutcomeStatus, Rule, RuleSet,
    RuleSets, ValueSets,
};
use proptest::prelude::*;
use serde_json::{json, Value};
use strategies::{
    arb_payload, arb_rule_sets, arb_rule_sets_with_panics, mock_evaluator, Behaviour, GenRuleSets,
};

fn eval(gen: &GenRuleSets, payload: &Value) -> EvaluationResults {
    evaluate_rule_sets(
        &mock_evaluator,
        &gen.build(),
        payload,
        &ValueSets::new(),
        &ExternalParameters::new(),
    )
}

// ---------------------------------------------------------------------------
// Invariant 1: Completeness
//
// Exactly one verdict per input rule set and one outcome per input rule, in
// input order.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn completeness(gen in arb_rule_sets(), payload in arb_payload()) {
        let results = eval(&gen, &payload);
        prop_assert_eq!(results.len(), gen.sets.len());
        prop_assert_eq!(results.outcome_count(), gen.rule_count());

        for ((set_id, rules), (result_id, verdict)) in gen.sets.iter().zip(results.iter()) {
            prop_assert_eq!(set_id.as_str(), result_id);
            let expected: Vec<&str> = rules.iter().map(|(id, _)| id.as_str()).collect();
            let actual: Vec<&str> = verdict.outcomes().map(|(id, _)| id).collect();
            prop_assert_eq!(expected, actual);
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Conjunction correctness
//
// `all_satisfied` holds iff every rule produced exactly Satisfied; an empty
// rule set is vacuously satisfied.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn conjunction_is_strict(gen in arb_rule_sets(), payload in arb_payload()) {
        let results = eval(&gen, &payload);
        for (set_id, rules) in &gen.sets {
            let verdict = results.get(set_id).expect("every rule set has a verdict");
            let expected = rules.iter().all(|(_, b)| *b == Behaviour::Satisfy);
            prop_assert_eq!(verdict.all_satisfied(), expected, "rule set {}", set_id);
            if rules.is_empty() {
                prop_assert!(verdict.all_satisfied());
                prop_assert!(verdict.is_empty());
            }
        }
    }

    #[test]
    fn outcomes_follow_behaviour(gen in arb_rule_sets(), payload in arb_payload()) {
        let results = eval(&gen, &payload);
        for (set_id, rules) in &gen.sets {
            for (rule_id, behaviour) in rules {
                let outcome = results.outcome(set_id, rule_id).expect("every rule has an outcome");
                prop_assert_eq!(outcome.status(), behaviour.status());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Fault containment
//
// Turning one rule into a failing (or panicking) rule changes that rule's
// outcome and nothing else apart from its own set's conjunction.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn faults_are_contained(
        gen in arb_rule_sets_with_panics(),
        payload in arb_payload(),
        pick in any::<prop::sample::Index>(),
        panics in any::<bool>(),
    ) {
        let all: Vec<(usize, usize)> = gen
            .sets
            .iter()
            .enumerate()
            .flat_map(|(s, (_, rules))| (0..rules.len()).map(move |r| (s, r)))
            .collect();
        prop_assume!(!all.is_empty());
        let (s, r) = all[pick.index(all.len())];

        let mut faulty = gen.clone();
        faulty.sets[s].1[r].1 = if panics { Behaviour::Panic } else { Behaviour::Fail };

        let before = eval(&gen, &payload);
        let after = eval(&faulty, &payload);

        for (i, (set_id, rules)) in gen.sets.iter().enumerate() {
            for (j, (rule_id, _)) in rules.iter().enumerate() {
                let outcome = after.outcome(set_id, rule_id).expect("outcome present");
                if (i, j) == (s, r) {
                    prop_assert_eq!(outcome.status(), OutcomeStatus::Errored);
                } else {
                    prop_assert_eq!(Some(outcome), before.outcome(set_id, rule_id));
                }
            }
            if i != s {
                prop_assert_eq!(after.get(set_id), before.get(set_id));
            } else {
                prop_assert!(!after.get(set_id).expect("verdict present").all_satisfied());
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Determinism
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn determinism(gen in arb_rule_sets(), payload in arb_payload()) {
        let rule_sets = gen.build();
        let params = ExternalParameters::new().set("validationClock", "2021-06-01T12:00:00.000Z");
        let first = evaluate_rule_sets(&mock_evaluator, &rule_sets, &payload, &ValueSets::new(), &params);
        for _ in 0..3 {
            let again = evaluate_rule_sets(&mock_evaluator, &rule_sets, &payload, &ValueSets::new(), &params);
            prop_assert_eq!(&first, &again);
        }
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&eval(&gen, &payload)).unwrap()
        );
    }
}

// ---------------------------------------------------------------------------
// Invariant 5: Context override
//
// A caller parameter with the same name as an entry of `external` wins over
// the static value sets.
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn caller_parameters_override_value_sets(
        key in "[a-z]{1,8}",
        static_values in prop::collection::btree_set("[A-Z]{2}", 1..4),
        caller in any::<i64>(),
    ) {
        let value_sets = ValueSets::new().with_value_set(key.clone(), static_values);
        let params = ExternalParameters::new()
            .set(key.clone(), caller)
            .set("valueSets", json!({ key.clone(): ["override"] }));
        let rule_sets = RuleSets::new().with_rule_set(
            "S",
            RuleSet::new()
                .with_rule(Rule::new("param", json!({ "external": key.clone() })))
                .with_rule(Rule::new("valueSets", json!({ "external": "valueSets" }))),
        );

        let results = evaluate_rule_sets(&mock_evaluator, &rule_sets, &json!({}), &value_sets, &params);
        prop_assert_eq!(
            results.outcome("S", "param").and_then(|o| o.value()),
            Some(json!(caller))
        );
        prop_assert_eq!(
            results.outcome("S", "valueSets").and_then(|o| o.value()),
            Some(json!({ key: ["override"] }))
        );
    }
}
