use std::path::PathBuf;

use crosscheck::{report, Crosscheck, ExternalParameters, OutcomeStatus, RuleSets, ValueSets};

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources").join(name)
}

fn main() {
    let engine = Crosscheck::new(
        RuleSets::from_file(resource("all-rule-sets.json")).expect("failed to load rule sets"),
        ValueSets::from_file(resource("valueSets.json")).expect("failed to load value sets"),
    );
    let payload = crosscheck::json::parse(
        &std::fs::read_to_string(resource("default-dcc.json")).expect("failed to read payload"),
    )
    .expect("invalid payload");
    let params = ExternalParameters::new()
        .with_validation_clock_str("2021-06-01T12:00:00Z")
        .expect("invalid clock");

    let results = engine.evaluate(&payload, &params);

    println!("External parameters");
    print!("{}", report::parameters_text(&params));
    println!();
    print!("{}", report::results_text(&results));

    // Details of every rule that did not pass.
    for (rule_set_id, verdict) in results.iter() {
        for (rule_id, outcome) in verdict.outcomes() {
            if outcome.status() == OutcomeStatus::Satisfied {
                continue;
            }
            if let Some(rule) = engine.rule(rule_set_id, rule_id) {
                println!();
                print!("{}", report::rule_detail(rule, Some(outcome)));
            }
        }
    }

    println!();
    println!("{}", report::results_json(&results).expect("results serialize"));
}
