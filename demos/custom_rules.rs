use std::path::PathBuf;

use crosscheck::{report, Crosscheck, ExternalParameters, RuleSet, RuleSets, ValueSets};

fn resource(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("resources").join(name)
}

fn main() {
    let rule_sets = RuleSets::from_file(resource("all-rule-sets.json"))
        .expect("failed to load rule sets");
    let value_sets =
        ValueSets::from_file(resource("valueSets.json")).expect("failed to load value sets");

    // A custom rule set is evaluated alongside the regional ones under `custom`.
    let custom = RuleSet::from_json(
        r#"[
            {
                "Identifier": "CR-XX-0000",
                "Description": [{ "lang": "en", "desc": "Vaccinated in a known country." }],
                "Logic": { "in": [{ "var": "payload.v.0.co" }, { "var": "external.valueSets.country-2-codes" }] }
            },
            {
                "Identifier": "CR-XX-0001",
                "Description": [{ "lang": "en", "desc": "Second dose or later." }],
                "Logic": { ">=": [{ "var": "payload.v.0.dn" }, 2] }
            }
        ]"#,
    )
    .expect("invalid custom rule set");

    let engine = Crosscheck::new(rule_sets.with_custom(custom), value_sets);
    let payload = std::fs::read_to_string(resource("default-dcc.json"))
        .expect("failed to read payload");
    let payload = crosscheck::json::parse(&payload).expect("invalid payload");
    let params = ExternalParameters::new()
        .with_validation_clock_str("2021-06-01T12:00:00Z")
        .expect("invalid clock");

    let results = engine.evaluate(&payload, &params);
    print!("{}", report::results_text(&results));

    let verdict = results.get(RuleSets::CUSTOM).expect("custom rule set evaluated");
    println!();
    println!("custom: {verdict}");
}
