use crosscheck::{Crosscheck, ExternalParameters, Rule, RuleSet, RuleSets, ValueSets};
use serde_json::json;

fn main() {
    // Define rule sets, one per region
    let rule_sets = RuleSets::new()
        .with_rule_set(
            "AT",
            RuleSet::new()
                .with_rule(Rule::new(
                    "VR-AT-0001",
                    json!({ "in": [{ "var": "payload.v.0.mp" }, { "var": "external.valueSets.vaccines" }] }),
                ))
                .with_rule(Rule::new(
                    "VR-AT-0002",
                    json!({ ">=": [{ "var": "payload.v.0.dn" }, { "var": "payload.v.0.sd" }] }),
                )),
        )
        .with_rule_set(
            "DE",
            RuleSet::new().with_rule(Rule::new(
                "GR-DE-0001",
                json!({ "if": [{ "var": "payload.dob" }, true, false] }),
            )),
        );
    let value_sets = ValueSets::new().with_value_set("vaccines", ["EU/1/20/1528"]);

    let engine = Crosscheck::new(rule_sets, value_sets);
    println!("{engine}");

    // Evaluate a payload
    let payload = json!({
        "dob": "1998-02-26",
        "v": [{ "mp": "EU/1/20/1528", "dn": 1, "sd": 2 }]
    });
    let results = engine.evaluate(&payload, &ExternalParameters::new());

    for (rule_set_id, verdict) in results.iter() {
        println!("{rule_set_id}: {verdict}");
        for (rule_id, outcome) in verdict.outcomes() {
            println!("  {rule_id}: {outcome}");
        }
    }
}
