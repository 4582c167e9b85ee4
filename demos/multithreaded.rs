use std::sync::Arc;
use std::thread;

use crosscheck::{Crosscheck, ExternalParameters, Rule, RuleSet, RuleSets, ValueSets};
use serde_json::json;

fn main() {
    let engine = Arc::new(Crosscheck::new(
        RuleSets::new().with_rule_set(
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
        ),
        ValueSets::new().with_value_set("vaccines", ["EU/1/20/1528", "EU/1/20/1507"]),
    ));

    let payloads = vec![
        json!({ "v": [{ "mp": "EU/1/20/1528", "dn": 2, "sd": 2 }] }),
        json!({ "v": [{ "mp": "EU/1/20/1507", "dn": 1, "sd": 2 }] }),
        json!({ "v": [{ "mp": "EU/1/99/0000", "dn": 2, "sd": 2 }] }),
        json!({}),
    ];

    let handles: Vec<_> = payloads
        .into_iter()
        .enumerate()
        .map(|(i, payload)| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let results = engine.evaluate(&payload, &ExternalParameters::new());
                let verdict = results.get("AT").map(ToString::to_string).unwrap_or_default();
                format!("Thread {i}: AT {verdict}")
            })
        })
        .collect();

    for h in handles {
        println!("{}", h.join().expect("thread panicked"));
    }
}
