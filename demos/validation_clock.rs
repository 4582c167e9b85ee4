use crosscheck::{Crosscheck, ExternalParameters, Rule, RuleSet, RuleSets, ValueSets};
use serde_json::json;

fn main() {
    // Valid from 14 days after vaccination, for 270 days.
    let window = json!({ "and": [
        { "not-before": [
            { "plusTime": [{ "var": "external.validationClock" }, 0, "day"] },
            { "plusTime": [{ "var": "payload.v.0.dt" }, 14, "day"] }
        ] },
        { "not-after": [
            { "plusTime": [{ "var": "external.validationClock" }, 0, "day"] },
            { "plusTime": [{ "var": "payload.v.0.dt" }, 270, "day"] }
        ] }
    ] });
    let engine = Crosscheck::new(
        RuleSets::new().with_rule_set("NL", RuleSet::new().with_rule(Rule::new("VR-NL-0001", window))),
        ValueSets::new(),
    );
    let payload = json!({ "v": [{ "dt": "2021-02-18" }] });

    for clock in [
        "2021-02-20T00:00:00Z",
        "2021-03-04T00:00:00Z",
        "2021-06-01T12:00:00+02:00",
        "2021-11-16T00:00:00Z",
    ] {
        let params = ExternalParameters::new()
            .with_validation_clock_str(clock)
            .expect("invalid clock");
        let results = engine.evaluate(&payload, &params);
        let outcome = results.outcome("NL", "VR-NL-0001").expect("rule evaluated");
        println!("{clock:<28}{outcome}");
    }

    // Without a clock the date rules cannot be decided.
    let results = engine.evaluate(&payload, &ExternalParameters::new());
    println!(
        "{:<28}{}",
        "(no clock)",
        results.outcome("NL", "VR-NL-0001").expect("rule evaluated")
    );
}
