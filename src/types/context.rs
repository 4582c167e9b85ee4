use serde_json::{Map, Value};

use super::external::ExternalParameters;
use super::value_sets::ValueSets;

/// The data a single evaluation pass exposes to rule expressions:
///
/// ```json
/// { "payload": <certificate>, "external": { "valueSets": { ... }, "<param>": <value>, ... } }
/// ```
///
/// Built once per request and never mutated afterwards, so every rule in
/// every rule set observes the same data. Caller parameters are merged over
/// `valueSets` shallowly: a parameter named `valueSets` replaces the static
/// mapping for this context only.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationContext {
    data: Value,
}

impl EvaluationContext {
    pub const PAYLOAD: &'static str = "payload";
    pub const EXTERNAL: &'static str = "external";
    pub const VALUE_SETS: &'static str = "valueSets";

    #[must_use]
    pub fn new(payload: Value, value_sets: &ValueSets, params: &ExternalParameters) -> Self {
        let mut external = Map::new();
        external.insert(Self::VALUE_SETS.to_owned(), value_sets.as_json().clone());
        for (name, value) in params.iter() {
            external.insert(name.to_owned(), value.clone());
        }

        let mut data = Map::new();
        data.insert(Self::PAYLOAD.to_owned(), payload);
        data.insert(Self::EXTERNAL.to_owned(), Value::Object(external));
        Self {
            data: Value::Object(data),
        }
    }

    /// The full context value handed to the evaluator.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.data
    }

    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.data[Self::PAYLOAD]
    }

    #[must_use]
    pub fn external(&self) -> &Value {
        &self.data[Self::EXTERNAL]
    }
}
