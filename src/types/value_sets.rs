use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::CrosscheckError;

/// Named sets of permitted string values, e.g. approved vaccine products.
///
/// Loaded once per process and shared read-only behind `Arc` by every
/// evaluation. The JSON rendering handed to the evaluator is built on first
/// use and cached, so evaluation requests only pay for a clone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, BTreeSet<String>>", into = "BTreeMap<String, BTreeSet<String>>")]
pub struct ValueSets {
    sets: BTreeMap<String, BTreeSet<String>>,
    json: OnceLock<Value>,
}

impl ValueSets {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named value set.
    #[must_use]
    pub fn with_value_set<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sets
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self.json = OnceLock::new();
        self
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.sets.get(name)
    }

    /// Whether `value` is a member of the value set `name`.
    #[must_use]
    pub fn contains(&self, name: &str, value: &str) -> bool {
        self.sets.get(name).is_some_and(|set| set.contains(value))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// The value sets as a JSON object of string arrays, as rule expressions see them.
    #[must_use]
    pub fn as_json(&self) -> &Value {
        self.json.get_or_init(|| {
            Value::Object(
                self.sets
                    .iter()
                    .map(|(name, values)| {
                        let values = values.iter().cloned().map(Value::String).collect();
                        (name.clone(), Value::Array(values))
                    })
                    .collect(),
            )
        })
    }

    /// Parse value sets from a JSON object mapping names to string arrays.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::Json`] if the document has any other shape.
    pub fn from_json(input: &str) -> Result<Self, CrosscheckError> {
        let value_sets: Self = serde_json::from_str(input)?;
        info!(value_sets = value_sets.len(), "loaded value sets");
        Ok(value_sets)
    }

    /// Read a JSON file and parse it with [`from_json`](Self::from_json).
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError`] on I/O or parse failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CrosscheckError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| CrosscheckError::read(path, e))?;
        Self::from_json(&input)
    }
}

impl From<BTreeMap<String, BTreeSet<String>>> for ValueSets {
    fn from(sets: BTreeMap<String, BTreeSet<String>>) -> Self {
        Self {
            sets,
            json: OnceLock::new(),
        }
    }
}

impl From<ValueSets> for BTreeMap<String, BTreeSet<String>> {
    fn from(value_sets: ValueSets) -> Self {
        value_sets.sets
    }
}

impl PartialEq for ValueSets {
    fn eq(&self, other: &Self) -> bool {
        self.sets == other.sets
    }
}

impl fmt::Display for ValueSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueSets({} sets)", self.sets.len())
    }
}
