use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::registry::Registry;
use super::rule::Rule;
use crate::CrosscheckError;

/// An ordered mapping from rule identifier to [`Rule`].
///
/// Identifiers are unique within one set. Document order is kept so results
/// display in the same order the rules were published.
///
/// # Example
///
/// ```
/// use crosscheck::{Rule, RuleSet};
/// use serde_json::json;
///
/// let set = RuleSet::new()
///     .with_rule(Rule::new("VR-AT-0000", json!({ "var": "payload.dob" })))
///     .with_rule(Rule::new("VR-AT-0001", json!(true)));
///
/// assert_eq!(set.len(), 2);
/// assert!(set.get("VR-AT-0001").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Registry<Rule>,
}

impl RuleSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule keyed by its own identifier.
    #[must_use]
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.insert(rule.identifier.clone(), rule);
        self
    }

    /// Insert a rule under the given identifier, replacing (in place) any
    /// rule already registered under it.
    pub fn insert(&mut self, rule_id: impl Into<String>, rule: Rule) -> Option<Rule> {
        self.rules.insert(rule_id, rule)
    }

    #[must_use]
    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.get(rule_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterate over `(rule id, rule)` pairs in document order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Rule)> {
        self.rules.iter()
    }

    pub fn rule_ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.rules.keys()
    }

    /// Parse a single rule set from JSON.
    ///
    /// Accepts either an object keyed by rule identifier or an array of rule
    /// records, which are then keyed by their `Identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::Json`] if the text is not valid JSON, a rule
    /// lacks `Identifier` or `Logic`, or an identifier appears twice.
    pub fn from_json(input: &str) -> Result<Self, CrosscheckError> {
        if input.trim_start().starts_with('[') {
            let listed: Vec<Rule> = serde_json::from_str(input)?;
            let mut rules = Registry::with_capacity(listed.len());
            for rule in listed {
                rules.try_insert(rule.identifier.clone(), rule).map_err(|id| {
                    <serde_json::Error as serde::de::Error>::custom(format!(
                        "duplicate identifier '{id}'"
                    ))
                })?;
            }
            return Ok(Self { rules });
        }
        Ok(serde_json::from_str(input)?)
    }

    /// Read a JSON file and parse it as a single rule set.
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

impl FromIterator<Rule> for RuleSet {
    fn from_iter<I: IntoIterator<Item = Rule>>(iter: I) -> Self {
        iter.into_iter().fold(RuleSet::new(), RuleSet::with_rule)
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({} rules)", self.rules.len())
    }
}

/// Rule sets grouped by rule-set identifier, typically one per issuing region.
///
/// Loaded once and read-only afterwards. Cheap to share behind `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSets {
    sets: Registry<RuleSet>,
}

impl RuleSets {
    /// Identifier under which a user-supplied rule set is evaluated.
    pub const CUSTOM: &'static str = "custom";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_rule_set(mut self, rule_set_id: impl Into<String>, rule_set: RuleSet) -> Self {
        self.insert(rule_set_id, rule_set);
        self
    }

    /// Add (or replace) the rule set registered under [`RuleSets::CUSTOM`].
    #[must_use]
    pub fn with_custom(self, rule_set: RuleSet) -> Self {
        self.with_rule_set(Self::CUSTOM, rule_set)
    }

    /// Insert a rule set, replacing (in place) any set already registered
    /// under the same identifier.
    pub fn insert(&mut self, rule_set_id: impl Into<String>, rule_set: RuleSet) -> Option<RuleSet> {
        self.sets.insert(rule_set_id, rule_set)
    }

    #[must_use]
    pub fn get(&self, rule_set_id: &str) -> Option<&RuleSet> {
        self.sets.get(rule_set_id)
    }

    /// Look up a single rule by rule-set identifier and rule identifier.
    #[must_use]
    pub fn rule(&self, rule_set_id: &str, rule_id: &str) -> Option<&Rule> {
        self.sets.get(rule_set_id)?.get(rule_id)
    }

    /// Find the first rule set (in document order) containing `rule_id`.
    #[must_use]
    pub fn find_rule(&self, rule_id: &str) -> Option<(&str, &Rule)> {
        self.sets
            .iter()
            .find_map(|(set_id, set)| set.get(rule_id).map(|rule| (set_id, rule)))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Total number of rules across all rule sets.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.sets.values().map(RuleSet::len).sum()
    }

    /// Iterate over `(rule-set id, rule set)` pairs in document order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &RuleSet)> {
        self.sets.iter()
    }

    pub fn rule_set_ids(&self) -> impl ExactSizeIterator<Item = &str> {
        self.sets.keys()
    }

    /// Parse rule sets from a JSON object of the shape
    /// `{ "<rule-set id>": { "<rule id>": <rule>, ... }, ... }`.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::Json`] if the document is not a
    /// mapping-of-mappings of valid rules.
    pub fn from_json(input: &str) -> Result<Self, CrosscheckError> {
        let sets: Self = serde_json::from_str(input)?;
        info!(
            rule_sets = sets.len(),
            rules = sets.rule_count(),
            "loaded rule sets"
        );
        Ok(sets)
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

impl fmt::Display for RuleSets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RuleSets({} rule sets, {} rules)",
            self.sets.len(),
            self.rule_count()
        )
    }
}
