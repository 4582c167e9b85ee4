mod context;
mod error;
mod external;
mod outcome;
mod registry;
mod rule;
mod ruleset;
mod value_sets;
mod verdict;

pub use context::EvaluationContext;
pub use error::EvaluationError;
pub use external::ExternalParameters;
pub use outcome::{OutcomeStatus, RuleOutcome};
pub(crate) use registry::Registry;
pub use rule::{Description, Rule};
pub use ruleset::{RuleSet, RuleSets};
pub use value_sets::ValueSets;
pub use verdict::{EvaluationResults, RuleSetVerdict};
