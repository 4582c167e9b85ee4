//! Evaluate DCC business rule sets against a certificate payload.
//!
//! Every rule of every rule set is evaluated against one shared context;
//! each rule ends up satisfied, violated or errored, and each rule set gets
//! the strict conjunction of its rules. See [`Crosscheck`] to get started.

pub mod certlogic;
mod engine;
mod error;
mod evaluate;
pub mod json;
pub mod report;
mod types;

pub use certlogic::{CertLogic, CertLogicError};
pub use engine::Crosscheck;
pub use error::CrosscheckError;
pub use evaluate::{evaluate_rule_sets, evaluate_safe, LogicEvaluator};
pub use types::{
    Description, EvaluationContext, EvaluationError, EvaluationResults, ExternalParameters,
    OutcomeStatus, Rule, RuleOutcome, RuleSet, RuleSetVerdict, RuleSets, ValueSets,
};
