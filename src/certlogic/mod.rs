//! A CertLogic interpreter covering the operations used by DCC business rules.
//!
//! ```
//! use serde_json::json;
//!
//! let data = json!({ "payload": { "v": [{ "dn": 2, "sd": 2 }] } });
//! let expr = json!({ ">=": [{ "var": "payload.v.0.dn" }, { "var": "payload.v.0.sd" }] });
//! assert_eq!(crosscheck::certlogic::evaluate(&expr, &data), Ok(json!(true)));
//! ```

mod datum;
mod error;
mod grammar;
mod interpreter;
mod time;

use serde_json::Value;

pub use error::CertLogicError;

use crate::evaluate::LogicEvaluator;
use crate::EvaluationError;

/// Evaluate a CertLogic expression against a data value.
///
/// Date-times produced by `plusTime` or `dccDateOfBirth` that end up as the
/// result are rendered as RFC 3339 strings with millisecond precision.
pub fn evaluate(expr: &Value, data: &Value) -> Result<Value, CertLogicError> {
    interpreter::evaluate(expr, data).map(datum::Datum::into_json)
}

/// The built-in [`LogicEvaluator`]. Stateless, so it is freely shared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CertLogic;

impl LogicEvaluator for CertLogic {
    fn evaluate(&self, expr: &Value, data: &Value) -> Result<Value, EvaluationError> {
        Ok(evaluate(expr, data)?)
    }
}
