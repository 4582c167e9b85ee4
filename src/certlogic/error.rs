use thiserror::Error;

use crate::EvaluationError;

/// Faults raised while interpreting a CertLogic expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CertLogicError {
    #[error("invalid CertLogic expression: {0}")]
    InvalidExpression(String),

    #[error("unrecognised expression object encountered")]
    UnrecognisedObject,

    #[error("not of the form {{ \"var\": \"<path>\" }}")]
    MalformedVar,

    #[error("operation not of the form {{ \"{operator}\": [ <values...> ] }}")]
    MalformedOperation { operator: String },

    #[error("unrecognised operator: \"{0}\"")]
    UnrecognisedOperator(String),

    #[error("an operation with operator \"{operator}\" must have {expected} operands")]
    OperandCount {
        operator: String,
        expected: &'static str,
    },

    #[error("an if-operation must have a then (argument #2)")]
    MissingThen,

    #[error("an if-operation must have an else (argument #3)")]
    MissingElse,

    #[error("right-hand side of an \"in\" operation must be an array")]
    InOperandNotArray,

    #[error("{side}-hand side of a \"+\" operation must be an integer")]
    PlusOperandNotInteger { side: &'static str },

    #[error("integer overflow in a \"+\" operation")]
    IntegerOverflow,

    #[error("all operands of a comparison operation must be integers")]
    ComparisonOperandsNotIntegers,

    #[error("all operands of a date-time comparison must be date-times")]
    DateTimeComparisonOperands,

    #[error("\"amount\" argument (#2) of \"plusTime\" must be an integer")]
    PlusTimeAmount,

    #[error("\"unit\" argument (#3) of \"plusTime\" must be a string equal to one of year, month, day, hour")]
    PlusTimeUnit,

    #[error("date argument of \"plusTime\" must be a string or a date-time")]
    PlusTimeDate,

    #[error("not an allowed date or date-time format: {0}")]
    InvalidDateTime(String),

    #[error("date-time arithmetic out of range")]
    DateTimeOutOfRange,

    #[error("operand of reduce evaluated to a non-null non-array")]
    ReduceOperand,

    #[error("\"UVCI\" argument (#1) of \"extractFromUVCI\" must be either a string or null")]
    UvciOperand,

    #[error("\"index\" argument (#2) of \"extractFromUVCI\" must be an integer")]
    UvciIndex,

    #[error("operand of \"dccDateOfBirth\" must be a string")]
    DateOfBirthOperand,

    #[error("not a valid date of birth: {0}")]
    InvalidDateOfBirth(String),
}

impl From<CertLogicError> for EvaluationError {
    fn from(err: CertLogicError) -> Self {
        EvaluationError::new(err.to_string())
    }
}
