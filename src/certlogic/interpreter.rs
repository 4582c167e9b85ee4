use serde_json::{Map, Value};

use super::datum::Datum;
use super::error::CertLogicError;
use super::grammar::{parse_date_of_birth, parse_date_time};
use super::time::{plus_time, TimeUnit};

type Result<T> = std::result::Result<T, CertLogicError>;

const UVCI_PREFIX: &str = "URN:UVCI:";

/// What a `var` path is resolved against.
#[derive(Clone, Copy)]
enum Scope<'a> {
    Root(&'a Value),
    /// Inside a `reduce` lambda: `accumulator`, `current` and the outer `data`.
    Lambda {
        accumulator: &'a Datum,
        current: &'a Datum,
        data: &'a Value,
    },
}

#[derive(Clone, Copy)]
enum Comparison {
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
}

impl Comparison {
    fn holds<T: PartialOrd>(self, left: &T, right: &T) -> bool {
        match self {
            Comparison::Less => left < right,
            Comparison::Greater => left > right,
            Comparison::LessOrEqual => left <= right,
            Comparison::GreaterOrEqual => left >= right,
        }
    }

    fn from_integer_operator(operator: &str) -> Option<Self> {
        match operator {
            "<" => Some(Comparison::Less),
            ">" => Some(Comparison::Greater),
            "<=" => Some(Comparison::LessOrEqual),
            ">=" => Some(Comparison::GreaterOrEqual),
            _ => None,
        }
    }

    fn from_date_time_operator(operator: &str) -> Option<Self> {
        match operator {
            "before" => Some(Comparison::Less),
            "after" => Some(Comparison::Greater),
            "not-after" => Some(Comparison::LessOrEqual),
            "not-before" => Some(Comparison::GreaterOrEqual),
            _ => None,
        }
    }
}

/// Evaluate `expr` against `data`.
pub(crate) fn evaluate(expr: &Value, data: &Value) -> Result<Datum> {
    eval(expr, Scope::Root(data))
}

fn eval(expr: &Value, scope: Scope<'_>) -> Result<Datum> {
    match expr {
        Value::String(_) | Value::Bool(_) => Ok(Datum::Json(expr.clone())),
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Datum::Json(expr.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| eval(item, scope))
            .collect::<Result<Vec<_>>>()
            .map(Datum::Array),
        Value::Object(map) => eval_object(map, scope),
        Value::Null | Value::Number(_) => Err(CertLogicError::InvalidExpression(expr.to_string())),
    }
}

fn eval_object(map: &Map<String, Value>, scope: Scope<'_>) -> Result<Datum> {
    let mut entries = map.iter();
    let (operator, operand) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        _ => return Err(CertLogicError::UnrecognisedObject),
    };

    if operator == "var" {
        return match operand {
            Value::String(path) => Ok(resolve(path, scope)),
            _ => Err(CertLogicError::MalformedVar),
        };
    }

    let values = operand
        .as_array()
        .ok_or_else(|| CertLogicError::MalformedOperation {
            operator: operator.clone(),
        })?;

    match operator.as_str() {
        "if" => eval_if(values, scope),
        "===" => {
            let [left, right] = exactly::<2>(operator, values)?;
            Ok(Datum::bool(eval(left, scope)?.strict_equals(&eval(right, scope)?)))
        }
        "in" => eval_in(operator, values, scope),
        "+" => eval_plus(operator, values, scope),
        "and" => eval_and(operator, values, scope),
        "!" => {
            let [operand] = exactly::<1>(operator, values)?;
            Ok(Datum::bool(!eval(operand, scope)?.is_truthy()))
        }
        "plusTime" => eval_plus_time(operator, values, scope),
        "reduce" => eval_reduce(operator, values, scope),
        "extractFromUVCI" => eval_extract_from_uvci(operator, values, scope),
        "dccDateOfBirth" => eval_dcc_date_of_birth(operator, values, scope),
        op => {
            if let Some(comparison) = Comparison::from_integer_operator(op) {
                eval_integer_comparison(operator, comparison, values, scope)
            } else if let Some(comparison) = Comparison::from_date_time_operator(op) {
                eval_date_time_comparison(operator, comparison, values, scope)
            } else {
                Err(CertLogicError::UnrecognisedOperator(op.to_owned()))
            }
        }
    }
}

// -- Operand helpers --------------------------------------------------------

fn exactly<'v, const N: usize>(operator: &str, values: &'v [Value]) -> Result<&'v [Value; N]> {
    values
        .try_into()
        .map_err(|_| CertLogicError::OperandCount {
            operator: operator.to_owned(),
            expected: match N {
                1 => "exactly 1",
                2 => "exactly 2",
                _ => "exactly 3",
            },
        })
}

fn two_or_three(operator: &str, values: &[Value]) -> Result<()> {
    if matches!(values.len(), 2 | 3) {
        Ok(())
    } else {
        Err(CertLogicError::OperandCount {
            operator: operator.to_owned(),
            expected: "2 or 3",
        })
    }
}

// -- Variables --------------------------------------------------------------

fn resolve(path: &str, scope: Scope<'_>) -> Datum {
    if path.is_empty() {
        return match scope {
            Scope::Root(data) => Datum::Json(data.clone()),
            Scope::Lambda {
                accumulator,
                current,
                data,
            } => Datum::Json(Value::Object(Map::from_iter([
                ("accumulator".to_owned(), accumulator.to_json()),
                ("current".to_owned(), current.to_json()),
                ("data".to_owned(), data.clone()),
            ]))),
        };
    }

    let mut segments = path.split('.');
    match scope {
        Scope::Root(data) => resolve_json(data, segments),
        Scope::Lambda {
            accumulator,
            current,
            data,
        } => match segments.next() {
            Some("accumulator") => resolve_datum(accumulator, segments),
            Some("current") => resolve_datum(current, segments),
            Some("data") => resolve_json(data, segments),
            _ => Datum::NULL,
        },
    }
}

fn resolve_datum<'p>(datum: &Datum, mut segments: impl Iterator<Item = &'p str>) -> Datum {
    match datum {
        Datum::Json(value) => resolve_json(value, segments),
        Datum::Array(items) => match segments.next() {
            None => datum.clone(),
            Some(segment) => match segment.parse::<usize>().ok().and_then(|i| items.get(i)) {
                Some(item) => resolve_datum(item, segments),
                None => Datum::NULL,
            },
        },
        Datum::DateTime(_) => match segments.next() {
            None => datum.clone(),
            Some(_) => Datum::NULL,
        },
    }
}

fn resolve_json<'p>(data: &Value, segments: impl Iterator<Item = &'p str>) -> Datum {
    let mut current = data;
    for segment in segments {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Datum::NULL,
        }
    }
    Datum::Json(current.clone())
}

// -- Operations -------------------------------------------------------------

fn eval_if(values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    match values {
        [guard, then, otherwise] => {
            if eval(guard, scope)?.is_truthy() {
                eval(then, scope)
            } else {
                eval(otherwise, scope)
            }
        }
        [_, _] => Err(CertLogicError::MissingElse),
        [_] | [] => Err(CertLogicError::MissingThen),
        _ => Err(CertLogicError::OperandCount {
            operator: "if".to_owned(),
            expected: "exactly 3",
        }),
    }
}

fn eval_in(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [needle, haystack] = exactly::<2>(operator, values)?;
    let needle = eval(needle, scope)?;
    let found = match eval(haystack, scope)? {
        Datum::Array(items) => items.iter().any(|item| item.strict_equals(&needle)),
        Datum::Json(Value::Array(items)) => items
            .iter()
            .any(|item| Datum::Json(item.clone()).strict_equals(&needle)),
        _ => return Err(CertLogicError::InOperandNotArray),
    };
    Ok(Datum::bool(found))
}

fn eval_plus(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [left, right] = exactly::<2>(operator, values)?;
    let left = eval(left, scope)?
        .as_integer()
        .ok_or(CertLogicError::PlusOperandNotInteger { side: "left" })?;
    let right = eval(right, scope)?
        .as_integer()
        .ok_or(CertLogicError::PlusOperandNotInteger { side: "right" })?;
    left.checked_add(right)
        .map(|sum| Datum::Json(Value::from(sum)))
        .ok_or(CertLogicError::IntegerOverflow)
}

/// Returns the first falsy operand, or the last one when all are truthy.
fn eval_and(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    if values.len() < 2 {
        return Err(CertLogicError::OperandCount {
            operator: operator.to_owned(),
            expected: "at least 2",
        });
    }
    let mut result = Datum::bool(true);
    for value in values {
        result = eval(value, scope)?;
        if !result.is_truthy() {
            break;
        }
    }
    Ok(result)
}

fn eval_integer_comparison(
    operator: &str,
    comparison: Comparison,
    values: &[Value],
    scope: Scope<'_>,
) -> Result<Datum> {
    two_or_three(operator, values)?;
    let operands = values
        .iter()
        .map(|value| {
            eval(value, scope)?
                .as_integer()
                .ok_or(CertLogicError::ComparisonOperandsNotIntegers)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Datum::bool(
        operands.windows(2).all(|w| comparison.holds(&w[0], &w[1])),
    ))
}

fn eval_date_time_comparison(
    operator: &str,
    comparison: Comparison,
    values: &[Value],
    scope: Scope<'_>,
) -> Result<Datum> {
    two_or_three(operator, values)?;
    let operands = values
        .iter()
        .map(|value| {
            eval(value, scope)?
                .as_date_time()
                .ok_or(CertLogicError::DateTimeComparisonOperands)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Datum::bool(
        operands.windows(2).all(|w| comparison.holds(&w[0], &w[1])),
    ))
}

/// `amount` and `unit` are taken literally, only the date operand is
/// evaluated. It may be a date string or a date-time from `dccDateOfBirth`.
fn eval_plus_time(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [date, amount, unit] = exactly::<3>(operator, values)?;
    let amount = amount.as_i64().ok_or(CertLogicError::PlusTimeAmount)?;
    let unit: TimeUnit = unit.as_str().ok_or(CertLogicError::PlusTimeUnit)?.parse()?;
    let date = match eval(date, scope)? {
        Datum::Json(Value::String(text)) => parse_date_time(&text)?,
        Datum::DateTime(dt) => dt,
        _ => return Err(CertLogicError::PlusTimeDate),
    };
    plus_time(date, amount, unit).map(Datum::DateTime)
}

fn eval_reduce(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [operand, lambda, initial] = exactly::<3>(operator, values)?;
    let items: Vec<Datum> = match eval(operand, scope)? {
        Datum::Json(Value::Null) => return eval(initial, scope),
        Datum::Array(items) => items,
        Datum::Json(Value::Array(items)) => items.into_iter().map(Datum::Json).collect(),
        _ => return Err(CertLogicError::ReduceOperand),
    };
    let data = match scope {
        Scope::Root(data) | Scope::Lambda { data, .. } => data,
    };
    items
        .iter()
        .try_fold(eval(initial, scope)?, |accumulator, current| {
            eval(
                lambda,
                Scope::Lambda {
                    accumulator: &accumulator,
                    current,
                    data,
                },
            )
        })
}

fn eval_extract_from_uvci(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [uvci, index] = exactly::<2>(operator, values)?;
    let index = index.as_i64().ok_or(CertLogicError::UvciIndex)?;
    let uvci = match eval(uvci, scope)? {
        Datum::Json(Value::Null) => return Ok(Datum::NULL),
        Datum::Json(Value::String(text)) => text,
        _ => return Err(CertLogicError::UvciOperand),
    };
    let fragment = usize::try_from(index).ok().and_then(|index| {
        uvci.strip_prefix(UVCI_PREFIX)
            .unwrap_or(&uvci)
            .split(['/', '#', ':'])
            .nth(index)
            .map(str::to_owned)
    });
    Ok(fragment.map_or(Datum::NULL, |f| Datum::Json(Value::String(f))))
}

fn eval_dcc_date_of_birth(operator: &str, values: &[Value], scope: Scope<'_>) -> Result<Datum> {
    let [operand] = exactly::<1>(operator, values)?;
    let text = match eval(operand, scope)? {
        Datum::Json(Value::String(text)) => text,
        _ => return Err(CertLogicError::DateOfBirthOperand),
    };
    // Full date-times are accepted and truncated to their date.
    let date_of_birth = match parse_date_of_birth(&text) {
        Ok(dob) => dob,
        Err(err) => {
            let date = parse_date_time(&text).map_err(|_| err)?.date_naive();
            parse_date_of_birth(&date.to_string())?
        }
    };
    Ok(Datum::DateTime(date_of_birth))
}
