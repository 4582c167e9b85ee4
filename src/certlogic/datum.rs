use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde_json::Value;

/// An intermediate CertLogic value.
///
/// Date-times only exist inside an evaluation (they come out of `plusTime`
/// and `dccDateOfBirth`), and array literals may hold them, so both get
/// their own variants next to plain JSON.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Datum {
    Json(Value),
    Array(Vec<Datum>),
    DateTime(DateTime<FixedOffset>),
}

impl Datum {
    pub(crate) const NULL: Datum = Datum::Json(Value::Null);

    pub(crate) fn bool(value: bool) -> Self {
        Datum::Json(Value::Bool(value))
    }

    /// `false`, `null`, `""`, `0`, empty arrays and empty objects are falsy;
    /// everything else, date-times included, is truthy.
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Datum::Json(Value::Null) => false,
            Datum::Json(Value::Bool(b)) => *b,
            Datum::Json(Value::String(s)) => !s.is_empty(),
            Datum::Json(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
            Datum::Json(Value::Array(items)) => !items.is_empty(),
            Datum::Json(Value::Object(map)) => !map.is_empty(),
            Datum::Array(items) => !items.is_empty(),
            Datum::DateTime(_) => true,
        }
    }

    pub(crate) fn as_integer(&self) -> Option<i64> {
        match self {
            Datum::Json(Value::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub(crate) fn as_date_time(&self) -> Option<DateTime<FixedOffset>> {
        match self {
            Datum::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Strict (`===`) equality. Numbers compare by value, date-times by
    /// instant, arrays and objects structurally.
    pub(crate) fn strict_equals(&self, other: &Datum) -> bool {
        match (self, other) {
            (Datum::DateTime(a), Datum::DateTime(b)) => a == b,
            (Datum::Json(a), Datum::Json(b)) => json_equals(a, b),
            (Datum::Array(a), Datum::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.strict_equals(y))
            }
            (Datum::Array(a), Datum::Json(Value::Array(b)))
            | (Datum::Json(Value::Array(b)), Datum::Array(a)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals_json(y))
            }
            _ => false,
        }
    }

    pub(crate) fn equals_json(&self, other: &Value) -> bool {
        match self {
            Datum::Json(value) => json_equals(value, other),
            Datum::Array(items) => match other {
                Value::Array(others) => {
                    items.len() == others.len()
                        && items.iter().zip(others).all(|(x, y)| x.equals_json(y))
                }
                _ => false,
            },
            Datum::DateTime(_) => false,
        }
    }

    /// Render as JSON; date-times become RFC 3339 strings with milliseconds.
    pub(crate) fn into_json(self) -> Value {
        match self {
            Datum::Json(value) => value,
            Datum::Array(items) => Value::Array(items.into_iter().map(Datum::into_json).collect()),
            Datum::DateTime(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    pub(crate) fn to_json(&self) -> Value {
        self.clone().into_json()
    }
}

fn json_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => x.as_f64() == y.as_f64(),
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| json_equals(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, v)| y.get(k).is_some_and(|w| json_equals(v, w)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::certlogic::grammar::parse_date_time;

    #[test]
    fn truthiness() {
        for falsy in [json!(false), json!(null), json!(""), json!(0), json!([]), json!({})] {
            assert!(!Datum::Json(falsy.clone()).is_truthy(), "{falsy} is truthy");
        }
        for truthy in [json!(true), json!("x"), json!(-1), json!([0]), json!({ "a": 0 })] {
            assert!(Datum::Json(truthy.clone()).is_truthy(), "{truthy} is falsy");
        }
        assert!(!Datum::Array(vec![]).is_truthy());
        assert!(Datum::DateTime(parse_date_time("2021-01-01").unwrap()).is_truthy());
    }

    #[test]
    fn integers_only() {
        assert_eq!(Datum::Json(json!(3)).as_integer(), Some(3));
        assert_eq!(Datum::Json(json!(3.5)).as_integer(), None);
        assert_eq!(Datum::Json(json!("3")).as_integer(), None);
    }

    #[test]
    fn strict_equality() {
        assert!(Datum::Json(json!(1)).strict_equals(&Datum::Json(json!(1.0))));
        assert!(!Datum::Json(json!(1)).strict_equals(&Datum::Json(json!("1"))));
        assert!(Datum::Json(json!(null)).strict_equals(&Datum::NULL));
        assert!(Datum::Array(vec![Datum::Json(json!("a"))]).strict_equals(&Datum::Json(json!(["a"]))));

        let a = parse_date_time("2021-01-01T02:00:00+02:00").unwrap();
        let b = parse_date_time("2021-01-01T00:00:00Z").unwrap();
        assert!(Datum::DateTime(a).strict_equals(&Datum::DateTime(b)));
        assert!(!Datum::DateTime(b).strict_equals(&Datum::Json(json!("2021-01-01"))));
    }

    #[test]
    fn into_json_renders_date_times() {
        let dt = parse_date_time("2021-06-01T12:00:00Z").unwrap();
        assert_eq!(
            Datum::Array(vec![Datum::DateTime(dt), Datum::bool(true)]).into_json(),
            json!(["2021-06-01T12:00:00.000Z", true])
        );
    }
}
