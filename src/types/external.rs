use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::CrosscheckError;

/// Caller-supplied named values merged into the `external` part of the
/// evaluation context, e.g. the validation clock.
///
/// The set of names is open: anything set here is addressable by rule
/// expressions as `external.<name>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalParameters {
    params: Map<String, Value>,
}

impl ExternalParameters {
    /// Name of the parameter holding the instant at which a certificate is validated.
    pub const VALIDATION_CLOCK: &'static str = "validationClock";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value.
    #[must_use]
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.params.insert(name.into(), value)
    }

    /// Set `validationClock` to the given instant, rendered as ISO-8601 UTC
    /// with millisecond precision (`2021-06-01T12:00:00.000Z`).
    #[must_use]
    pub fn with_validation_clock(self, clock: DateTime<Utc>) -> Self {
        self.set(
            Self::VALIDATION_CLOCK,
            clock.to_rfc3339_opts(SecondsFormat::Millis, true),
        )
    }

    /// Parse an RFC 3339 timestamp and set it as `validationClock`.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::InvalidClock`] if `clock` is not RFC 3339.
    pub fn with_validation_clock_str(self, clock: &str) -> Result<Self, CrosscheckError> {
        let parsed =
            DateTime::parse_from_rfc3339(clock).map_err(|source| CrosscheckError::InvalidClock {
                value: clock.to_owned(),
                source,
            })?;
        Ok(self.with_validation_clock(parsed.with_timezone(&Utc)))
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    #[must_use]
    pub fn validation_clock(&self) -> Option<&str> {
        self.get(Self::VALIDATION_CLOCK).and_then(Value::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse a `NAME=VALUE` assignment. `VALUE` is read as JSON when it parses
    /// as such and kept as a plain string otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`CrosscheckError::InvalidParameter`] when there is no `=` or
    /// the name is empty.
    pub fn parse_assignment(input: &str) -> Result<(String, Value), CrosscheckError> {
        let invalid = || CrosscheckError::InvalidParameter {
            input: input.to_owned(),
        };
        let (name, raw) = input.split_once('=').ok_or_else(invalid)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid());
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
        Ok((name.to_owned(), value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ExternalParameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(ExternalParameters::new(), |params, (k, v)| params.set(k, v))
    }
}

impl fmt::Display for ExternalParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", rendered.join(", "))
    }
}
