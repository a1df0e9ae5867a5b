/// Scalar coercion contracts
///
/// A `Coercing` implementation converts values between three representations:
/// the wire value (GraphQL literal or JSON variable), the internal value used
/// for comparisons, and the value persisted in the store column.
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercingError {
    #[error("Expected {expected} for scalar '{scalar}' but got {found}")]
    UnexpectedType {
        scalar: String,
        expected: &'static str,
        found: String,
    },
    #[error("Invalid {scalar} value '{value}': {reason}")]
    InvalidFormat {
        scalar: String,
        value: String,
        reason: String,
    },
}

/// How a scalar's values are laid out in the store column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageRepr {
    /// Column holds the value in its native type
    Native,
    /// Column holds a serialized text encoding (e.g. JSON text)
    EncodedText,
}

/// Family of a scalar, drives which filter operators are offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    DateTime,
    /// Semi-structured payloads whose concrete shape is only known at runtime
    Opaque,
}

impl ScalarKind {
    pub fn is_ordered(&self) -> bool {
        !matches!(self, ScalarKind::Boolean | ScalarKind::Opaque)
    }
}

pub trait Coercing: Send + Sync + fmt::Debug {
    /// Convert an inline document literal (already lowered to JSON) into the internal value.
    fn parse_literal(&self, literal: &Value) -> Result<Value, CoercingError>;

    /// Convert a raw variable value into the internal value.
    fn parse_value(&self, input: &Value) -> Result<Value, CoercingError>;

    /// Convert a stored column value into its output representation.
    fn serialize(&self, stored: &Value) -> Result<Value, CoercingError>;

    /// Encode an internal value the same way the store persists it.
    fn encode_for_store(&self, internal: &Value) -> Value {
        internal.clone()
    }

    /// Text used as the needle of a substring search.
    fn text_projection(&self, internal: &Value) -> String {
        match internal {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
    .to_string()
}

/// Pass-through coercion for ordinary scalars with per-kind validation.
#[derive(Debug, Clone)]
pub struct PassThroughCoercing {
    scalar: String,
    kind: ScalarKind,
}

impl PassThroughCoercing {
    pub fn new(scalar: impl Into<String>, kind: ScalarKind) -> Self {
        PassThroughCoercing {
            scalar: scalar.into(),
            kind,
        }
    }

    fn unexpected(&self, expected: &'static str, found: &Value) -> CoercingError {
        CoercingError::UnexpectedType {
            scalar: self.scalar.clone(),
            expected,
            found: type_name(found),
        }
    }

    fn invalid(&self, value: &str, reason: impl ToString) -> CoercingError {
        CoercingError::InvalidFormat {
            scalar: self.scalar.clone(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }

    fn check(&self, value: &Value, lenient: bool) -> Result<Value, CoercingError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        match self.kind {
            ScalarKind::Text => match value {
                Value::String(_) => Ok(value.clone()),
                // IDs are frequently numeric on the wire
                Value::Number(n) if lenient || self.scalar == "ID" => Ok(Value::String(n.to_string())),
                _ => Err(self.unexpected("string", value)),
            },
            ScalarKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
                Value::String(s) if lenient => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|e| self.invalid(s, e)),
                _ => Err(self.unexpected("integer", value)),
            },
            ScalarKind::Float => match value {
                Value::Number(_) => Ok(value.clone()),
                Value::String(s) if lenient => s
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| self.invalid(s, e))
                    .and_then(|f| {
                        serde_json::Number::from_f64(f)
                            .map(Value::Number)
                            .ok_or_else(|| self.invalid(s, "non-finite float"))
                    }),
                _ => Err(self.unexpected("number", value)),
            },
            ScalarKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) if lenient => match s.as_str() {
                    "true" => Ok(Value::Bool(true)),
                    "false" => Ok(Value::Bool(false)),
                    _ => Err(self.invalid(s, "expected true or false")),
                },
                _ => Err(self.unexpected("boolean", value)),
            },
            ScalarKind::Date => match value {
                Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(|_| value.clone())
                    .map_err(|e| self.invalid(s, e)),
                _ => Err(self.unexpected("date string", value)),
            },
            ScalarKind::DateTime => match value {
                Value::String(s) => {
                    let parsed = DateTime::parse_from_rfc3339(s)
                        .map(|_| ())
                        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|_| ()));
                    parsed.map(|_| value.clone()).map_err(|e| self.invalid(s, e))
                }
                _ => Err(self.unexpected("date-time string", value)),
            },
            ScalarKind::Opaque => Ok(value.clone()),
        }
    }
}

impl Coercing for PassThroughCoercing {
    fn parse_literal(&self, literal: &Value) -> Result<Value, CoercingError> {
        self.check(literal, false)
    }

    fn parse_value(&self, input: &Value) -> Result<Value, CoercingError> {
        self.check(input, true)
    }

    /// Stores hand booleans back as 0/1 and 64-bit integers as quoted text;
    /// anything else that does not fit the scalar is a decode failure.
    fn serialize(&self, stored: &Value) -> Result<Value, CoercingError> {
        match (self.kind, stored) {
            (ScalarKind::Boolean, Value::Number(n)) => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(self.invalid(&n.to_string(), "expected 0 or 1")),
            },
            _ => self.check(stored, true),
        }
    }
}

/// Coercion for opaque payloads (JSON documents, dynamically typed variables).
///
/// Values keep their structured form internally and are persisted as JSON text.
#[derive(Debug, Clone, Default)]
pub struct ObjectCoercing;

impl Coercing for ObjectCoercing {
    fn parse_literal(&self, literal: &Value) -> Result<Value, CoercingError> {
        Ok(literal.clone())
    }

    fn parse_value(&self, input: &Value) -> Result<Value, CoercingError> {
        Ok(input.clone())
    }

    fn serialize(&self, stored: &Value) -> Result<Value, CoercingError> {
        match stored {
            Value::String(text) => Ok(serde_json::from_str(text).unwrap_or_else(|_| stored.clone())),
            other => Ok(other.clone()),
        }
    }

    fn encode_for_store(&self, internal: &Value) -> Value {
        Value::String(internal.to_string())
    }
}
