//! Comparison types and value coercion.

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::param::value::{Value, ValueKind};

/// Type a parameter value is validated against and coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonType {
    Boolean,
    Integer,
    Float,
    String,
    List,
}

/// How a parameter is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonMode {
    /// Presence of the name is enough.
    NameOnly,
    /// The value must be valid for (and coercible to) the comparison type.
    TypeOnly,
    /// The coerced value must equal the stored comparison value.
    ValueType,
}

impl ComparisonType {
    pub const ALL: [ComparisonType; 5] = [
        ComparisonType::Boolean,
        ComparisonType::Integer,
        ComparisonType::Float,
        ComparisonType::String,
        ComparisonType::List,
    ];

    /// Comparison type inferred from a comparison value. Null and maps have none.
    pub fn of(value: &Value) -> Option<Self> {
        match value.kind() {
            ValueKind::Bool => Some(ComparisonType::Boolean),
            ValueKind::Int => Some(ComparisonType::Integer),
            ValueKind::Float => Some(ComparisonType::Float),
            ValueKind::String => Some(ComparisonType::String),
            ValueKind::List => Some(ComparisonType::List),
            ValueKind::Null | ValueKind::Map => None,
        }
    }

    /// Whether `value` satisfies this type's predicate.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            ComparisonType::Boolean => parse_bool(value).is_some(),
            ComparisonType::Integer | ComparisonType::Float => value.is_numeric(),
            ComparisonType::String => value.is_scalar(),
            ComparisonType::List => true,
        }
    }

    /// Coerces `value` into this type, or `None` when it cannot be represented.
    pub fn try_convert(self, value: &Value) -> Option<Value> {
        match self {
            ComparisonType::List => {
                let items = match value {
                    Value::List(items) => items.clone(),
                    other => vec![other.clone()],
                };
                Some(Value::List(
                    items
                        .into_iter()
                        .filter(|item| item.as_str() != Some(""))
                        .collect(),
                ))
            }
            ComparisonType::Boolean => parse_bool(value).map(Value::Bool),
            ComparisonType::Integer => match value {
                Value::Int(i) => Some(Value::Int(*i)),
                Value::String(s) => match s.trim().parse::<i64>() {
                    Ok(i) => Some(Value::Int(i)),
                    Err(_) => value.as_f64().map(|f| Value::Int(f as i64)),
                },
                other => other.as_f64().map(|f| Value::Int(f as i64)),
            },
            ComparisonType::Float => value.as_f64().map(Value::Float),
            ComparisonType::String => scalar_to_string(value).map(Value::String),
        }
    }

    /// Canonical name, as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            ComparisonType::Boolean => "boolean",
            ComparisonType::Integer => "integer",
            ComparisonType::Float => "float",
            ComparisonType::String => "string",
            ComparisonType::List => "list",
        }
    }
}

impl fmt::Display for ComparisonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ComparisonType {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bool" | "boolean" => Ok(ComparisonType::Boolean),
            "int" | "integer" => Ok(ComparisonType::Integer),
            "float" => Ok(ComparisonType::Float),
            "string" => Ok(ComparisonType::String),
            "array" | "list" => Ok(ComparisonType::List),
            other => Err(PathError::UnknownType(other.to_string())),
        }
    }
}

/// Boolean tokens are case-sensitive. Numbers count only when equal to 1 or 0.
fn parse_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "true" | "yes" | "on" => Some(true),
            "false" | "no" | "off" => Some(false),
            _ => numeric_bool(value),
        },
        Value::Int(_) | Value::Float(_) => numeric_bool(value),
        _ => None,
    }
}

fn numeric_bool(value: &Value) -> Option<bool> {
    match value.as_f64() {
        Some(f) if f == 1.0 => Some(true),
        Some(f) if f == 0.0 => Some(false),
        _ => None,
    }
}

/// String form of a scalar. Null, lists and maps have none.
pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::List(_) | Value::Map(_) => None,
    }
}
