use crate::error::VisibilityError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One rule of a `data-field-visibility-conditions` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityCondition {
    /// Name of the controller field.
    pub field: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

impl VisibilityCondition {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: Operator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self { field: field.into(), operator, value: value.into() }
    }
}

/// Comparison operator. Unrecognized operators are kept verbatim and never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    Unknown(String),
}

impl Operator {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Unknown(raw) => raw,
        }
    }
}

impl From<&str> for Operator {
    fn from(raw: &str) -> Self {
        match raw {
            "=" => Self::Eq,
            "!=" => Self::NotEq,
            ">" => Self::Gt,
            ">=" => Self::GtEq,
            "<" => Self::Lt,
            "<=" => Self::LtEq,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

impl From<String> for Operator {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        match operator {
            Operator::Unknown(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal a controller value is compared against. Only JSON scalars are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum ConditionValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl TryFrom<Value> for ConditionValue {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::Bool(b) => Ok(Self::Bool(b)),
            Value::Number(n) => n
                .as_f64()
                .map(Self::Number)
                .ok_or_else(|| format!("number {n} is not representable")),
            Value::String(s) => Ok(Self::String(s)),
            Value::Array(_) | Value::Object(_) => {
                Err("condition value must be a string, number, boolean or null".to_owned())
            },
        }
    }
}

impl From<ConditionValue> for Value {
    fn from(value: ConditionValue) -> Self {
        match value {
            ConditionValue::Null => Self::Null,
            ConditionValue::Bool(b) => Self::Bool(b),
            ConditionValue::Number(n) => {
                serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
            },
            ConditionValue::String(s) => Self::String(s),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<f64> for ConditionValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Parses a raw conditions attribute.
///
/// # Errors
/// [`VisibilityError::Condition`] for malformed JSON, missing keys or non-scalar values, and
/// [`VisibilityError::EmptyConditions`] for an empty list.
pub fn parse_conditions(raw: &str) -> Result<Vec<VisibilityCondition>, VisibilityError> {
    let conditions: Vec<VisibilityCondition> = serde_json::from_str(raw)?;
    if conditions.is_empty() {
        return Err(VisibilityError::EmptyConditions {
            message: format!("no condition in {raw:?}").into(),
            context: None,
        });
    }
    Ok(conditions)
}
