//! Raw and coerced env values.

use std::fmt;

use serde::{Serialize, Serializer};

/// A value as handed back by a runtime's variable accessor.
///
/// Process and deno environments only ever produce `Str`. Worker global scope
/// may hold numbers and booleans bound by the platform.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Str(String),
    Num(f64),
    Bool(bool),
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Str(s.to_string())
    }
}

impl From<String> for RawValue {
    fn from(s: String) -> Self {
        RawValue::Str(s)
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Num(n)
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

/// A coerced value stored in the namespace.
#[derive(Debug, Clone)]
pub enum EnvValue {
    Str(String),
    Bool(bool),
    /// May be NaN when the raw input was absent or not numeric.
    Num(f64),
}

impl EnvValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            EnvValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EnvValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EnvValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// True for a `Num` holding NaN (absent or unparsable numeric input).
    pub fn is_nan(&self) -> bool {
        matches!(self, EnvValue::Num(n) if n.is_nan())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            EnvValue::Str(_) => "string",
            EnvValue::Bool(_) => "boolean",
            EnvValue::Num(_) => "number",
        }
    }
}

// NaN == NaN here: two loads over the same input must compare equal.
impl PartialEq for EnvValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EnvValue::Str(a), EnvValue::Str(b)) => a == b,
            (EnvValue::Bool(a), EnvValue::Bool(b)) => a == b,
            (EnvValue::Num(a), EnvValue::Num(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => false,
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Str(s) => f.write_str(s),
            EnvValue::Bool(b) => write!(f, "{}", b),
            EnvValue::Num(n) => write!(f, "{}", n),
        }
    }
}

impl Serialize for EnvValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EnvValue::Str(s) => serializer.serialize_str(s),
            EnvValue::Bool(b) => serializer.serialize_bool(*b),
            EnvValue::Num(n) => serializer.serialize_f64(*n),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(s: &str) -> Self {
        EnvValue::Str(s.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(s: String) -> Self {
        EnvValue::Str(s)
    }
}

impl From<bool> for EnvValue {
    fn from(b: bool) -> Self {
        EnvValue::Bool(b)
    }
}

impl From<f64> for EnvValue {
    fn from(n: f64) -> Self {
        EnvValue::Num(n)
    }
}
