//! Closed conversion table between incoming values and declared field types.
//!
//! Every `(ValueKind, FieldType)` pair resolves to exactly one [`Conversion`].
//! Pairs missing from the table are rejected; there is no implicit
//! "convertible to" fallback.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::FieldType;

/// Largest integer magnitude an `f64` represents exactly.
const F64_EXACT_INT: u64 = 1 << 53;
/// Largest integer magnitude an `f32` represents exactly.
const F32_EXACT_INT: u64 = 1 << 24;

/// Which numeric conversions beyond identity are allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoercionPolicy {
    /// Only identity conversions.
    Strict,
    /// Identity plus exact integer to float widening.
    #[default]
    Widening,
}

impl CoercionPolicy {
    /// Whether widening conversions are accepted.
    pub fn allows_widening(self) -> bool {
        matches!(self, CoercionPolicy::Widening)
    }
}

/// Dynamic kind of an incoming value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Integer,
    Float,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classifies a JSON value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(n) if n.is_f64() => ValueKind::Float,
            Value::Number(_) => ValueKind::Integer,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// Outcome of looking up a pair in the conversion table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same kind. Integers are still range checked and floats stored in an
    /// `f32` must round-trip exactly. Containers convert element by element.
    Identity,
    /// Integer into a float field, only when exactly representable.
    Widening,
    /// Not convertible.
    Rejected,
}

impl Conversion {
    pub fn is_allowed(self) -> bool {
        !matches!(self, Conversion::Rejected)
    }
}

/// Looks up the conversion of a value kind into a declared type.
pub fn classify(kind: ValueKind, target: &FieldType, policy: CoercionPolicy) -> Conversion {
    use FieldType as T;
    use ValueKind as K;

    match (kind, target) {
        (K::Null, _) => Conversion::Rejected,
        (kind, T::Optional(inner)) => classify(kind, inner, policy),
        (_, T::Any) => Conversion::Identity,
        (K::Bool, T::Bool) => Conversion::Identity,
        (K::Integer, t) if t.is_integer() => Conversion::Identity,
        (K::Integer, T::F32 | T::F64) if policy.allows_widening() => Conversion::Widening,
        (K::Float, T::F32 | T::F64) => Conversion::Identity,
        (K::String, T::String) => Conversion::Identity,
        (K::Array, T::List(_)) => Conversion::Identity,
        (K::Object, T::Map(_) | T::Record(_)) => Conversion::Identity,
        _ => Conversion::Rejected,
    }
}

/// Checks a value against the table for a declared type.
pub fn admits(value: &Value, target: &FieldType, policy: CoercionPolicy) -> bool {
    classify(ValueKind::of(value), target, policy).is_allowed()
}

/// Reads an integer number as `i128` so every integer width can be range
/// checked the same way.
pub(crate) fn integer(value: &Value) -> Option<i128> {
    let Value::Number(number) = value else {
        return None;
    };
    if number.is_f64() {
        return None;
    }
    number
        .as_i64()
        .map(i128::from)
        .or_else(|| number.as_u64().map(i128::from))
}

/// Reads a number as a float field of the given precision.
pub(crate) fn float(value: &Value, target: &FieldType, policy: CoercionPolicy) -> Option<f64> {
    let Value::Number(number) = value else {
        return None;
    };
    match classify(ValueKind::of(value), target, policy) {
        Conversion::Identity => {
            let wide = number.as_f64()?;
            // Narrowing into f32 must be exact, like integer widening.
            if matches!(target, FieldType::F32) && f64::from(wide as f32) != wide {
                return None;
            }
            Some(wide)
        }
        Conversion::Widening => {
            let limit = if matches!(target, FieldType::F32) { F32_EXACT_INT } else { F64_EXACT_INT };
            let magnitude = integer(value)?.unsigned_abs();
            if magnitude <= u128::from(limit) {
                number.as_f64()
            } else {
                None
            }
        }
        Conversion::Rejected => None,
    }
}
