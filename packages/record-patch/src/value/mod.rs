//! Declared field types, value conversion, and incoming value bags.

mod bag;
pub mod coerce;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

pub use bag::ValuesBag;
pub use coerce::{CoercionPolicy, Conversion, ValueKind};

/// Declared type of a record field.
///
/// Rendered as a short type tag (`"u64"`, `"string"`, `"list<string>"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    /// Homogeneous sequence
    List(Box<FieldType>),
    /// String-keyed map
    Map(Box<FieldType>),
    /// Nullable value
    Optional(Box<FieldType>),
    /// Nested record, by type name
    Record(&'static str),
    /// Untyped JSON value
    Any,
}

impl FieldType {
    /// Whether this is one of the integer types.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldType::I8
                | FieldType::I16
                | FieldType::I32
                | FieldType::I64
                | FieldType::U8
                | FieldType::U16
                | FieldType::U32
                | FieldType::U64
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::I8 => f.write_str("i8"),
            FieldType::I16 => f.write_str("i16"),
            FieldType::I32 => f.write_str("i32"),
            FieldType::I64 => f.write_str("i64"),
            FieldType::U8 => f.write_str("u8"),
            FieldType::U16 => f.write_str("u16"),
            FieldType::U32 => f.write_str("u32"),
            FieldType::U64 => f.write_str("u64"),
            FieldType::F32 => f.write_str("f32"),
            FieldType::F64 => f.write_str("f64"),
            FieldType::String => f.write_str("string"),
            FieldType::List(inner) => write!(f, "list<{}>", inner),
            FieldType::Map(inner) => write!(f, "map<{}>", inner),
            FieldType::Optional(inner) => write!(f, "option<{}>", inner),
            FieldType::Record(name) => write!(f, "record<{}>", name),
            FieldType::Any => f.write_str("any"),
        }
    }
}

/// A Rust type usable as a record field.
///
/// `from_value` implements the rows of the conversion table in [`coerce`]
/// for this type and returns `None` for every rejected value.
pub trait FieldValue: Sized {
    /// Declared type tag.
    fn field_type() -> FieldType;

    /// Converts the field into its dynamic representation.
    fn to_value(&self) -> Value;

    /// Converts an incoming value, or rejects it.
    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self>;
}

macro_rules! impl_integer_field {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn field_type() -> FieldType {
                    FieldType::$tag
                }

                fn to_value(&self) -> Value {
                    Value::from(*self)
                }

                fn from_value(value: &Value, _policy: CoercionPolicy) -> Option<Self> {
                    <$ty>::try_from(coerce::integer(value)?).ok()
                }
            }
        )*
    };
}

impl_integer_field!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::F64
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        coerce::float(value, &FieldType::F64, policy)
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::F32
    }

    fn to_value(&self) -> Value {
        Value::from(f64::from(*self))
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        coerce::float(value, &FieldType::F32, policy).map(|exact| exact as f32)
    }
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value, _policy: CoercionPolicy) -> Option<Self> {
        value.as_bool()
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::String
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_value(value: &Value, _policy: CoercionPolicy) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FieldValue for Value {
    fn field_type() -> FieldType {
        FieldType::Any
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: &Value, _policy: CoercionPolicy) -> Option<Self> {
        (!value.is_null()).then(|| value.clone())
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::List(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        value
            .as_array()?
            .iter()
            .map(|item| T::from_value(item, policy))
            .collect()
    }
}

impl<T: FieldValue> FieldValue for HashMap<String, T> {
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        let mut entries: Vec<(&String, &T)> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Value::Object(
            entries
                .into_iter()
                .map(|(key, item)| (key.clone(), item.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        map_entries(value, policy)
    }
}

impl<T: FieldValue> FieldValue for BTreeMap<String, T> {
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Object(
            self.iter()
                .map(|(key, item)| (key.clone(), item.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        map_entries(value, policy)
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn field_type() -> FieldType {
        FieldType::Optional(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_value(value, policy).map(Some)
    }
}

impl<T: FieldValue> FieldValue for Box<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        T::from_value(value, policy).map(Box::new)
    }
}

impl<T: FieldValue> FieldValue for Arc<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn from_value(value: &Value, policy: CoercionPolicy) -> Option<Self> {
        T::from_value(value, policy).map(Arc::new)
    }
}

fn map_entries<T, M>(value: &Value, policy: CoercionPolicy) -> Option<M>
where
    T: FieldValue,
    M: FromIterator<(String, T)>,
{
    let object: &Map<String, Value> = value.as_object()?;
    object
        .iter()
        .map(|(key, item)| T::from_value(item, policy).map(|converted| (key.clone(), converted)))
        .collect()
}
