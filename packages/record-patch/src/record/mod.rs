//! Record capability traits and per-type field accessor tables.
//!
//! A record type exposes its fields through a static table of
//! [`FieldAccessor`]s instead of runtime reflection. The table is normally
//! generated by [`patch_record!`](crate::patch_record).

mod dynamic;
mod macros;

use std::any::Any;
use std::fmt;

use serde_json::{Map, Value};

use crate::fold::{fold_with, FoldMode};
use crate::value::{CoercionPolicy, FieldType};

/// Structural shape of a record-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Struct with declared fields.
    Struct,
    /// Key-addressable document without declared fields. Usable as a merge
    /// source, never as a schema sample.
    Map,
    /// Anything else.
    Opaque,
}

/// How a field's external name is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalName {
    /// Fold the field identifier.
    Default,
    /// Use this name verbatim.
    Explicit(&'static str),
}

/// Whether a field takes part in patching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    Included,
    Excluded,
}

/// Declared visibility of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// `pub`
    Public,
    /// `pub(crate)`, `pub(super)`, `pub(in ..)`
    Restricted,
    /// No modifier
    Private,
}

impl Visibility {
    /// Parses the stringified visibility token of a field declaration.
    pub const fn from_token(token: &str) -> Self {
        let bytes = token.as_bytes();
        if bytes.is_empty() {
            return Visibility::Private;
        }
        if bytes.len() == 3 && bytes[0] == b'p' && bytes[1] == b'u' && bytes[2] == b'b' {
            return Visibility::Public;
        }
        Visibility::Restricted
    }
}

/// Static accessor for one field of `T`.
pub struct FieldAccessor<T> {
    /// Field identifier as declared
    pub ident: &'static str,
    /// Declared type tag
    pub field_type: fn() -> FieldType,
    /// External name override
    pub name: ExternalName,
    /// Exclusion marker
    pub inclusion: Inclusion,
    /// Declared visibility
    pub visibility: Visibility,
    /// Reads the field as a dynamic value
    pub get: fn(&T) -> Value,
    /// Converts and writes a dynamic value; `false` when the value is rejected
    pub set: fn(&mut T, &Value, CoercionPolicy) -> bool,
}

impl<T> FieldAccessor<T> {
    /// Only public, non-excluded fields are patchable or readable by name.
    pub fn is_eligible(&self) -> bool {
        self.visibility == Visibility::Public && self.inclusion == Inclusion::Included
    }
}

impl<T> fmt::Debug for FieldAccessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("ident", &self.ident)
            .field("field_type", &(self.field_type)())
            .field("name", &self.name)
            .field("inclusion", &self.inclusion)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

/// Description of one declared field, as seen by the schema builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field identifier
    pub ident: &'static str,
    /// Declared type tag
    pub field_type: FieldType,
    /// External name override
    pub name: ExternalName,
    /// Exclusion marker
    pub inclusion: Inclusion,
    /// Declared visibility
    pub visibility: Visibility,
    /// Position in the accessor table
    pub slot: usize,
}

impl FieldSpec {
    /// Only public, non-excluded fields are patchable.
    pub fn is_eligible(&self) -> bool {
        self.visibility == Visibility::Public && self.inclusion == Inclusion::Included
    }

    /// External name under the given fold mode.
    pub fn external_name(&self, mode: FoldMode) -> String {
        match self.name {
            ExternalName::Explicit(name) => name.to_string(),
            ExternalName::Default => fold_with(self.ident, mode),
        }
    }
}

/// Record-like value the engine can read.
///
/// Object safe; implemented for generated record types, JSON documents, and
/// through `&`, `Box` and `Arc`.
pub trait Record {
    /// Type name used in errors and logs.
    fn type_name(&self) -> &'static str;

    /// Structural shape.
    fn shape(&self) -> Shape;

    /// Declared fields, `None` for values that are not struct-like.
    fn describe(&self) -> Option<Vec<FieldSpec>> {
        None
    }

    /// Reads a field by name.
    fn field_value(&self, name: &str) -> Option<Value>;

    /// The concrete value, for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Record type that can be produced by a merge.
pub trait PatchTarget: Record + Default + Clone + Send + Sync + 'static {
    /// Accessor table, in declaration order.
    fn accessors() -> &'static [FieldAccessor<Self>];
}

/// Builds field specs from an accessor table.
pub fn describe<T>(accessors: &[FieldAccessor<T>]) -> Vec<FieldSpec> {
    accessors
        .iter()
        .enumerate()
        .map(|(slot, accessor)| FieldSpec {
            ident: accessor.ident,
            field_type: (accessor.field_type)(),
            name: accessor.name,
            inclusion: accessor.inclusion,
            visibility: accessor.visibility,
            slot,
        })
        .collect()
}

/// Reads a field of a generated record by identifier.
///
/// Excluded and non-public fields are never exposed.
pub fn read_field<T: PatchTarget>(record: &T, ident: &str) -> Option<Value> {
    T::accessors()
        .iter()
        .find(|accessor| accessor.ident == ident)
        .filter(|accessor| accessor.is_eligible())
        .map(|accessor| (accessor.get)(record))
}

/// Renders a nested record as an object keyed by external names.
pub fn record_to_value<T: PatchTarget>(record: &T) -> Value {
    let object: Map<String, Value> = describe(T::accessors())
        .into_iter()
        .filter(FieldSpec::is_eligible)
        .map(|spec| {
            let value = (T::accessors()[spec.slot].get)(record);
            (spec.external_name(FoldMode::default()), value)
        })
        .collect();
    Value::Object(object)
}

/// Builds a nested record from an object keyed by external names.
///
/// Whole-value construction: missing and `null` keys keep their zero value,
/// unknown keys are ignored, and any rejected value rejects the record.
pub fn record_from_value<T: PatchTarget>(value: &Value, policy: CoercionPolicy) -> Option<T> {
    let object = value.as_object()?;
    let mut record = T::default();

    for spec in describe(T::accessors()).into_iter().filter(FieldSpec::is_eligible) {
        let Some(incoming) = object.get(&spec.external_name(FoldMode::default())) else {
            continue;
        };
        if incoming.is_null() {
            continue;
        }
        if !(T::accessors()[spec.slot].set)(&mut record, incoming, policy) {
            return None;
        }
    }

    Some(record)
}
