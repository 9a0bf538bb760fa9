//! Field merger: one destination value per schema field.
//!
//! Precedence per field: incoming value (present, non-null, convertible),
//! then the existing record's value, then the field's zero value. Mismatches
//! never raise errors; they fall through to the next rule.

mod report;

use std::any::TypeId;

use crate::error::{PatchError, Result};
use crate::record::{FieldAccessor, PatchTarget, Record, Shape};
use crate::schema::{FieldDescriptor, Schema};
use crate::value::{CoercionPolicy, ValueKind, ValuesBag};

pub(crate) use report::{OutcomeSink, Traced};
pub use report::{FieldOutcome, FieldReport, PatchReport, SkipReason, SourceMiss};

/// Merges `values` over `source`, producing a new `T`.
///
/// `source` is either a `T`, whose fields (including those outside the
/// schema) seed the result, or any other record or JSON object, which is read
/// field by field. Neither `values` nor `source` is modified.
///
/// # Returns
/// `Err(PatchError::SchemaMismatch)` if `schema` was not derived for `T`,
/// `Err(PatchError::InvalidRecord)` if `source` is not record-like.
pub fn merge<T, S, V>(schema: &Schema, values: &V, source: &S, policy: CoercionPolicy) -> Result<T>
where
    T: PatchTarget,
    S: Record + ?Sized,
    V: ValuesBag + ?Sized,
{
    merge_into(schema, values, source, policy, &mut ())
}

/// Like [`merge`], also reporting what happened to every field and which
/// keys of `values` matched no field.
pub fn merge_with_report<T, S, V>(
    schema: &Schema,
    values: &V,
    source: &S,
    policy: CoercionPolicy,
) -> Result<(T, PatchReport)>
where
    T: PatchTarget,
    S: Record + ?Sized,
    V: ValuesBag + ?Sized,
{
    let mut report = PatchReport::default();
    let merged = merge_into(schema, values, source, policy, &mut report)?;
    report.set_unknown_keys(unknown_keys(schema, values));
    Ok((merged, report))
}

pub(crate) fn unknown_keys<V: ValuesBag + ?Sized>(schema: &Schema, values: &V) -> Vec<String> {
    values
        .keys()
        .filter(|key| !schema.contains(key))
        .map(str::to_owned)
        .collect()
}

pub(crate) fn merge_into<T, S, V, K>(
    schema: &Schema,
    values: &V,
    source: &S,
    policy: CoercionPolicy,
    sink: &mut K,
) -> Result<T>
where
    T: PatchTarget,
    S: Record + ?Sized,
    V: ValuesBag + ?Sized,
    K: OutcomeSink,
{
    if schema.type_id() != TypeId::of::<T>() {
        return Err(PatchError::SchemaMismatch {
            schema: schema.type_name(),
            target: std::any::type_name::<T>(),
        });
    }

    if source.shape() == Shape::Opaque {
        return Err(PatchError::InvalidRecord {
            expected: schema.type_name(),
            found: source.type_name(),
        });
    }

    let accessors = T::accessors();

    tracing::trace!(
        "Merging {} fields into {} from {}",
        schema.len(),
        schema.type_name(),
        source.type_name()
    );

    if let Some(existing) = source.as_any().downcast_ref::<T>() {
        let mut dest = existing.clone();
        for field in schema.fields() {
            let accessor = &accessors[field.slot()];
            let outcome = match assign_incoming(&mut dest, accessor, field, values, policy) {
                Ok(()) => FieldOutcome::Assigned,
                Err(reason) => FieldOutcome::KeptExisting { reason },
            };
            sink.record(field, outcome);
        }
        return Ok(dest);
    }

    let mut dest = T::default();
    for field in schema.fields() {
        let accessor = &accessors[field.slot()];
        let outcome = match assign_incoming(&mut dest, accessor, field, values, policy) {
            Ok(()) => FieldOutcome::Assigned,
            Err(reason) => match assign_from_source(&mut dest, accessor, field, source, policy) {
                Ok(()) => FieldOutcome::KeptExisting { reason },
                Err(miss) => FieldOutcome::Zeroed { reason, source: miss },
            },
        };
        sink.record(field, outcome);
    }
    Ok(dest)
}

fn assign_incoming<T, V>(
    dest: &mut T,
    accessor: &FieldAccessor<T>,
    field: &FieldDescriptor,
    values: &V,
    policy: CoercionPolicy,
) -> std::result::Result<(), SkipReason>
where
    V: ValuesBag + ?Sized,
{
    let value = match values.lookup(field.external_name()) {
        None => return Err(SkipReason::Absent),
        Some(value) if value.is_null() => return Err(SkipReason::Null),
        Some(value) => value,
    };

    if (accessor.set)(dest, value, policy) {
        Ok(())
    } else {
        Err(SkipReason::Unconvertible {
            found: ValueKind::of(value),
        })
    }
}

fn assign_from_source<T, S>(
    dest: &mut T,
    accessor: &FieldAccessor<T>,
    field: &FieldDescriptor,
    source: &S,
    policy: CoercionPolicy,
) -> std::result::Result<(), SourceMiss>
where
    S: Record + ?Sized,
{
    let existing = source
        .field_value(field.ident())
        .or_else(|| source.field_value(field.external_name()));

    let value = match existing {
        Some(value) if !value.is_null() => value,
        _ => return Err(SourceMiss::Missing),
    };

    if (accessor.set)(dest, &value, policy) {
        Ok(())
    } else {
        Err(SourceMiss::Incompatible {
            found: ValueKind::of(&value),
        })
    }
}
