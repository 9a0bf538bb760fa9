//! Per-field diagnostics of a merge.

use crate::schema::FieldDescriptor;
use crate::value::ValueKind;

/// Why an incoming value was not assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Key not present in the bag
    Absent,
    /// Key present with a `null` value
    Null,
    /// Value rejected by the conversion table
    Unconvertible { found: ValueKind },
}

/// Why the source could not supply a fallback value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMiss {
    /// Source has no such field, or it is `null`
    Missing,
    /// Source value rejected by the conversion table
    Incompatible { found: ValueKind },
}

/// What the merge wrote into one destination field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOutcome {
    /// Incoming value assigned
    Assigned,
    /// Source value kept
    KeptExisting { reason: SkipReason },
    /// Zero value written
    Zeroed { reason: SkipReason, source: SourceMiss },
}

impl FieldOutcome {
    pub fn is_assigned(&self) -> bool {
        matches!(self, FieldOutcome::Assigned)
    }

    /// The skip reason, for fields that fell back.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            FieldOutcome::Assigned => None,
            FieldOutcome::KeptExisting { reason } | FieldOutcome::Zeroed { reason, .. } => Some(*reason),
        }
    }
}

/// Outcome of one schema field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldReport {
    pub external_name: String,
    pub ident: &'static str,
    pub outcome: FieldOutcome,
}

/// Diagnostics collected by `merge_with_report`.
///
/// Makes payload key typos and rejected values visible without turning them
/// into errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    fields: Vec<FieldReport>,
    unknown_keys: Vec<String>,
}

impl PatchReport {
    /// One entry per schema field, in schema order.
    pub fn fields(&self) -> &[FieldReport] {
        &self.fields
    }

    /// Outcome of the field with this external name.
    pub fn outcome(&self, external_name: &str) -> Option<FieldOutcome> {
        self.fields
            .iter()
            .find(|field| field.external_name == external_name)
            .map(|field| field.outcome)
    }

    /// External names of assigned fields.
    pub fn assigned(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(|field| field.outcome.is_assigned())
            .map(|field| field.external_name.as_str())
    }

    /// External names whose supplied value was rejected.
    pub fn rejected(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields
            .iter()
            .filter(|field| {
                matches!(
                    field.outcome.skip_reason(),
                    Some(SkipReason::Unconvertible { .. })
                )
            })
            .map(|field| field.external_name.as_str())
    }

    /// Bag keys that match no schema field, sorted.
    pub fn unknown_keys(&self) -> &[String] {
        &self.unknown_keys
    }

    /// No rejected values and no unknown keys.
    pub fn is_clean(&self) -> bool {
        self.unknown_keys.is_empty() && self.rejected().next().is_none()
    }

    pub(crate) fn set_unknown_keys(&mut self, mut keys: Vec<String>) {
        keys.sort_unstable();
        self.unknown_keys = keys;
    }
}

/// Receives one outcome per schema field during a merge.
pub(crate) trait OutcomeSink {
    fn record(&mut self, field: &FieldDescriptor, outcome: FieldOutcome);
}

impl OutcomeSink for () {
    #[inline]
    fn record(&mut self, _field: &FieldDescriptor, _outcome: FieldOutcome) {}
}

impl OutcomeSink for PatchReport {
    fn record(&mut self, field: &FieldDescriptor, outcome: FieldOutcome) {
        self.fields.push(FieldReport {
            external_name: field.external_name().to_string(),
            ident: field.ident(),
            outcome,
        });
    }
}

/// Logs every fallback before forwarding it.
pub(crate) struct Traced<'a, K> {
    type_name: &'static str,
    inner: &'a mut K,
}

impl<'a, K> Traced<'a, K> {
    pub(crate) fn new(type_name: &'static str, inner: &'a mut K) -> Self {
        Self { type_name, inner }
    }
}

impl<K: OutcomeSink> OutcomeSink for Traced<'_, K> {
    fn record(&mut self, field: &FieldDescriptor, outcome: FieldOutcome) {
        if !outcome.is_assigned() {
            tracing::debug!(
                "Field {}.{} ('{}') fell back: {:?}",
                self.type_name,
                field.ident(),
                field.external_name(),
                outcome
            );
        }
        self.inner.record(field, outcome);
    }
}
