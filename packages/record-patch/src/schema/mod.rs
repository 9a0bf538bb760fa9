//! Schema derivation: external field names mapped to record fields.

mod registry;

use std::any::TypeId;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::record::{ExternalName, Record};
use crate::value::FieldType;

pub use registry::SchemaRegistry;

/// What happens when two fields resolve to the same external name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Schema construction fails with `DuplicateExternalName`.
    #[default]
    Reject,
    /// The field declared last keeps the name; the earlier one is dropped.
    LastWins,
}

/// One patchable field of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    external_name: String,
    ident: &'static str,
    field_type: FieldType,
    slot: usize,
}

impl FieldDescriptor {
    /// Name callers use in value bags.
    pub fn external_name(&self) -> &str {
        &self.external_name
    }

    /// Field identifier in the record type.
    pub fn ident(&self) -> &'static str {
        self.ident
    }

    /// Declared type.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Position in the record type's accessor table.
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Immutable, ordered mapping from external names to record fields.
///
/// Built once per record type; safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    type_name: &'static str,
    type_id: TypeId,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
}

impl Schema {
    /// Derives the schema of the sample's record type.
    pub fn build(sample: &dyn Record, config: &PatchConfig) -> Result<Self> {
        let type_name = sample.type_name();
        let specs = sample
            .describe()
            .ok_or(PatchError::InvalidInstance { type_name })?;

        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(specs.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(specs.len());

        for spec in specs {
            if !spec.is_eligible() {
                tracing::trace!("Skipping field {}.{}", type_name, spec.ident);
                continue;
            }

            if spec.name == ExternalName::Explicit("") {
                return Err(PatchError::EmptyExternalName {
                    type_name,
                    field: spec.ident,
                });
            }

            let descriptor = FieldDescriptor {
                external_name: spec.external_name(config.fold_mode),
                ident: spec.ident,
                field_type: spec.field_type,
                slot: spec.slot,
            };

            if let Some(&existing) = index.get(&descriptor.external_name) {
                let first = fields[existing].ident;
                match config.collisions {
                    CollisionPolicy::Reject => {
                        return Err(PatchError::DuplicateExternalName {
                            type_name,
                            name: descriptor.external_name,
                            first,
                            second: descriptor.ident,
                        });
                    }
                    CollisionPolicy::LastWins => {
                        tracing::warn!(
                            "Field {}.{} shadows {}.{} under external name '{}'",
                            type_name,
                            descriptor.ident,
                            type_name,
                            first,
                            descriptor.external_name
                        );
                        fields.remove(existing);
                        index = reindex(&fields);
                    }
                }
            }

            index.insert(descriptor.external_name.clone(), fields.len());
            fields.push(descriptor);
        }

        if fields.is_empty() {
            return Err(PatchError::EmptySchema { type_name });
        }

        tracing::debug!("Derived schema for {} with {} fields", type_name, fields.len());

        Ok(Self {
            type_name,
            type_id: sample.as_any().type_id(),
            fields,
            index,
        })
    }

    /// Record type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Record type identity.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by external name.
    pub fn get(&self, external_name: &str) -> Option<&FieldDescriptor> {
        self.index.get(external_name).map(|&position| &self.fields[position])
    }

    /// Whether the schema has a field with this external name.
    pub fn contains(&self, external_name: &str) -> bool {
        self.index.contains_key(external_name)
    }

    /// External names in declaration order.
    pub fn external_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(FieldDescriptor::external_name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Always false for a built schema.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Derives the schema of the sample's record type.
///
/// # Returns
/// `Err(PatchError::InvalidInstance)` when the sample is not struct-like,
/// `Err(PatchError::EmptySchema)` when no field is eligible.
pub fn build_schema(sample: &dyn Record, config: &PatchConfig) -> Result<Schema> {
    Schema::build(sample, config)
}

fn reindex(fields: &[FieldDescriptor]) -> HashMap<String, usize> {
    fields
        .iter()
        .enumerate()
        .map(|(position, field)| (field.external_name.clone(), position))
        .collect()
}
