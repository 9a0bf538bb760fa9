//! Schema-driven sparse patching of typed records.
//!
//! Derives a schema mapping external (wire-level) field names to record
//! fields, then merges an incoming bag of named values into an existing
//! record, producing the updated record.

pub mod config;
pub mod error;
pub mod fold;
pub mod merge;
pub mod record;
pub mod schema;
pub mod updater;
pub mod value;

pub use config::PatchConfig;
pub use error::{PatchError, Result};
pub use fold::{fold, fold_with, FoldMode};
pub use merge::{merge, merge_with_report, FieldOutcome, PatchReport, SkipReason, SourceMiss};
pub use record::{ExternalName, FieldAccessor, FieldSpec, Inclusion, PatchTarget, Record, Shape, Visibility};
pub use schema::{build_schema, CollisionPolicy, FieldDescriptor, Schema, SchemaRegistry};
pub use updater::{make_updater, Updater};
pub use value::{CoercionPolicy, FieldType, FieldValue, ValueKind, ValuesBag};

pub use serde_json::Value;
