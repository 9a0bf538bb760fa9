//! Patch engine error types.

use thiserror::Error;

/// Errors raised at the two entry points of the engine: schema construction
/// and merge invocation.
///
/// Per-field fallbacks are never errors; see [`crate::PatchReport`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// Sample handed to the schema builder is not a struct-like record
    #[error("Sample of type '{type_name}' is not a struct-like record")]
    InvalidInstance { type_name: &'static str },

    /// Record type exposes no eligible fields
    #[error("Record type '{type_name}' exposes no patchable fields")]
    EmptySchema { type_name: &'static str },

    /// Explicit external name is empty
    #[error("Field '{field}' of '{type_name}' has an empty external name")]
    EmptyExternalName {
        type_name: &'static str,
        field: &'static str,
    },

    /// Two fields resolve to the same external name
    #[error("Fields '{first}' and '{second}' of '{type_name}' both map to external name '{name}'")]
    DuplicateExternalName {
        type_name: &'static str,
        name: String,
        first: &'static str,
        second: &'static str,
    },

    /// Existing value handed to a merge is not a record
    #[error("Existing value of type '{found}' is not compatible with record type '{expected}'")]
    InvalidRecord {
        expected: &'static str,
        found: &'static str,
    },

    /// Schema was derived for another record type
    #[error("Schema for '{schema}' cannot patch record type '{target}'")]
    SchemaMismatch {
        schema: &'static str,
        target: &'static str,
    },

    /// Schema already registered for the type
    #[error("Schema for '{type_name}' already registered")]
    AlreadyRegistered { type_name: &'static str },

    /// Lock poisoned (RwLock poisoned)
    #[error("Lock poisoned")]
    LockPoisoned,
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PatchError>;
