use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::Schema;
use crate::config::PatchConfig;
use crate::error::{PatchError, Result};
use crate::record::Record;

/// Registry of derived schemas, keyed by record type identity.
///
/// All schemas in one registry are derived with the same [`PatchConfig`].
/// Provides thread-safe registration and retrieval.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    config: PatchConfig,
    schemas: RwLock<HashMap<TypeId, Arc<Schema>>>,
}

impl SchemaRegistry {
    /// Creates a new empty registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(PatchConfig::default())
    }

    /// Creates a new empty registry deriving schemas with `config`.
    pub fn with_config(config: PatchConfig) -> Self {
        Self {
            config,
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Configuration used for every schema in this registry.
    pub fn config(&self) -> &PatchConfig {
        &self.config
    }

    /// Derives and registers the schema of the sample's record type.
    ///
    /// # Returns
    /// `Err(PatchError::AlreadyRegistered)` if the type already has a schema.
    pub fn register(&self, sample: &dyn Record) -> Result<Arc<Schema>> {
        let schema = Arc::new(Schema::build(sample, &self.config)?);

        let mut schemas = self.schemas.write().map_err(|_| PatchError::LockPoisoned)?;
        if schemas.contains_key(&schema.type_id()) {
            return Err(PatchError::AlreadyRegistered {
                type_name: schema.type_name(),
            });
        }

        schemas.insert(schema.type_id(), Arc::clone(&schema));
        Ok(schema)
    }

    /// Returns the registered schema of the sample's record type, deriving
    /// and registering it on first use.
    pub fn get_or_register(&self, sample: &dyn Record) -> Result<Arc<Schema>> {
        let type_id = sample.as_any().type_id();
        if let Some(schema) = self.get_by_id(type_id) {
            return Ok(schema);
        }

        let built = Arc::new(Schema::build(sample, &self.config)?);

        let mut schemas = self.schemas.write().map_err(|_| PatchError::LockPoisoned)?;
        // Another thread may have registered the type since the read above.
        let schema = schemas.entry(type_id).or_insert(built);
        Ok(Arc::clone(schema))
    }

    /// Retrieves the schema of record type `T`.
    pub fn get<T: 'static>(&self) -> Option<Arc<Schema>> {
        self.get_by_id(TypeId::of::<T>())
    }

    /// Retrieves a schema by type identity.
    pub fn get_by_id(&self, type_id: TypeId) -> Option<Arc<Schema>> {
        let schemas = self.schemas.read().ok()?;
        schemas.get(&type_id).cloned()
    }

    /// Checks if record type `T` has a schema.
    pub fn contains<T: 'static>(&self) -> bool {
        let schemas = match self.schemas.read() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        schemas.contains_key(&TypeId::of::<T>())
    }

    /// Returns the type names of all registered schemas, sorted.
    pub fn type_names(&self) -> Vec<&'static str> {
        let schemas = match self.schemas.read() {
            Ok(guard) => guard,
            Err(_) => return Vec::new(),
        };
        let mut names: Vec<&'static str> = schemas.values().map(|schema| schema.type_name()).collect();
        names.sort_unstable();
        names
    }

    /// Removes the schema of record type `T`.
    ///
    /// Updaters already holding the schema keep working.
    ///
    /// # Returns
    /// `true` if the schema was removed, `false` if it wasn't found.
    pub fn remove<T: 'static>(&self) -> bool {
        let mut schemas = match self.schemas.write() {
            Ok(guard) => guard,
            Err(_) => return false,
        };
        schemas.remove(&TypeId::of::<T>()).is_some()
    }

    /// Removes every schema.
    pub fn clear(&self) {
        if let Ok(mut schemas) = self.schemas.write() {
            schemas.clear();
        }
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.schemas.read().map(|schemas| schemas.len()).unwrap_or(0)
    }

    /// Whether no schema is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
